fn main() -> anyhow::Result<()> {
    infra_probe::run()
}
