pub mod cli;
pub mod config;
pub mod filter;
pub mod output;
pub mod prompts;
pub mod resources;
pub mod runner;
pub mod telemetry;
pub mod tools;

use anyhow::{Context, bail};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Commands, LevelArg, OutputFormat, cli_parse};
pub use config::{AppConfig, load_config};
pub use filter::{FilterOptions, LogFilter, Severity, filter_logs};
pub use runner::{CommandRunner, CommandSpec, SystemRunner};
pub use telemetry::{AzureMonitorClient, TelemetryBackend};
pub use tools::{ToolContext, ToolError, ToolRegistry};

/// Install the stderr tracing subscriber; `RUST_LOG` overrides the CLI verbosity
fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file '{}'", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read log text from stdin")?;
            Ok(buffer)
        }
    }
}

/// Parse `--args` as JSON5; anything but an object is rejected
fn parse_tool_args(raw: Option<&str>) -> anyhow::Result<Value> {
    let Some(raw) = raw else {
        return Ok(json!({}));
    };

    let value: Value = json5::from_str(raw).context("Invalid --args (expected a JSON5 object)")?;
    if !value.is_object() {
        bail!("Invalid --args: expected an object, got {value}");
    }
    Ok(value)
}

fn spinner(message: String, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_tracing(cli.log_directive());

    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(path) = &cli.config {
        info!(config = %path.display(), "loaded configuration");
    }
    let format = cli.format;

    match &cli.command {
        Commands::Filter {
            file,
            min_level,
            pattern,
            exclude,
            case_sensitive,
            context,
        } => {
            let options = FilterOptions::new()
                .min_level(min_level.map(Severity::from))
                .include(pattern.clone())
                .exclude(exclude.clone())
                .case_sensitive(*case_sensitive)
                .context_lines(*context);
            let filter = LogFilter::new(&options)?;

            let raw = read_input(file.as_deref())?;
            debug!(bytes = raw.len(), "filtering log text");
            let filtered = filter.apply(&raw);
            if !filtered.is_empty() {
                println!("{filtered}");
            }
        }
        Commands::Tools => {
            let registry = ToolRegistry::builtin();
            let definitions = registry.definitions();
            match format {
                OutputFormat::Text => output::print_tools(&definitions),
                OutputFormat::Json => print_json(&definitions)?,
            }
        }
        Commands::Call { tool, args } => {
            let registry = ToolRegistry::builtin();
            let args = parse_tool_args(args.as_deref())?;
            let telemetry = AzureMonitorClient::from_env();
            let ctx = ToolContext {
                config: &config,
                runner: &SystemRunner,
                telemetry: &telemetry,
            };

            let progress = spinner(format!("Running {tool}..."), cli.quiet);
            let result = registry.call(&ctx, tool, args);
            progress.finish_and_clear();
            let text = result.with_context(|| format!("Tool '{tool}' failed"))?;

            match format {
                OutputFormat::Text => print!("{text}"),
                OutputFormat::Json => print_json(&json!({"tool": tool, "output": text}))?,
            }
        }
        Commands::Resources => {
            let resources = resources::list_resources();
            match format {
                OutputFormat::Text => output::print_resources(&resources),
                OutputFormat::Json => print_json(&resources)?,
            }
        }
        Commands::ReadResource { uri } => {
            println!("{}", resources::read_resource(uri)?);
        }
        Commands::Prompts => {
            let prompts = prompts::list_prompts();
            match format {
                OutputFormat::Text => output::print_prompts(&prompts),
                OutputFormat::Json => print_json(&prompts)?,
            }
        }
        Commands::Prompt { name, args } => {
            let args: HashMap<String, String> = args.iter().cloned().collect();
            let text = prompts::render_prompt(name, &args)?;
            match format {
                OutputFormat::Text => println!("{text}"),
                OutputFormat::Json => print_json(&json!({
                    "role": "user",
                    "content": {"type": "text", "text": text}
                }))?,
            }
        }
    }

    Ok(())
}
