use infra_probe::config::{ConfigError, default_config, load_config_from_path};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_defaults() {
    let config = default_config();
    assert_eq!(config.logs.tail, 100);
    assert_eq!(config.docker.binary, "docker");
    assert!(config.docker.host.is_none());
    assert_eq!(config.kubernetes.binary, "kubectl");
    assert_eq!(config.kubernetes.namespace, "default");
    assert_eq!(config.compose.binary, "docker");
    assert!(config.azure.workspace_id.is_none());
}

#[test]
fn test_partial_file_keeps_defaults_for_missing_sections() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("infra-probe.toml");
    fs::write(
        &path,
        r#"
[logs]
tail = 250

[kubernetes]
context = "prod-eu"
namespace = "payments"

[compose]
project_dir = "/srv/stack"
"#,
    )
    .expect("write config");

    let config = load_config_from_path(&path).expect("config should parse");
    assert_eq!(config.logs.tail, 250);
    assert_eq!(config.kubernetes.context.as_deref(), Some("prod-eu"));
    assert_eq!(config.kubernetes.namespace, "payments");
    assert_eq!(config.kubernetes.binary, "kubectl");
    assert_eq!(config.compose.project_dir, Some(PathBuf::from("/srv/stack")));
    assert_eq!(config.docker.binary, "docker");
}

#[test]
fn test_azure_and_docker_sections() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[docker]
binary = "podman"
host = "ssh://ops@build-01"

[azure]
workspace_id = "0000-1111"
resource_id = "/subscriptions/abc/resourceGroups/rg/providers/microsoft.insights/components/app"
"#,
    )
    .expect("write config");

    let config = load_config_from_path(&path).expect("config should parse");
    assert_eq!(config.docker.binary, "podman");
    assert_eq!(config.docker.host.as_deref(), Some("ssh://ops@build-01"));
    assert_eq!(config.azure.workspace_id.as_deref(), Some("0000-1111"));
    assert!(config.azure.resource_id.is_some());
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempdir().expect("temp dir");
    let err = load_config_from_path(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[logs]\ntail = \"lots\"\n").expect("write config");

    let err = load_config_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"));
}
