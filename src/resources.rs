//! Read-only JSON resources addressed by URI

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use thiserror::Error;

pub const SERVER_URI: &str = "config://server";
pub const ENVIRONMENT_URI: &str = "config://environment";
pub const STATUS_URI: &str = "data://status";

const REDACTED: &str = "***REDACTED***";
const SENSITIVE_MARKERS: [&str; 5] = ["KEY", "SECRET", "PASSWORD", "TOKEN", "CREDENTIAL"];

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Unknown resource: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceDefinition {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
}

pub fn list_resources() -> Vec<ResourceDefinition> {
    vec![
        ResourceDefinition {
            uri: SERVER_URI,
            name: "Server Configuration",
            description: "Current server configuration settings",
            mime_type: "application/json",
        },
        ResourceDefinition {
            uri: ENVIRONMENT_URI,
            name: "Environment Variables",
            description: "Process environment with secrets redacted",
            mime_type: "application/json",
        },
        ResourceDefinition {
            uri: STATUS_URI,
            name: "Server Status",
            description: "Current status and health information",
            mime_type: "application/json",
        },
    ]
}

pub fn read_resource(uri: &str) -> Result<String, ResourceError> {
    let value = match uri {
        SERVER_URI => server_info(),
        ENVIRONMENT_URI => json!(redacted_environment(std::env::vars())),
        STATUS_URI => status(),
        other => return Err(ResourceError::Unknown(other.to_string())),
    };
    Ok(serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string()))
}

fn server_info() -> Value {
    json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": {
            "tools": true,
            "resources": true,
            "prompts": true,
        }
    })
}

fn status() -> Value {
    json!({
        "status": "running",
        "timestamp": Utc::now().to_rfc3339(),
        "health": {
            "memory": "ok",
            "connections": "ok",
        }
    })
}

pub fn is_sensitive(key: &str) -> bool {
    let upper = key.to_uppercase();
    SENSITIVE_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// Environment variables sorted by name, with sensitive values masked
pub fn redacted_environment(vars: impl IntoIterator<Item = (String, String)>) -> BTreeMap<String, String> {
    vars.into_iter()
        .map(|(key, value)| {
            if is_sensitive(&key) {
                (key, REDACTED.to_string())
            } else {
                (key, value)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_keys_are_redacted() {
        let env = redacted_environment([
            ("AZURE_CLIENT_SECRET".to_string(), "hunter2".to_string()),
            ("github_token".to_string(), "ghp_x".to_string()),
            ("DB_PASSWORD".to_string(), "pw".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ]);

        assert_eq!(env["AZURE_CLIENT_SECRET"], REDACTED);
        assert_eq!(env["github_token"], REDACTED);
        assert_eq!(env["DB_PASSWORD"], REDACTED);
        assert_eq!(env["HOME"], "/root");
    }

    #[test]
    fn test_server_info() {
        let parsed: Value = serde_json::from_str(&read_resource(SERVER_URI).unwrap()).unwrap();
        assert_eq!(parsed["name"], "infra-probe");
        assert_eq!(parsed["capabilities"]["tools"], true);
    }

    #[test]
    fn test_status_has_rfc3339_timestamp() {
        let parsed: Value = serde_json::from_str(&read_resource(STATUS_URI).unwrap()).unwrap();
        assert_eq!(parsed["status"], "running");
        let timestamp = parsed["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_unknown_resource() {
        assert!(matches!(
            read_resource("file://etc/passwd"),
            Err(ResourceError::Unknown(uri)) if uri == "file://etc/passwd"
        ));
    }

    #[test]
    fn test_every_listed_resource_is_readable() {
        for resource in list_resources() {
            assert!(read_resource(resource.uri).is_ok(), "{}", resource.uri);
        }
    }
}
