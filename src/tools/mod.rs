//! Tool registry and built-in tool handlers
//!
//! Every tool takes a JSON object of arguments and returns text. Handlers are
//! plain functions stored in a name-keyed table; [`ToolRegistry::call`] looks
//! the name up and hands the arguments over.

pub mod azure;
pub mod calculator;
pub mod compose;
pub mod docker;
pub mod files;
pub mod kubernetes;

use crate::config::AppConfig;
use crate::filter::{FilterError, FilterOptions, LogFilter, Severity};
use crate::runner::{CommandRunner, RunError};
use crate::telemetry::{TelemetryBackend, TelemetryError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for '{tool}': {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Command(#[from] RunError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Path is not a file: {0}")]
    NotAFile(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{setting} required. Set {env} or provide {argument}")]
    MissingSetting {
        setting: &'static str,
        env: &'static str,
        argument: &'static str,
    },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

/// Everything a handler may touch while running
pub struct ToolContext<'a> {
    pub config: &'a AppConfig,
    pub runner: &'a dyn CommandRunner,
    pub telemetry: &'a dyn TelemetryBackend,
}

pub type ToolHandler = fn(&ToolContext<'_>, Value) -> Result<String, ToolError>;

/// Name, description and argument schema advertised for a tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

struct ToolEntry {
    definition: ToolDefinition,
    handler: ToolHandler,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        files::register_tools(&mut registry);
        calculator::register_tools(&mut registry);
        docker::register_tools(&mut registry);
        compose::register_tools(&mut registry);
        kubernetes::register_tools(&mut registry);
        azure::register_tools(&mut registry);
        registry
    }

    /// Register a tool, replacing any previous tool of the same name
    pub fn register(&mut self, definition: ToolDefinition, handler: ToolHandler) {
        debug!(tool = definition.name, "registered tool");
        self.tools
            .insert(definition.name, ToolEntry { definition, handler });
    }

    /// Definitions sorted by tool name
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        self.tools.values().map(|entry| &entry.definition).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name).map(|entry| &entry.definition)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn call(&self, ctx: &ToolContext<'_>, name: &str, args: Value) -> Result<String, ToolError> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        debug!(tool = name, "calling tool");
        (entry.handler)(ctx, args).inspect_err(|err| warn!(tool = name, error = %err, "tool failed"))
    }
}

/// Deserialize tool arguments; `null` is treated as an empty object
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Map::new())
    } else {
        args
    };

    serde_json::from_value(args).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

/// Post-processing options shared by every log-reading tool
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilterArgs {
    #[serde(default)]
    pub min_level: Option<Severity>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub exclude_pattern: Option<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub context_lines: usize,
}

impl LogFilterArgs {
    pub fn to_options(&self) -> FilterOptions {
        FilterOptions::new()
            .min_level(self.min_level)
            .include(self.pattern.clone().filter(|p| !p.is_empty()))
            .exclude(self.exclude_pattern.clone().filter(|p| !p.is_empty()))
            .case_sensitive(self.case_sensitive)
            .context_lines(self.context_lines)
    }

    /// Compile the filter, or `None` when no option would drop a line.
    ///
    /// Called before the log command runs so a bad pattern fails fast.
    pub fn compile(&self) -> Result<Option<LogFilter>, FilterError> {
        let options = self.to_options();
        if !options.is_selective() {
            return Ok(None);
        }
        LogFilter::new(&options).map(Some)
    }
}

/// Run the compiled filter over raw log output, if there is one
pub fn apply_filter(filter: Option<&LogFilter>, raw: String) -> String {
    match filter {
        Some(filter) => filter.apply(&raw),
        None => raw,
    }
}

/// JSON schema for an object with the given properties
pub fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Add the shared log filter properties to a schema property map
pub fn with_filter_properties(mut properties: Value) -> Value {
    let filter = json!({
        "min_level": {
            "type": "string",
            "enum": Severity::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            "description": "Minimum log level to show"
        },
        "pattern": {"type": "string", "description": "Regex pattern to include"},
        "exclude_pattern": {"type": "string", "description": "Regex pattern to exclude"},
        "case_sensitive": {
            "type": "boolean",
            "default": false,
            "description": "Make pattern matching case sensitive"
        },
        "context_lines": {
            "type": "integer",
            "minimum": 0,
            "default": 0,
            "description": "Number of context lines around matches"
        }
    });

    if let (Some(props), Value::Object(extra)) = (properties.as_object_mut(), filter) {
        props.extend(extra);
    }
    properties
}
