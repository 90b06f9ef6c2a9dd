//! Docker Compose service tools

use super::{
    LogFilterArgs, ToolContext, ToolDefinition, ToolError, ToolRegistry, apply_filter,
    object_schema, parse_args, with_filter_properties,
};
use crate::config::AppConfig;
use crate::runner::CommandSpec;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;

const PS_FORMAT: &str = "table {{.Name}}\t{{.Service}}\t{{.Status}}\t{{.Ports}}";

#[derive(Debug, Deserialize)]
pub struct ComposeLogsArgs {
    pub service: Option<String>,
    pub tail: Option<u32>,
    pub since: Option<String>,
    pub project_dir: Option<String>,
    /// Keep the `service |` prefix on every line
    #[serde(default)]
    pub prefix: bool,
    #[serde(flatten)]
    pub filter: LogFilterArgs,
}

#[derive(Debug, Deserialize)]
pub struct ComposePsArgs {
    pub project_dir: Option<String>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Deserialize)]
pub struct ServiceActionArgs {
    pub service: Option<String>,
    pub project_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Up,
    Down,
    Restart,
}

impl ServiceAction {
    fn as_str(self) -> &'static str {
        match self {
            ServiceAction::Up => "up",
            ServiceAction::Down => "down",
            ServiceAction::Restart => "restart",
        }
    }
}

fn compose(config: &AppConfig, project_dir: Option<&str>) -> CommandSpec {
    let dir = project_dir
        .map(Path::new)
        .or(config.compose.project_dir.as_deref());

    CommandSpec::new(&config.compose.binary)
        .arg("compose")
        .current_dir(dir)
}

pub fn logs_command(config: &AppConfig, args: &ComposeLogsArgs) -> CommandSpec {
    compose(config, args.project_dir.as_deref())
        .arg("logs")
        .arg("--tail")
        .arg(args.tail.unwrap_or(config.logs.tail).to_string())
        .opt_pair("--since", args.since.as_deref())
        .arg_if(!args.prefix, "--no-log-prefix")
        .opt_arg(args.service.as_deref())
}

pub fn ps_command(config: &AppConfig, args: &ComposePsArgs) -> CommandSpec {
    compose(config, args.project_dir.as_deref())
        .arg("ps")
        .arg_if(args.all, "--all")
        .args(["--format", PS_FORMAT])
}

pub fn action_command(config: &AppConfig, action: ServiceAction, args: &ServiceActionArgs) -> CommandSpec {
    compose(config, args.project_dir.as_deref())
        .arg(action.as_str())
        .arg_if(action == ServiceAction::Up, "-d")
        .opt_arg(args.service.as_deref())
}

fn compose_logs(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: ComposeLogsArgs = parse_args("compose_logs", args)?;
    let filter = args.filter.compile()?;
    let output = ctx.runner.run(&logs_command(ctx.config, &args))?;
    Ok(apply_filter(filter.as_ref(), output))
}

fn compose_ps(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: ComposePsArgs = parse_args("compose_ps", args)?;
    Ok(ctx.runner.run(&ps_command(ctx.config, &args))?)
}

fn run_action(ctx: &ToolContext<'_>, action: ServiceAction, args: Value) -> Result<String, ToolError> {
    let tool = format!("compose_{}", action.as_str());
    let args: ServiceActionArgs = parse_args(&tool, args)?;
    let output = ctx.runner.run(&action_command(ctx.config, action, &args))?;

    // compose reports progress on stderr, so stdout is usually empty
    if output.trim().is_empty() {
        let target = args.service.as_deref().unwrap_or("all services");
        return Ok(format!("docker compose {} completed for {target}", action.as_str()));
    }
    Ok(output)
}

fn compose_up(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    run_action(ctx, ServiceAction::Up, args)
}

fn compose_down(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    run_action(ctx, ServiceAction::Down, args)
}

fn compose_restart(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    run_action(ctx, ServiceAction::Restart, args)
}

fn project_dir_property() -> Value {
    json!({"type": "string", "description": "Path to the docker-compose.yml directory"})
}

fn service_action_schema() -> Value {
    object_schema(
        json!({
            "service": {"type": "string", "description": "Service name (omit for all services)"},
            "project_dir": project_dir_property(),
        }),
        &[],
    )
}

pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(
        ToolDefinition {
            name: "compose_logs",
            description: "Read logs from Docker Compose services",
            input_schema: object_schema(
                with_filter_properties(json!({
                    "service": {"type": "string", "description": "Service name (omit for all services)"},
                    "tail": {"type": "integer", "description": "Number of lines to show from the end"},
                    "since": {"type": "string", "description": "Show logs since (e.g. '10m', '1h')"},
                    "project_dir": project_dir_property(),
                    "prefix": {
                        "type": "boolean",
                        "default": false,
                        "description": "Keep the service name prefix on each line"
                    },
                })),
                &[],
            ),
        },
        compose_logs,
    );

    registry.register(
        ToolDefinition {
            name: "compose_ps",
            description: "List Docker Compose services and their status",
            input_schema: object_schema(
                json!({
                    "project_dir": project_dir_property(),
                    "all": {
                        "type": "boolean",
                        "default": false,
                        "description": "Show all services (including stopped)"
                    },
                }),
                &[],
            ),
        },
        compose_ps,
    );

    registry.register(
        ToolDefinition {
            name: "compose_up",
            description: "Start Docker Compose services in the background",
            input_schema: service_action_schema(),
        },
        compose_up,
    );
    registry.register(
        ToolDefinition {
            name: "compose_down",
            description: "Stop Docker Compose services",
            input_schema: service_action_schema(),
        },
        compose_down,
    );
    registry.register(
        ToolDefinition {
            name: "compose_restart",
            description: "Restart Docker Compose services",
            input_schema: service_action_schema(),
        },
        compose_restart,
    );
}
