//! Docker container tools (local daemon or remote via `--host`)

use super::{
    LogFilterArgs, ToolContext, ToolDefinition, ToolError, ToolRegistry, apply_filter,
    object_schema, parse_args, with_filter_properties,
};
use crate::config::AppConfig;
use crate::runner::CommandSpec;
use serde::Deserialize;
use serde_json::{Value, json};

const PS_FORMAT: &str = "table {{.ID}}\t{{.Names}}\t{{.Image}}\t{{.Status}}\t{{.Ports}}";

#[derive(Debug, Deserialize)]
pub struct ContainerLogsArgs {
    pub container: String,
    pub tail: Option<u32>,
    pub since: Option<String>,
    pub host: Option<String>,
    #[serde(flatten)]
    pub filter: LogFilterArgs,
}

#[derive(Debug, Deserialize)]
pub struct ListContainersArgs {
    #[serde(default)]
    pub all: bool,
    pub host: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InspectArgs {
    pub container: String,
    pub host: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExecArgs {
    pub container: String,
    pub command: String,
    pub host: Option<String>,
}

/// `docker [--host H]`, where an explicit host wins over the configured one
fn docker(config: &AppConfig, host: Option<&str>) -> CommandSpec {
    CommandSpec::new(&config.docker.binary)
        .opt_pair("--host", host.or(config.docker.host.as_deref()))
}

pub fn logs_command(config: &AppConfig, args: &ContainerLogsArgs) -> CommandSpec {
    docker(config, args.host.as_deref())
        .arg("logs")
        .arg("--tail")
        .arg(args.tail.unwrap_or(config.logs.tail).to_string())
        .opt_pair("--since", args.since.as_deref())
        .arg(&args.container)
}

pub fn ps_command(config: &AppConfig, args: &ListContainersArgs) -> CommandSpec {
    docker(config, args.host.as_deref())
        .arg("ps")
        .arg_if(args.all, "--all")
        .args(["--format", PS_FORMAT])
}

pub fn inspect_command(config: &AppConfig, args: &InspectArgs) -> CommandSpec {
    docker(config, args.host.as_deref())
        .arg("inspect")
        .arg(&args.container)
}

pub fn exec_command(config: &AppConfig, args: &ExecArgs) -> CommandSpec {
    docker(config, args.host.as_deref())
        .arg("exec")
        .arg(&args.container)
        .args(["sh", "-c"])
        .arg(&args.command)
}

fn docker_logs(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: ContainerLogsArgs = parse_args("docker_logs", args)?;
    let filter = args.filter.compile()?;
    let output = ctx.runner.run(&logs_command(ctx.config, &args))?;
    Ok(apply_filter(filter.as_ref(), output))
}

fn docker_ps(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: ListContainersArgs = parse_args("docker_ps", args)?;
    Ok(ctx.runner.run(&ps_command(ctx.config, &args))?)
}

fn docker_inspect(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: InspectArgs = parse_args("docker_inspect", args)?;
    Ok(ctx.runner.run(&inspect_command(ctx.config, &args))?)
}

fn docker_exec(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: ExecArgs = parse_args("docker_exec", args)?;
    Ok(ctx.runner.run(&exec_command(ctx.config, &args))?)
}

fn host_property() -> Value {
    json!({
        "type": "string",
        "description": "Docker host (e.g. 'ssh://user@remote', 'tcp://host:2375')"
    })
}

pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(
        ToolDefinition {
            name: "docker_logs",
            description: "Read logs from a Docker container (local or remote)",
            input_schema: object_schema(
                with_filter_properties(json!({
                    "container": {"type": "string", "description": "Container name or ID"},
                    "tail": {"type": "integer", "description": "Number of lines to show from the end"},
                    "since": {"type": "string", "description": "Show logs since (e.g. '10m', '1h')"},
                    "host": host_property(),
                })),
                &["container"],
            ),
        },
        docker_logs,
    );

    registry.register(
        ToolDefinition {
            name: "docker_ps",
            description: "List Docker containers (local or remote)",
            input_schema: object_schema(
                json!({
                    "all": {
                        "type": "boolean",
                        "default": false,
                        "description": "Show all containers (default shows only running)"
                    },
                    "host": host_property(),
                }),
                &[],
            ),
        },
        docker_ps,
    );

    registry.register(
        ToolDefinition {
            name: "docker_inspect",
            description: "Get detailed information about a container",
            input_schema: object_schema(
                json!({
                    "container": {"type": "string", "description": "Container name or ID"},
                    "host": host_property(),
                }),
                &["container"],
            ),
        },
        docker_inspect,
    );

    registry.register(
        ToolDefinition {
            name: "docker_exec",
            description: "Execute a command inside a running container",
            input_schema: object_schema(
                json!({
                    "container": {"type": "string", "description": "Container name or ID"},
                    "command": {"type": "string", "description": "Command to execute"},
                    "host": host_property(),
                }),
                &["container", "command"],
            ),
        },
        docker_exec,
    );
}
