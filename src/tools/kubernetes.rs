//! Kubernetes tools built on `kubectl`

use super::{
    LogFilterArgs, ToolContext, ToolDefinition, ToolError, ToolRegistry, apply_filter,
    object_schema, parse_args, with_filter_properties,
};
use crate::config::AppConfig;
use crate::runner::CommandSpec;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Namespace value that selects every namespace
pub const ALL_NAMESPACES: &str = "all";

/// Cluster coordinates shared by every kubectl tool
#[derive(Debug, Default, Deserialize)]
pub struct ClusterArgs {
    pub namespace: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PodLogsArgs {
    pub pod: String,
    pub container: Option<String>,
    pub tail: Option<u32>,
    pub since: Option<String>,
    #[serde(default)]
    pub previous: bool,
    #[serde(flatten)]
    pub cluster: ClusterArgs,
    #[serde(flatten)]
    pub filter: LogFilterArgs,
}

#[derive(Debug, Deserialize)]
pub struct DeploymentLogsArgs {
    pub deployment: String,
    pub tail: Option<u32>,
    pub since: Option<String>,
    #[serde(flatten)]
    pub cluster: ClusterArgs,
    #[serde(flatten)]
    pub filter: LogFilterArgs,
}

#[derive(Debug, Deserialize)]
pub struct ListPodsArgs {
    pub selector: Option<String>,
    #[serde(flatten)]
    pub cluster: ClusterArgs,
}

#[derive(Debug, Deserialize)]
pub struct PodArgs {
    pub pod: String,
    #[serde(flatten)]
    pub cluster: ClusterArgs,
}

#[derive(Debug, Deserialize)]
pub struct PodExecArgs {
    pub pod: String,
    pub command: String,
    pub container: Option<String>,
    #[serde(flatten)]
    pub cluster: ClusterArgs,
}

#[derive(Debug, Deserialize)]
pub struct EventsArgs {
    pub pod: Option<String>,
    #[serde(flatten)]
    pub cluster: ClusterArgs,
}

/// `kubectl [--context C] [--namespace N | --all-namespaces]`
fn kubectl(config: &AppConfig, cluster: &ClusterArgs) -> CommandSpec {
    let settings = &config.kubernetes;
    let context = cluster.context.as_deref().or(settings.context.as_deref());
    let namespace = cluster
        .namespace
        .as_deref()
        .unwrap_or(settings.namespace.as_str());

    let spec = CommandSpec::new(&settings.binary).opt_pair("--context", context);
    match namespace {
        "" => spec,
        ALL_NAMESPACES => spec.arg("--all-namespaces"),
        ns => spec.args(["--namespace", ns]),
    }
}

pub fn pod_logs_command(config: &AppConfig, args: &PodLogsArgs) -> CommandSpec {
    kubectl(config, &args.cluster)
        .arg("logs")
        .arg("--tail")
        .arg(args.tail.unwrap_or(config.logs.tail).to_string())
        .opt_pair("--since", args.since.as_deref())
        .arg_if(args.previous, "--previous")
        .opt_pair("--container", args.container.as_deref())
        .arg(&args.pod)
}

pub fn selector_query_command(config: &AppConfig, args: &DeploymentLogsArgs) -> CommandSpec {
    kubectl(config, &args.cluster)
        .args(["get", "deployment"])
        .arg(&args.deployment)
        .args(["-o", "jsonpath={.spec.selector.matchLabels}"])
}

pub fn deployment_logs_command(config: &AppConfig, args: &DeploymentLogsArgs, selector: &str) -> CommandSpec {
    kubectl(config, &args.cluster)
        .arg("logs")
        .arg(format!("--selector={selector}"))
        .arg("--tail")
        .arg(args.tail.unwrap_or(config.logs.tail).to_string())
        .arg("--prefix")
        .opt_pair("--since", args.since.as_deref())
}

/// Turn the `matchLabels` jsonpath output into a `k=v,k=v` label selector.
///
/// kubectl may print the map with single quotes; those are normalized before
/// parsing. Anything unparseable or empty falls back to `app=<deployment>`.
pub fn label_selector(match_labels: &str, deployment: &str) -> String {
    let normalized = match_labels.trim().replace('\'', "\"");
    let labels = serde_json::from_str::<Map<String, Value>>(&normalized).unwrap_or_default();

    if labels.is_empty() {
        debug!(deployment, "no matchLabels found, using app label");
        return format!("app={deployment}");
    }

    labels
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{key}={s}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub fn pods_command(config: &AppConfig, args: &ListPodsArgs) -> CommandSpec {
    kubectl(config, &args.cluster)
        .args(["get", "pods"])
        .opt_pair("--selector", args.selector.as_deref())
        .args(["-o", "wide"])
}

pub fn describe_command(config: &AppConfig, args: &PodArgs) -> CommandSpec {
    kubectl(config, &args.cluster)
        .args(["describe", "pod"])
        .arg(&args.pod)
}

pub fn exec_command(config: &AppConfig, args: &PodExecArgs) -> CommandSpec {
    kubectl(config, &args.cluster)
        .arg("exec")
        .arg(&args.pod)
        .opt_pair("--container", args.container.as_deref())
        .args(["--", "sh", "-c"])
        .arg(&args.command)
}

pub fn events_command(config: &AppConfig, args: &EventsArgs) -> CommandSpec {
    let field_selector = args
        .pod
        .as_deref()
        .map(|pod| format!("involvedObject.name={pod}"));

    kubectl(config, &args.cluster)
        .args(["get", "events", "--sort-by=.lastTimestamp"])
        .opt_pair("--field-selector", field_selector.as_deref())
}

pub fn contexts_command(config: &AppConfig) -> CommandSpec {
    CommandSpec::new(&config.kubernetes.binary).args(["config", "get-contexts"])
}

fn k8s_logs(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: PodLogsArgs = parse_args("k8s_logs", args)?;
    let filter = args.filter.compile()?;
    let output = ctx.runner.run(&pod_logs_command(ctx.config, &args))?;
    Ok(apply_filter(filter.as_ref(), output))
}

fn k8s_deployment_logs(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: DeploymentLogsArgs = parse_args("k8s_deployment_logs", args)?;
    let filter = args.filter.compile()?;

    let labels = ctx.runner.run(&selector_query_command(ctx.config, &args))?;
    let selector = label_selector(&labels, &args.deployment);
    debug!(deployment = %args.deployment, %selector, "resolved deployment selector");

    let output = ctx
        .runner
        .run(&deployment_logs_command(ctx.config, &args, &selector))?;
    Ok(apply_filter(filter.as_ref(), output))
}

fn k8s_pods(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: ListPodsArgs = parse_args("k8s_pods", args)?;
    Ok(ctx.runner.run(&pods_command(ctx.config, &args))?)
}

fn k8s_describe(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: PodArgs = parse_args("k8s_describe", args)?;
    Ok(ctx.runner.run(&describe_command(ctx.config, &args))?)
}

fn k8s_exec(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: PodExecArgs = parse_args("k8s_exec", args)?;
    Ok(ctx.runner.run(&exec_command(ctx.config, &args))?)
}

fn k8s_events(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: EventsArgs = parse_args("k8s_events", args)?;
    Ok(ctx.runner.run(&events_command(ctx.config, &args))?)
}

fn k8s_contexts(ctx: &ToolContext<'_>, _args: Value) -> Result<String, ToolError> {
    Ok(ctx.runner.run(&contexts_command(ctx.config))?)
}

/// Schema properties for namespace and context, merged into `extra`
fn cluster_properties(mut extra: Value) -> Value {
    if let Some(props) = extra.as_object_mut() {
        props.insert(
            "namespace".to_string(),
            json!({"type": "string", "description": "Kubernetes namespace ('all' for every namespace)"}),
        );
        props.insert(
            "context".to_string(),
            json!({"type": "string", "description": "Kubernetes context to use"}),
        );
    }
    extra
}

pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(
        ToolDefinition {
            name: "k8s_logs",
            description: "Read logs from a Kubernetes pod",
            input_schema: object_schema(
                with_filter_properties(cluster_properties(json!({
                    "pod": {"type": "string", "description": "Pod name"},
                    "container": {"type": "string", "description": "Container name (for multi-container pods)"},
                    "tail": {"type": "integer", "description": "Number of lines to show from the end"},
                    "since": {"type": "string", "description": "Show logs since (e.g. '10m', '1h')"},
                    "previous": {
                        "type": "boolean",
                        "default": false,
                        "description": "Show logs from the previous container instance"
                    },
                }))),
                &["pod"],
            ),
        },
        k8s_logs,
    );

    registry.register(
        ToolDefinition {
            name: "k8s_deployment_logs",
            description: "Read logs from every pod of a deployment, prefixed with the pod name",
            input_schema: object_schema(
                with_filter_properties(cluster_properties(json!({
                    "deployment": {"type": "string", "description": "Deployment name"},
                    "tail": {"type": "integer", "description": "Number of lines per pod"},
                    "since": {"type": "string", "description": "Show logs since (e.g. '10m', '1h')"},
                }))),
                &["deployment"],
            ),
        },
        k8s_deployment_logs,
    );

    registry.register(
        ToolDefinition {
            name: "k8s_pods",
            description: "List pods in a namespace",
            input_schema: object_schema(
                cluster_properties(json!({
                    "selector": {"type": "string", "description": "Label selector (e.g. 'app=nginx')"},
                })),
                &[],
            ),
        },
        k8s_pods,
    );

    registry.register(
        ToolDefinition {
            name: "k8s_describe",
            description: "Get detailed information about a pod",
            input_schema: object_schema(
                cluster_properties(json!({
                    "pod": {"type": "string", "description": "Pod name"},
                })),
                &["pod"],
            ),
        },
        k8s_describe,
    );

    registry.register(
        ToolDefinition {
            name: "k8s_exec",
            description: "Execute a command inside a pod",
            input_schema: object_schema(
                cluster_properties(json!({
                    "pod": {"type": "string", "description": "Pod name"},
                    "command": {"type": "string", "description": "Command to execute"},
                    "container": {"type": "string", "description": "Container name"},
                })),
                &["pod", "command"],
            ),
        },
        k8s_exec,
    );

    registry.register(
        ToolDefinition {
            name: "k8s_events",
            description: "Get events for a namespace, optionally narrowed to one pod",
            input_schema: object_schema(
                cluster_properties(json!({
                    "pod": {"type": "string", "description": "Only events for this pod"},
                })),
                &[],
            ),
        },
        k8s_events,
    );

    registry.register(
        ToolDefinition {
            name: "k8s_contexts",
            description: "List available Kubernetes contexts",
            input_schema: object_schema(json!({}), &[]),
        },
        k8s_contexts,
    );
}
