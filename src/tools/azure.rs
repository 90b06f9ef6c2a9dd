//! Azure Application Insights tools
//!
//! The table tools render a Kusto query from their arguments and run it
//! against the Log Analytics workspace; `azure_metrics` goes through the
//! metrics API instead.

use super::{ToolContext, ToolDefinition, ToolError, ToolRegistry, object_schema, parse_args};
use crate::config::{AppConfig, RESOURCE_ID_ENV, WORKSPACE_ID_ENV};
use crate::telemetry::kql::{
    AvailabilityQuery, DependenciesQuery, ExceptionsQuery, RequestsQuery, TracesQuery,
};
use crate::telemetry::{
    Aggregation, MetricsRequest, Timespan, format_metric_points, format_table_results,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;

const DEFAULT_TIMESPAN: &str = "PT1H";
const DEFAULT_AVAILABILITY_TIMESPAN: &str = "P1D";
const DEFAULT_INTERVAL: &str = "PT5M";

/// Query-specific arguments plus where and over what window to run them
#[derive(Debug, Deserialize)]
#[serde(bound = "Q: DeserializeOwned")]
pub struct WorkspaceArgs<Q> {
    pub timespan: Option<String>,
    pub workspace_id: Option<String>,
    #[serde(flatten)]
    pub query: Q,
}

#[derive(Debug, Deserialize)]
pub struct KustoArgs {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct MetricsArgs {
    pub metric_name: String,
    pub timespan: Option<String>,
    pub interval: Option<String>,
    pub aggregation: Option<Aggregation>,
    pub resource_id: Option<String>,
}

pub fn resolve_workspace_id(config: &AppConfig, provided: Option<&str>) -> Result<String, ToolError> {
    provided
        .filter(|id| !id.is_empty())
        .or(config.azure.workspace_id.as_deref())
        .map(str::to_string)
        .ok_or(ToolError::MissingSetting {
            setting: "Workspace ID",
            env: WORKSPACE_ID_ENV,
            argument: "workspace_id",
        })
}

pub fn resolve_resource_id(config: &AppConfig, provided: Option<&str>) -> Result<String, ToolError> {
    provided
        .filter(|id| !id.is_empty())
        .or(config.azure.resource_id.as_deref())
        .map(str::to_string)
        .ok_or(ToolError::MissingSetting {
            setting: "Resource ID",
            env: RESOURCE_ID_ENV,
            argument: "resource_id",
        })
}

fn run_workspace_query<Q>(
    ctx: &ToolContext<'_>,
    args: &WorkspaceArgs<Q>,
    kql: &str,
    default_timespan: &str,
) -> Result<String, ToolError> {
    let workspace_id = resolve_workspace_id(ctx.config, args.workspace_id.as_deref())?;
    let timespan = Timespan::parse(args.timespan.as_deref().unwrap_or(default_timespan))?;

    info!(%workspace_id, %timespan, "running workspace query");
    let tables = ctx.telemetry.query_workspace(&workspace_id, kql, &timespan)?;
    Ok(format_table_results(&tables))
}

fn azure_query(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: WorkspaceArgs<KustoArgs> = parse_args("azure_query", args)?;
    run_workspace_query(ctx, &args, &args.query.query, DEFAULT_TIMESPAN)
}

fn azure_exceptions(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: WorkspaceArgs<ExceptionsQuery> = parse_args("azure_exceptions", args)?;
    run_workspace_query(ctx, &args, &args.query.to_kql(), DEFAULT_TIMESPAN)
}

fn azure_traces(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: WorkspaceArgs<TracesQuery> = parse_args("azure_traces", args)?;
    run_workspace_query(ctx, &args, &args.query.to_kql(), DEFAULT_TIMESPAN)
}

fn azure_requests(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: WorkspaceArgs<RequestsQuery> = parse_args("azure_requests", args)?;
    run_workspace_query(ctx, &args, &args.query.to_kql(), DEFAULT_TIMESPAN)
}

fn azure_dependencies(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: WorkspaceArgs<DependenciesQuery> = parse_args("azure_dependencies", args)?;
    run_workspace_query(ctx, &args, &args.query.to_kql(), DEFAULT_TIMESPAN)
}

fn azure_availability(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: WorkspaceArgs<AvailabilityQuery> = parse_args("azure_availability", args)?;
    run_workspace_query(ctx, &args, &args.query.to_kql(), DEFAULT_AVAILABILITY_TIMESPAN)
}

fn azure_metrics(ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: MetricsArgs = parse_args("azure_metrics", args)?;
    let request = MetricsRequest {
        resource_id: resolve_resource_id(ctx.config, args.resource_id.as_deref())?,
        metric_name: args.metric_name,
        timespan: Timespan::parse(args.timespan.as_deref().unwrap_or(DEFAULT_TIMESPAN))?,
        interval: Timespan::parse(args.interval.as_deref().unwrap_or(DEFAULT_INTERVAL))?,
        aggregation: args.aggregation.unwrap_or(Aggregation::Avg),
    };

    info!(metric = %request.metric_name, timespan = %request.timespan, "querying metrics");
    let points = ctx.telemetry.query_metrics(&request)?;
    Ok(format_metric_points(&points))
}

fn timespan_property(default: &str) -> Value {
    json!({
        "type": "string",
        "default": default,
        "description": "ISO 8601 duration (PT1H = 1 hour, P1D = 1 day, P7D = 7 days)"
    })
}

fn limit_property(default: u32) -> Value {
    json!({"type": "integer", "default": default, "description": "Maximum number of results"})
}

fn workspace_schema(mut properties: Value, required: &[&str], default_timespan: &str) -> Value {
    if let Some(props) = properties.as_object_mut() {
        props.insert("timespan".to_string(), timespan_property(default_timespan));
        props.insert(
            "workspace_id".to_string(),
            json!({
                "type": "string",
                "description": format!("Log Analytics workspace ID (or set {WORKSPACE_ID_ENV})")
            }),
        );
    }
    object_schema(properties, required)
}

pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(
        ToolDefinition {
            name: "azure_query",
            description: "Run a Kusto (KQL) query against a Log Analytics workspace",
            input_schema: workspace_schema(
                json!({"query": {"type": "string", "description": "Kusto query to execute"}}),
                &["query"],
                DEFAULT_TIMESPAN,
            ),
        },
        azure_query,
    );

    registry.register(
        ToolDefinition {
            name: "azure_exceptions",
            description: "Query recent exceptions from Application Insights",
            input_schema: workspace_schema(
                json!({
                    "limit": limit_property(50),
                    "severity": {"type": "string", "enum": ["all", "error", "critical"]},
                    "search": {"type": "string", "description": "Search in exception messages"},
                }),
                &[],
                DEFAULT_TIMESPAN,
            ),
        },
        azure_exceptions,
    );

    registry.register(
        ToolDefinition {
            name: "azure_traces",
            description: "Query trace logs from Application Insights",
            input_schema: workspace_schema(
                json!({
                    "limit": limit_property(100),
                    "severity": {
                        "type": "string",
                        "enum": ["verbose", "info", "warning", "error", "critical"]
                    },
                    "search": {"type": "string", "description": "Search in trace messages"},
                }),
                &[],
                DEFAULT_TIMESPAN,
            ),
        },
        azure_traces,
    );

    registry.register(
        ToolDefinition {
            name: "azure_requests",
            description: "Query HTTP requests from Application Insights",
            input_schema: workspace_schema(
                json!({
                    "limit": limit_property(100),
                    "failed_only": {"type": "boolean", "default": false},
                    "min_duration_ms": {"type": "integer", "description": "Minimum duration in milliseconds"},
                    "url_filter": {"type": "string", "description": "Only URLs containing this text"},
                }),
                &[],
                DEFAULT_TIMESPAN,
            ),
        },
        azure_requests,
    );

    registry.register(
        ToolDefinition {
            name: "azure_dependencies",
            description: "Query outgoing dependency calls (HTTP, SQL, ...) from Application Insights",
            input_schema: workspace_schema(
                json!({
                    "limit": limit_property(100),
                    "failed_only": {"type": "boolean", "default": false},
                    "type_filter": {"type": "string", "description": "Dependency type (HTTP, SQL, Azure, ...)"},
                }),
                &[],
                DEFAULT_TIMESPAN,
            ),
        },
        azure_dependencies,
    );

    registry.register(
        ToolDefinition {
            name: "azure_availability",
            description: "Query availability test results from Application Insights",
            input_schema: workspace_schema(
                json!({
                    "limit": limit_property(50),
                    "test_name": {"type": "string", "description": "Filter by test name"},
                    "failed_only": {"type": "boolean", "default": false},
                }),
                &[],
                DEFAULT_AVAILABILITY_TIMESPAN,
            ),
        },
        azure_availability,
    );

    registry.register(
        ToolDefinition {
            name: "azure_metrics",
            description: "Query Application Insights metrics",
            input_schema: object_schema(
                json!({
                    "metric_name": {
                        "type": "string",
                        "description": "Metric name (e.g. requests/count, exceptions/count)"
                    },
                    "timespan": timespan_property(DEFAULT_TIMESPAN),
                    "interval": {"type": "string", "default": DEFAULT_INTERVAL, "description": "Aggregation interval"},
                    "aggregation": {
                        "type": "string",
                        "enum": ["avg", "min", "max", "sum", "count"],
                        "default": "avg"
                    },
                    "resource_id": {
                        "type": "string",
                        "description": format!("Azure resource ID (or set {RESOURCE_ID_ENV})")
                    },
                }),
                &["metric_name"],
            ),
        },
        azure_metrics,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{
        MetricPoint, QueryColumn, QueryTable, TelemetryBackend, TelemetryError,
    };
    use crate::tools::testing::FakeRunner;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        queries: Mutex<Vec<(String, String, String)>>,
        metrics: Mutex<Vec<MetricsRequest>>,
        tables: Vec<QueryTable>,
    }

    impl TelemetryBackend for RecordingBackend {
        fn query_workspace(
            &self,
            workspace_id: &str,
            query: &str,
            timespan: &Timespan,
        ) -> Result<Vec<QueryTable>, TelemetryError> {
            self.queries.lock().unwrap().push((
                workspace_id.to_string(),
                query.to_string(),
                timespan.to_string(),
            ));
            Ok(self.tables.clone())
        }

        fn query_metrics(&self, request: &MetricsRequest) -> Result<Vec<MetricPoint>, TelemetryError> {
            self.metrics.lock().unwrap().push(request.clone());
            Ok(vec![MetricPoint {
                timestamp: "2026-03-01T10:00:00Z".to_string(),
                value: Some(12.5),
            }])
        }
    }

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.azure.workspace_id = Some("ws-config".to_string());
        config.azure.resource_id = Some("/subscriptions/s/resourceGroups/rg/providers/microsoft.insights/components/app".to_string());
        config
    }

    fn call(backend: &RecordingBackend, config: &AppConfig, name: &str, args: Value) -> Result<String, ToolError> {
        let runner = FakeRunner::default();
        let ctx = ToolContext {
            config,
            runner: &runner,
            telemetry: backend,
        };
        ToolRegistry::builtin().call(&ctx, name, args)
    }

    #[test]
    fn test_workspace_id_argument_wins() {
        let backend = RecordingBackend::default();
        let output = call(
            &backend,
            &configured(),
            "azure_query",
            json!({"query": "traces | take 1", "workspace_id": "ws-arg", "timespan": "P7D"}),
        )
        .unwrap();

        assert_eq!(output, "No results found.");
        let queries = backend.queries.lock().unwrap();
        assert_eq!(
            queries[0],
            ("ws-arg".to_string(), "traces | take 1".to_string(), "P7D".to_string())
        );
    }

    #[test]
    fn test_missing_workspace_id() {
        let backend = RecordingBackend::default();
        let err = call(&backend, &AppConfig::default(), "azure_exceptions", json!({}))
            .expect_err("no workspace configured");

        assert_eq!(
            err.to_string(),
            "Workspace ID required. Set AZURE_LOG_ANALYTICS_WORKSPACE_ID or provide workspace_id"
        );
        assert!(backend.queries.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_timespan_is_rejected() {
        let backend = RecordingBackend::default();
        let err = call(&backend, &configured(), "azure_traces", json!({"timespan": "1 hour"}))
            .expect_err("bad duration");
        assert!(matches!(err, ToolError::Telemetry(TelemetryError::InvalidTimespan(_))));
    }

    #[test]
    fn test_table_tools_render_kql_with_defaults() {
        let backend = RecordingBackend::default();
        let config = configured();
        call(&backend, &config, "azure_exceptions", json!({"severity": "error"})).unwrap();
        call(&backend, &config, "azure_availability", json!({"failed_only": true})).unwrap();

        let queries = backend.queries.lock().unwrap();
        let (workspace, kql, timespan) = &queries[0];
        assert_eq!(workspace, "ws-config");
        assert_eq!(timespan, "PT1H");
        assert!(kql.starts_with("exceptions\n| where severityLevel >= 3\n"));
        assert!(kql.contains("| take 50\n"));

        let (_, kql, timespan) = &queries[1];
        assert_eq!(timespan, "P1D");
        assert!(kql.starts_with("availabilityResults\n| where success == false\n"));
    }

    #[test]
    fn test_results_formatted_as_records() {
        let backend = RecordingBackend {
            tables: vec![QueryTable {
                name: "PrimaryResult".to_string(),
                columns: vec![QueryColumn {
                    name: "resultCode".to_string(),
                    column_type: "string".to_string(),
                }],
                rows: vec![vec![json!("500")]],
            }],
            ..Default::default()
        };
        let output = call(&backend, &configured(), "azure_requests", json!({"failed_only": true})).unwrap();

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([{"resultCode": "500"}]));
    }

    #[test]
    fn test_metrics_request() {
        let backend = RecordingBackend::default();
        let output = call(
            &backend,
            &configured(),
            "azure_metrics",
            json!({"metric_name": "requests/count", "aggregation": "count", "interval": "PT15M"}),
        )
        .unwrap();

        let metrics = backend.metrics.lock().unwrap();
        assert_eq!(metrics[0].metric_name, "requests/count");
        assert_eq!(metrics[0].aggregation, Aggregation::Count);
        assert_eq!(metrics[0].timespan.as_iso8601(), "PT1H");
        assert_eq!(metrics[0].interval.as_iso8601(), "PT15M");

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([{"timestamp": "2026-03-01T10:00:00Z", "value": 12.5}]));
    }

    #[test]
    fn test_metrics_require_resource_id() {
        let backend = RecordingBackend::default();
        let err = call(
            &backend,
            &AppConfig::default(),
            "azure_metrics",
            json!({"metric_name": "requests/count"}),
        )
        .expect_err("no resource id");
        assert!(matches!(err, ToolError::MissingSetting { argument: "resource_id", .. }));
    }
}
