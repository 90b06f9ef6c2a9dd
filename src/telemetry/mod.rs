//! Cloud telemetry queries (Azure Monitor / Application Insights)

pub mod client;
pub mod kql;
pub mod timespan;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use client::{AzureCredential, AzureMonitorClient};
pub use timespan::Timespan;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid ISO 8601 duration: '{0}'")]
    InvalidTimespan(String),

    #[error(
        "Azure credentials not configured. Set AZURE_ACCESS_TOKEN, or AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET"
    )]
    MissingCredentials,

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Azure API returned {status} for {url}: {body}")]
    Api {
        url: String,
        status: u16,
        body: String,
    },
}

/// One result table of a Log Analytics query
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryTable {
    #[serde(default)]
    pub name: String,
    pub columns: Vec<QueryColumn>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Avg,
    Min,
    Max,
    Sum,
    Count,
}

impl Aggregation {
    /// Name used in the metrics API `aggregation` parameter
    pub fn api_name(self) -> &'static str {
        match self {
            Aggregation::Avg => "Average",
            Aggregation::Min => "Minimum",
            Aggregation::Max => "Maximum",
            Aggregation::Sum => "Total",
            Aggregation::Count => "Count",
        }
    }

    /// Field carrying this aggregation in a metric data point
    pub fn field_name(self) -> &'static str {
        match self {
            Aggregation::Avg => "average",
            Aggregation::Min => "minimum",
            Aggregation::Max => "maximum",
            Aggregation::Sum => "total",
            Aggregation::Count => "count",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsRequest {
    pub resource_id: String,
    pub metric_name: String,
    pub timespan: Timespan,
    pub interval: Timespan,
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub timestamp: String,
    pub value: Option<f64>,
}

/// Query surface of the telemetry backend
pub trait TelemetryBackend: Send + Sync {
    fn query_workspace(
        &self,
        workspace_id: &str,
        query: &str,
        timespan: &Timespan,
    ) -> Result<Vec<QueryTable>, TelemetryError>;

    fn query_metrics(&self, request: &MetricsRequest) -> Result<Vec<MetricPoint>, TelemetryError>;
}

/// Render query tables as a JSON array of `column -> value` records
pub fn format_table_results(tables: &[QueryTable]) -> String {
    if tables.is_empty() {
        return "No results found.".to_string();
    }

    let records: Vec<Value> = tables
        .iter()
        .flat_map(|table| {
            table.rows.iter().map(|row| {
                let record: Map<String, Value> = table
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.name.clone(), value.clone()))
                    .collect();
                Value::Object(record)
            })
        })
        .collect();

    serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
}

pub fn format_metric_points(points: &[MetricPoint]) -> String {
    serde_json::to_string_pretty(points).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_table_results_empty() {
        assert_eq!(format_table_results(&[]), "No results found.");
    }

    #[test]
    fn test_format_table_results_zips_columns_and_rows() {
        let table: QueryTable = serde_json::from_value(json!({
            "name": "PrimaryResult",
            "columns": [{"name": "name", "type": "string"}, {"name": "count", "type": "long"}],
            "rows": [["GET /", 3], ["POST /login", 1]]
        }))
        .unwrap();

        let parsed: Value = serde_json::from_str(&format_table_results(&[table])).unwrap();
        assert_eq!(
            parsed,
            json!([
                {"name": "GET /", "count": 3},
                {"name": "POST /login", "count": 1}
            ])
        );
    }

    #[test]
    fn test_format_table_results_no_rows_is_empty_array() {
        let table = QueryTable {
            name: "PrimaryResult".to_string(),
            columns: vec![],
            rows: vec![],
        };
        assert_eq!(format_table_results(&[table]), "[]");
    }
}
