use super::{MetricPoint, MetricsRequest, QueryTable, TelemetryBackend, TelemetryError, Timespan};
use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

const LOG_ANALYTICS_ENDPOINT: &str = "https://api.loganalytics.io";
const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
const LOGIN_ENDPOINT: &str = "https://login.microsoftonline.com";
const METRICS_API_VERSION: &str = "2018-01-01";

/// How requests to Azure are authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AzureCredential {
    /// Pre-acquired bearer token, used for every API
    AccessToken(String),
    /// Service principal, exchanged for a token per API scope
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl AzureCredential {
    /// Resolve credentials from `AZURE_ACCESS_TOKEN`, falling back to the
    /// `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET` triple.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("AZURE_ACCESS_TOKEN") {
            return Some(Self::AccessToken(token));
        }

        Some(Self::ClientSecret {
            tenant_id: get("AZURE_TENANT_ID")?,
            client_id: get("AZURE_CLIENT_ID")?,
            client_secret: get("AZURE_CLIENT_SECRET")?,
        })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    tables: Vec<QueryTable>,
}

#[derive(Deserialize)]
struct MetricsResponse {
    #[serde(default)]
    value: Vec<MetricSeries>,
}

#[derive(Deserialize)]
struct MetricSeries {
    #[serde(default)]
    timeseries: Vec<TimeSeries>,
}

#[derive(Deserialize)]
struct TimeSeries {
    #[serde(default)]
    data: Vec<Value>,
}

/// Blocking client for the Log Analytics query API and the Azure Monitor
/// metrics REST API
pub struct AzureMonitorClient {
    http: Client,
    credential: Option<AzureCredential>,
}

impl AzureMonitorClient {
    pub fn new(credential: Option<AzureCredential>) -> Self {
        Self {
            http: Client::new(),
            credential,
        }
    }

    pub fn from_env() -> Self {
        Self::new(AzureCredential::from_env())
    }

    fn token_for(&self, resource: &str) -> Result<String, TelemetryError> {
        match self
            .credential
            .as_ref()
            .ok_or(TelemetryError::MissingCredentials)?
        {
            AzureCredential::AccessToken(token) => Ok(token.clone()),
            AzureCredential::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let url = format!("{LOGIN_ENDPOINT}/{tenant_id}/oauth2/v2.0/token");
                let scope = format!("{resource}/.default");
                let request = self.http.post(&url).form(&[
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("scope", scope.as_str()),
                ]);
                let token: TokenResponse = send_json(request, &url)?;
                Ok(token.access_token)
            }
        }
    }
}

fn send_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<T, TelemetryError> {
    let http_err = |source| TelemetryError::Http {
        url: url.to_string(),
        source,
    };

    let response: Response = request.send().map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(TelemetryError::Api {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().map_err(http_err)
}

impl TelemetryBackend for AzureMonitorClient {
    fn query_workspace(
        &self,
        workspace_id: &str,
        query: &str,
        timespan: &Timespan,
    ) -> Result<Vec<QueryTable>, TelemetryError> {
        let token = self.token_for(LOG_ANALYTICS_ENDPOINT)?;
        let url = format!("{LOG_ANALYTICS_ENDPOINT}/v1/workspaces/{workspace_id}/query");
        debug!(%url, %timespan, "running log analytics query");

        let request = self.http.post(&url).bearer_auth(token).json(&json!({
            "query": query,
            "timespan": timespan.as_iso8601(),
        }));
        let response: QueryResponse = send_json(request, &url)?;
        Ok(response.tables)
    }

    fn query_metrics(&self, request: &MetricsRequest) -> Result<Vec<MetricPoint>, TelemetryError> {
        let token = self.token_for(MANAGEMENT_ENDPOINT)?;
        let url = format!(
            "{MANAGEMENT_ENDPOINT}/{}/providers/microsoft.insights/metrics",
            request.resource_id.trim_start_matches('/')
        );
        debug!(%url, metric = %request.metric_name, "querying metrics");

        let interval = request.timespan.interval_ending(Utc::now())?;
        let http_request = self.http.get(&url).bearer_auth(token).query(&[
            ("api-version", METRICS_API_VERSION),
            ("metricnames", request.metric_name.as_str()),
            ("timespan", interval.as_str()),
            ("interval", request.interval.as_iso8601()),
            ("aggregation", request.aggregation.api_name()),
        ]);
        let response: MetricsResponse = send_json(http_request, &url)?;

        let field = request.aggregation.field_name();
        Ok(response
            .value
            .iter()
            .flat_map(|series| series.timeseries.iter())
            .flat_map(|ts| ts.data.iter())
            .map(|point| MetricPoint {
                timestamp: point
                    .get("timeStamp")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                value: point.get(field).and_then(Value::as_f64),
            })
            .collect())
    }
}
