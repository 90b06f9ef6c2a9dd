//! Kusto query builders for the standard Application Insights tables

use serde::Deserialize;

fn default_short_limit() -> u32 {
    50
}

fn default_limit() -> u32 {
    100
}

/// Quote `value` as a Kusto string literal
pub fn string_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn render(table: &str, clauses: &[String], limit: u32, project: &str) -> String {
    let where_str = if clauses.is_empty() {
        "1==1".to_string()
    } else {
        clauses.join(" and ")
    };

    format!(
        "{table}\n| where {where_str}\n| order by timestamp desc\n| take {limit}\n| project {project}"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionSeverity {
    All,
    Error,
    Critical,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionsQuery {
    #[serde(default = "default_short_limit")]
    pub limit: u32,
    #[serde(default)]
    pub severity: Option<ExceptionSeverity>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ExceptionsQuery {
    pub fn to_kql(&self) -> String {
        let mut clauses = Vec::new();
        match self.severity {
            Some(ExceptionSeverity::Error) => clauses.push("severityLevel >= 3".to_string()),
            Some(ExceptionSeverity::Critical) => clauses.push("severityLevel >= 4".to_string()),
            Some(ExceptionSeverity::All) | None => {}
        }
        if let Some(search) = non_empty(&self.search) {
            clauses.push(format!("outerMessage contains {}", string_literal(search)));
        }

        render(
            "exceptions",
            &clauses,
            self.limit,
            "timestamp, problemId, outerType, outerMessage, severityLevel, details=tostring(details), cloud_RoleName, operation_Id",
        )
    }
}

/// Application Insights trace severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceSeverity {
    Verbose,
    Info,
    Warning,
    Error,
    Critical,
}

impl TraceSeverity {
    pub fn level(self) -> u8 {
        match self {
            TraceSeverity::Verbose => 0,
            TraceSeverity::Info => 1,
            TraceSeverity::Warning => 2,
            TraceSeverity::Error => 3,
            TraceSeverity::Critical => 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracesQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub severity: Option<TraceSeverity>,
    #[serde(default)]
    pub search: Option<String>,
}

impl TracesQuery {
    pub fn to_kql(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(severity) = self.severity {
            clauses.push(format!("severityLevel == {}", severity.level()));
        }
        if let Some(search) = non_empty(&self.search) {
            clauses.push(format!("message contains {}", string_literal(search)));
        }

        render(
            "traces",
            &clauses,
            self.limit,
            "timestamp, message, severityLevel, cloud_RoleName, operation_Id",
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestsQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub failed_only: bool,
    #[serde(default)]
    pub min_duration_ms: Option<u64>,
    #[serde(default)]
    pub url_filter: Option<String>,
}

impl RequestsQuery {
    pub fn to_kql(&self) -> String {
        let mut clauses = Vec::new();
        if self.failed_only {
            clauses.push("success == false".to_string());
        }
        if let Some(ms) = self.min_duration_ms.filter(|ms| *ms > 0) {
            clauses.push(format!("duration > {ms}"));
        }
        if let Some(url) = non_empty(&self.url_filter) {
            clauses.push(format!("url contains {}", string_literal(url)));
        }

        render(
            "requests",
            &clauses,
            self.limit,
            "timestamp, name, url, resultCode, duration, success, cloud_RoleName, operation_Id",
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependenciesQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub failed_only: bool,
    #[serde(default)]
    pub type_filter: Option<String>,
}

impl DependenciesQuery {
    pub fn to_kql(&self) -> String {
        let mut clauses = Vec::new();
        if self.failed_only {
            clauses.push("success == false".to_string());
        }
        if let Some(kind) = non_empty(&self.type_filter) {
            clauses.push(format!("type == {}", string_literal(kind)));
        }

        render(
            "dependencies",
            &clauses,
            self.limit,
            "timestamp, name, type, target, data, duration, success, resultCode, cloud_RoleName, operation_Id",
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default = "default_short_limit")]
    pub limit: u32,
    #[serde(default)]
    pub test_name: Option<String>,
    #[serde(default)]
    pub failed_only: bool,
}

impl AvailabilityQuery {
    pub fn to_kql(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(name) = non_empty(&self.test_name) {
            clauses.push(format!("name == {}", string_literal(name)));
        }
        if self.failed_only {
            clauses.push("success == false".to_string());
        }

        render(
            "availabilityResults",
            &clauses,
            self.limit,
            "timestamp, name, location, success, duration, message",
        )
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_escapes_quotes_and_backslashes() {
        assert_eq!(string_literal(r#"say "hi" \o/"#), r#""say \"hi\" \\o/""#);
    }

    #[test]
    fn test_exceptions_without_filters_uses_tautology() {
        let q = ExceptionsQuery {
            limit: 50,
            severity: Some(ExceptionSeverity::All),
            search: None,
        };
        let kql = q.to_kql();
        assert!(kql.starts_with("exceptions\n| where 1==1\n| order by timestamp desc\n| take 50\n"));
    }

    #[test]
    fn test_traces_severity_is_exact_level() {
        let q = TracesQuery {
            limit: 10,
            severity: Some(TraceSeverity::Warning),
            search: Some("timeout".to_string()),
        };
        assert!(
            q.to_kql()
                .contains("| where severityLevel == 2 and message contains \"timeout\"")
        );
    }

    #[test]
    fn test_requests_ignores_zero_duration() {
        let q = RequestsQuery {
            limit: 5,
            failed_only: true,
            min_duration_ms: Some(0),
            url_filter: None,
        };
        assert!(q.to_kql().contains("| where success == false\n"));
    }
}
