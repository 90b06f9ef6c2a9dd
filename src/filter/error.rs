use thiserror::Error;

/// Errors that can occur when compiling filter options
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid {field} regex '{pattern}': {source}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
