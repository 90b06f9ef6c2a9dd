//! Log line filtering
//!
//! Free-form log text is split into lines, each line is tested against an
//! optional exclude regex, an optional include regex and an optional minimum
//! severity, and the surviving lines are emitted together with a configurable
//! amount of surrounding context.
//!
//! # Evaluation order
//!
//! ```text
//! exclude_pattern matches        -> dropped (never shown, not even as context)
//! pattern set and does not match -> dropped (may still be shown as context)
//! severity below min_level       -> dropped (may still be shown as context)
//! otherwise                      -> anchor line
//! ```
//!
//! Lines without a recognizable severity token are never dropped by the
//! level check alone.
//!
//! # Examples
//!
//! ```
//! use infra_probe::filter::{FilterOptions, Severity, filter_logs};
//!
//! let options = FilterOptions::new().min_level(Some(Severity::Error));
//! let out = filter_logs("INFO ok\nERROR fail\nWARN warning", &options).unwrap();
//! assert_eq!(out, "ERROR fail");
//! ```

pub mod context;
pub mod error;
pub mod matcher;
pub mod options;
pub mod pipeline;
pub mod severity;

pub use context::assemble;
pub use error::FilterError;
pub use matcher::{LineMatcher, LineVerdict};
pub use options::FilterOptions;
pub use pipeline::{LogFilter, filter_logs};
pub use severity::{Severity, classify};
