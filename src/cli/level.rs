use crate::filter::Severity;
use clap::ValueEnum;

/// Command-line spelling of a log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Trace,
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
    Fatal,
}

impl From<LevelArg> for Severity {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Trace => Severity::Trace,
            LevelArg::Debug => Severity::Debug,
            LevelArg::Info => Severity::Info,
            LevelArg::Warn => Severity::Warn,
            LevelArg::Error => Severity::Error,
            LevelArg::Fatal => Severity::Fatal,
        }
    }
}
