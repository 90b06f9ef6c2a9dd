use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
    Fatal,
}

impl Severity {
    /// All levels in ascending order of severity
    pub const ALL: [Severity; 6] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Ordinal position used for threshold comparisons
    pub fn rank(self) -> u8 {
        match self {
            Severity::Trace => 0,
            Severity::Debug => 1,
            Severity::Info => 2,
            Severity::Warn => 3,
            Severity::Error => 4,
            Severity::Fatal => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }

    fn token_pattern(self) -> &'static str {
        match self {
            Severity::Trace => r"(?i)\b(?:trace|trc)\b",
            Severity::Debug => r"(?i)\b(?:debug|dbg)\b",
            Severity::Info => r"(?i)\b(?:info|inf)\b",
            Severity::Warn => r"(?i)\b(?:warn|warning|wrn)\b",
            Severity::Error => r"(?i)\b(?:error|err)\b",
            Severity::Fatal => r"(?i)\b(?:fatal|critical|ftl)\b",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Kept in ascending order: classification is first-match-wins over this table.
static LEVEL_PATTERNS: LazyLock<Vec<(Severity, Regex)>> = LazyLock::new(|| {
    Severity::ALL
        .iter()
        .map(|&level| {
            let re = Regex::new(level.token_pattern()).expect("valid severity token regex");
            (level, re)
        })
        .collect()
});

/// Infer the severity of a single log line.
///
/// Levels are tested from `trace` up to `fatal` and the first level whose
/// token appears in the line wins, so `"INFO retrying after ERROR"` is `info`.
/// Returns `None` when the line carries no recognizable token.
pub fn classify(line: &str) -> Option<Severity> {
    LEVEL_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(line))
        .map(|(level, _)| *level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_common_formats() {
        assert_eq!(classify("2026-01-01 INFO server started"), Some(Severity::Info));
        assert_eq!(classify("level=warning msg=slow"), Some(Severity::Warn));
        assert_eq!(classify("[WRN] disk almost full"), Some(Severity::Warn));
        assert_eq!(classify("E ERR connection reset"), Some(Severity::Error));
        assert_eq!(classify("CRITICAL: out of memory"), Some(Severity::Fatal));
        assert_eq!(classify("dbg: cache miss"), Some(Severity::Debug));
        assert_eq!(classify("TRC enter handler"), Some(Severity::Trace));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("Error: boom"), Some(Severity::Error));
        assert_eq!(classify("Fatal exception"), Some(Severity::Fatal));
    }

    #[test]
    fn test_classify_requires_word_boundaries() {
        assert_eq!(classify("information about errors"), None);
        assert_eq!(classify("terrible things happened"), None);
    }

    #[test]
    fn test_classify_first_match_wins_in_ascending_order() {
        assert_eq!(classify("INFO request ended with ERROR"), Some(Severity::Info));
        assert_eq!(classify("ERROR while emitting debug dump"), Some(Severity::Debug));
    }

    #[test]
    fn test_classify_unknown_line() {
        assert_eq!(classify("GET /healthz 200"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_severity_ordering_and_parsing() {
        assert!(Severity::Trace < Severity::Debug);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(serde_json::from_str::<Severity>("\"warning\"").unwrap(), Severity::Warn);
        assert_eq!(serde_json::from_str::<Severity>("\"error\"").unwrap(), Severity::Error);
        assert!(serde_json::from_str::<Severity>("\"verbose\"").is_err());
        assert_eq!(Severity::Fatal.to_string(), "fatal");
    }
}
