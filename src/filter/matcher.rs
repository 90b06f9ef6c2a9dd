use super::error::FilterError;
use super::options::FilterOptions;
use super::severity::{Severity, classify};
use regex::{Regex, RegexBuilder};

/// Outcome of testing one line against the compiled filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVerdict {
    /// Passed every check; must appear in the output
    Anchor,
    /// Failed the include or level check; may still appear as context
    Rejected,
    /// Matched the exclude pattern; never appears in the output
    Excluded,
}

/// Filter criteria with both regexes compiled up front
#[derive(Debug, Clone)]
pub struct LineMatcher {
    include: Option<Regex>,
    exclude: Option<Regex>,
    min_level: Option<Severity>,
}

impl LineMatcher {
    /// Compile the include and exclude patterns of `options`.
    ///
    /// Fails with [`FilterError::InvalidPattern`] before any line is looked at
    /// if either pattern is not a valid regular expression.
    pub fn compile(options: &FilterOptions) -> Result<Self, FilterError> {
        let build = |field: &'static str, pattern: &Option<String>| {
            pattern
                .as_deref()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(!options.case_sensitive)
                        .build()
                        .map_err(|source| FilterError::InvalidPattern {
                            field,
                            pattern: p.to_string(),
                            source,
                        })
                })
                .transpose()
        };

        Ok(Self {
            include: build("pattern", &options.include_pattern)?,
            exclude: build("exclude_pattern", &options.exclude_pattern)?,
            min_level: options.min_level,
        })
    }

    pub fn verdict(&self, line: &str) -> LineVerdict {
        if self.exclude.as_ref().is_some_and(|re| re.is_match(line)) {
            return LineVerdict::Excluded;
        }

        if self.include.as_ref().is_some_and(|re| !re.is_match(line)) {
            return LineVerdict::Rejected;
        }

        if let Some(min) = self.min_level
            && let Some(level) = classify(line)
            && level.rank() < min.rank()
        {
            return LineVerdict::Rejected;
        }

        LineVerdict::Anchor
    }

    pub fn passes(&self, line: &str) -> bool {
        self.verdict(line) == LineVerdict::Anchor
    }
}
