use super::severity::Severity;

/// Settings for one filtering pass over a block of log text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub min_level: Option<Severity>,
    pub include_pattern: Option<String>,
    pub exclude_pattern: Option<String>,
    pub case_sensitive: bool,
    pub context_lines: usize,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_level(mut self, level: Option<Severity>) -> Self {
        self.min_level = level;
        self
    }

    pub fn include(mut self, pattern: Option<impl Into<String>>) -> Self {
        self.include_pattern = pattern.map(|p| p.into());
        self
    }

    pub fn exclude(mut self, pattern: Option<impl Into<String>>) -> Self {
        self.exclude_pattern = pattern.map(|p| p.into());
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    /// True when at least one criterion can drop a line
    pub fn is_selective(&self) -> bool {
        self.min_level.is_some() || self.include_pattern.is_some() || self.exclude_pattern.is_some()
    }
}
