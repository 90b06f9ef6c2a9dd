use super::context::assemble;
use super::error::FilterError;
use super::matcher::{LineMatcher, LineVerdict};
use super::options::FilterOptions;

/// A compiled, reusable log filter
#[derive(Debug, Clone)]
pub struct LogFilter {
    matcher: LineMatcher,
    context_lines: usize,
}

impl LogFilter {
    pub fn new(options: &FilterOptions) -> Result<Self, FilterError> {
        Ok(Self {
            matcher: LineMatcher::compile(options)?,
            context_lines: options.context_lines,
        })
    }

    /// Filter a block of log text.
    ///
    /// Lines are split on `\n` (a trailing `\r` is dropped) and the survivors
    /// are joined with `\n` without a trailing newline. Returns an empty
    /// string when nothing matches.
    pub fn apply(&self, raw_text: &str) -> String {
        let lines: Vec<&str> = raw_text.lines().collect();
        let verdicts: Vec<LineVerdict> = lines
            .iter()
            .map(|line| self.matcher.verdict(line))
            .collect();

        assemble(&lines, &verdicts, self.context_lines).join("\n")
    }
}

/// Compile `options` and filter `raw_text` in one step
pub fn filter_logs(raw_text: &str, options: &FilterOptions) -> Result<String, FilterError> {
    Ok(LogFilter::new(options)?.apply(raw_text))
}
