//! External command execution
//!
//! Tool handlers describe the command they need as a [`CommandSpec`] and hand
//! it to a [`CommandRunner`]. The real runner spawns the process and waits for
//! it; tests substitute a recording fake.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} command failed{}: {stderr}", exit_suffix(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" (exit code {c})")).unwrap_or_default()
}

/// A program invocation: argv plus an optional working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag` only when `enabled` is set
    pub fn arg_if(self, enabled: bool, flag: &str) -> Self {
        if enabled { self.arg(flag) } else { self }
    }

    /// Append `flag value` when `value` is present
    pub fn opt_pair(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.arg(flag).arg(v),
            None => self,
        }
    }

    /// Append a trailing positional argument when present
    pub fn opt_arg(self, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.arg(v),
            None => self,
        }
    }

    pub fn current_dir(mut self, dir: Option<&Path>) -> Self {
        self.cwd = dir.map(Path::to_path_buf);
        self
    }

    /// Every argv element including the program
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .argv()
            .into_iter()
            .map(|part| {
                if part.is_empty() || part.chars().any(|c| c.is_whitespace() || c == '"') {
                    format!("{part:?}")
                } else {
                    part.to_string()
                }
            })
            .collect();
        f.write_str(&rendered.join(" "))
    }
}

pub trait CommandRunner: Send + Sync {
    /// Run the command to completion and return its stdout
    fn run(&self, spec: &CommandSpec) -> Result<String, RunError>;
}

/// Runs commands as child processes of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<String, RunError> {
        debug!(command = %spec, cwd = ?spec.cwd, "running external command");

        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| RunError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(command = %spec, code = ?output.status.code(), "external command failed");
            return Err(RunError::Failed {
                program: spec.program.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
