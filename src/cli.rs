mod level;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
pub use level::LevelArg;
use std::path::PathBuf;

/// Inspect container, cluster and cloud logs, and cut them down to what matters
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "INFRA_PROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format for listings and tool results
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter log text by level and pattern, with optional context lines
    Filter {
        /// Log file to read (stdin when omitted)
        file: Option<PathBuf>,

        /// Drop lines below this level (lines without a level are kept)
        #[arg(short = 'l', long)]
        min_level: Option<LevelArg>,

        /// Keep only lines matching this regex
        #[arg(short, long)]
        pattern: Option<String>,

        /// Drop lines matching this regex
        #[arg(short = 'x', long)]
        exclude: Option<String>,

        /// Match patterns case-sensitively
        #[arg(long)]
        case_sensitive: bool,

        /// Lines of context to show around each match
        #[arg(short = 'C', long, default_value_t = 0)]
        context: usize,
    },
    /// List available tools
    Tools,
    /// Run a tool and print its output
    Call {
        /// Tool name (see `tools`)
        tool: String,

        /// Tool arguments as a JSON5 object, e.g. "{container: 'web', tail: 50}"
        #[arg(short, long)]
        args: Option<String>,
    },
    /// List available resources
    Resources,
    /// Print a resource by URI
    ReadResource {
        /// Resource URI, e.g. config://server
        uri: String,
    },
    /// List available prompt templates
    Prompts,
    /// Render a prompt template
    Prompt {
        /// Prompt name (see `prompts`)
        name: String,

        /// Template argument as KEY=VALUE (repeatable)
        #[arg(short, long = "arg", value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    /// Default tracing directive for the chosen verbosity
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
