mod format;

use clap::{ArgAction, Args, Parser, Subcommand};
pub use format::OutputFormat;
use std::path::PathBuf;

/// Filter combined-format access logs with a boolean match expression
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config file with field names and output defaults
    #[arg(short, long, global = true, env = "LOGMATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format, overrides the config file
    #[arg(short = 'F', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the records of FILE (or stdin) that match
    Filter(FilterArgs),
    /// Compile an expression and print its canonical form
    Explain {
        /// Boolean match expression
        #[arg(allow_hyphen_values = true)]
        expression: String,

        /// Print a Graphviz digraph instead of the canonical form
        #[arg(long)]
        dot: bool,
    },
    /// List field names and their record indexes
    Fields,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Access log to scan, stdin when omitted
    pub file: Option<PathBuf>,

    /// Boolean match expression, e.g. "method=/GET/ && -code~/^2/"
    #[arg(short, long, conflicts_with = "match_spec", allow_hyphen_values = true)]
    pub expression: Option<String>,

    /// Single comparison: field=value or field~regex
    #[arg(short = 'm', long = "match")]
    pub match_spec: Option<String>,

    /// Comma-separated output fields (default: all)
    #[arg(short, long)]
    pub fields: Option<String>,

    /// Print the whole input line instead of selected fields
    #[arg(short = 'L', long)]
    pub whole_line: bool,

    /// Rewrite the timestamp field as RFC 3339
    #[arg(short, long)]
    pub rfc3339: bool,

    /// Write lines that fail to parse to this file
    #[arg(short, long)]
    pub bad_lines: Option<PathBuf>,
}

impl Cli {
    /// Log level implied by -v / -q
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
