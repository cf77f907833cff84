//! CLI definition and execution
//!
//! mku has a single job, so there are no subcommands: the positional path is
//! uploaded, unless `--completions` asks for a shell script instead.

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

pub mod completions;
pub mod upload;

/// mku - Misskey emoji uploader
///
/// Uploads image files to your Misskey Drive and registers them as custom
/// emoji. The emoji name is the file name up to the first ".", lowercased,
/// with "-" replaced by "_".
///
/// Set MISSKEY_URL (e.g. https://example.com) and MISSKEY_TOKEN before running.
/// The token needs the Drive read/write and emoji view/manage permissions.
#[derive(Parser, Debug)]
#[command(name = "mku")]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub upload: upload::UploadArgs,

    /// Output format: human-readable or JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging (same as --log debug)
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Warn)]
    pub log: LogLevel,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Filter directive for the tracing subscriber
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            LogLevel::Debug.as_str()
        } else {
            self.log.as_str()
        }
    }
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Execute the CLI and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    if let Some(shell) = cli.completions {
        return completions::execute(shell);
    }

    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    upload::execute(cli.upload, output_config).await
}
