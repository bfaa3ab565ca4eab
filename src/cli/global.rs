use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::Level;

use crate::cli::commands::{audit::AuditArgs, report::ReportArgs};

#[deny(missing_docs)]
#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"))]
/// Keywarden - Warn IAM users about stale access keys and revoke the oldest
pub struct CommandLineArgs {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Global arguments that apply to all subcommands
    #[command(flatten)]
    pub global_args: GlobalArgs,
}

impl CommandLineArgs {
    /// Parse command-line arguments.
    ///
    /// `--quiet` wins over any number of `-v` flags.
    pub fn parse_args() -> Self {
        let mut args = CommandLineArgs::parse();
        if args.global_args.quiet {
            args.global_args.verbose = 0;
        }
        args
    }
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Warn owners of stale access keys and delete keys past the hard limit
    Audit(AuditArgs),

    /// List stale access keys without notifying or deleting
    Report(ReportArgs),
}

/// Top-level global CLI arguments
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Global Options")]
pub struct GlobalArgs {
    /// Enable verbose output (up to 3 times for more detail)
    #[arg(global = true, long = "verbose", short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error messages
    #[arg(global = true, long, short)]
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::INFO,  // Default level if no `-v` is provided
                1 => Level::DEBUG, // `-v`
                _ => Level::TRACE, // `-vv` or more
            }
        }
    }

    /// `-vvv` also turns on logging from the AWS SDK crates.
    pub fn all_targets(&self) -> bool {
        !self.quiet && self.verbose > 2
    }
}
