use clap::Args;

use crate::cli::commands::{aws::AwsArgs, output::OutputArgs};

/// `keywarden report`: list stale keys without sending mail or deleting anything
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Report keys older than DAYS ahead of the built-in 57/50 day thresholds
    #[arg(long, value_name = "DAYS")]
    pub older_than: Option<u32>,

    /// Abort if enumerating users and keys takes longer than this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    #[command(flatten)]
    pub aws: AwsArgs,

    #[command(flatten)]
    pub output_args: OutputArgs,
}
