use std::time::Duration;

use clap::Args;

use crate::{
    audit::{AuditSettings, DeletionMode},
    cli::commands::{aws::AwsArgs, output::OutputArgs},
};

/// `keywarden audit`: warn owners of stale keys and revoke the oldest ones
#[derive(Args, Debug, Clone)]
pub struct AuditArgs {
    /// Sender address for warning emails (must be verified in SES)
    #[arg(long, env = "EMAIL_FROM_ADDRESS", value_name = "ADDRESS")]
    pub from_address: String,

    /// Deletion switch. Keys older than 100 days are deleted only when this is exactly `--dry-run`
    #[arg(
        long = "deletion-flag",
        env = "DRY_RUN",
        value_name = "FLAG",
        allow_hyphen_values = true
    )]
    pub deletion_flag: Option<String>,

    /// Report keys older than DAYS ahead of the built-in 57/50 day thresholds
    #[arg(long, value_name = "DAYS")]
    pub older_than: Option<u32>,

    /// Abort if enumerating users and keys takes longer than this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Exit 0 even when the audit aborted or some actions failed
    #[arg(long, default_value_t = false)]
    pub always_succeed: bool,

    #[command(flatten)]
    pub aws: AwsArgs,

    #[command(flatten)]
    pub output_args: OutputArgs,
}

impl AuditArgs {
    pub fn deletion_mode(&self) -> DeletionMode {
        DeletionMode::from_flag(self.deletion_flag.as_deref())
    }

    pub fn settings(&self) -> AuditSettings {
        AuditSettings {
            mode: self.deletion_mode(),
            older_than: self.older_than,
            enumeration_timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}
