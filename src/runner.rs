use std::time::Duration;

use anyhow::Result;
use aws_config::SdkConfig;
use chrono::Utc;
use tracing::{error, info};

use crate::{
    audit::{self, with_deadline, AuditError, AuditOutcome, DeletionMode},
    aws::{load_sdk_config, AwsSettings},
    cli::commands::{audit::AuditArgs, report::ReportArgs},
    iam::IamDirectory,
    notify::SesNotifier,
    reporter,
};

/// Load the SDK configuration, classifying any failure as [`AuditError::Config`].
pub async fn load_audit_config(settings: &AwsSettings) -> Result<SdkConfig, AuditError> {
    load_sdk_config(settings).await.map_err(AuditError::Config)
}

/// `keywarden audit`. Returns the process exit code.
pub async fn run_audit_command(args: &AuditArgs) -> Result<i32> {
    let settings = args.settings();
    if settings.mode == DeletionMode::EnableDestructiveAction {
        info!("Deletion enabled: keys older than 100 days will be removed");
    }

    let outcome = match load_audit_config(&args.aws.settings()).await {
        Err(err) => {
            error!("{err}");
            AuditOutcome::Aborted(err)
        }
        Ok(config) => {
            let directory = IamDirectory::new(&config);
            let notifier = SesNotifier::new(&config, args.from_address.clone());
            info!("Sending warnings from {}", notifier.from_address());
            audit::run_audit(&directory, &notifier, settings, Utc::now()).await
        }
    };

    reporter::write_audit_summary(args.output_args.format, args.output_args.get_writer()?, &outcome)?;

    if args.always_succeed {
        Ok(AuditOutcome::EXIT_COMPLETED)
    } else {
        Ok(outcome.exit_code())
    }
}

/// `keywarden report`. Enumeration failures surface as errors.
pub async fn run_report_command(args: &ReportArgs) -> Result<()> {
    let config = load_audit_config(&args.aws.settings()).await?;
    let directory = IamDirectory::new(&config);
    let now = Utc::now();

    let limit = args.timeout_secs.map(Duration::from_secs);
    let notices =
        with_deadline(limit, audit::find_stale_credentials(&directory, now, args.older_than))
            .await?;
    info!("{} stale access keys found", notices.len());

    reporter::write_notices(args.output_args.format, args.output_args.get_writer()?, &notices, now)
}

