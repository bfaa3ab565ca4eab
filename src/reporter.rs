use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    age,
    audit::{AuditOutcome, DeletionAction, DeletionMode, NoticeOutcome, StaleCredentialNotice},
    cli::commands::output::ReportOutputFormat,
};

#[derive(Serialize)]
struct NoticeRecord<'a> {
    #[serde(flatten)]
    notice: &'a StaleCredentialNotice,
    age_days: i64,
}

#[derive(Serialize)]
struct AuditSummary<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<DeletionMode>,
    notices: usize,
    notified: usize,
    deleted: usize,
    failures: usize,
    outcomes: &'a [NoticeOutcome],
}

/// Write the stale keys found by `keywarden report`.
pub fn write_notices<W: Write>(
    format: ReportOutputFormat,
    mut writer: W,
    notices: &[StaleCredentialNotice],
    now: DateTime<Utc>,
) -> Result<()> {
    match format {
        ReportOutputFormat::Json => {
            let records: Vec<_> = notices
                .iter()
                .map(|notice| NoticeRecord {
                    notice,
                    age_days: age::age_in_days(notice.key.created_at, now),
                })
                .collect();
            serde_json::to_writer_pretty(&mut writer, &records)?;
            writeln!(writer)?;
        }
        ReportOutputFormat::Pretty => {
            if notices.is_empty() {
                writeln!(writer, "No stale access keys found.")?;
            }
            for notice in notices {
                writeln!(
                    writer,
                    "{} <{}>  {}  created {}  {} days old  (older than {} days)",
                    notice.user_name,
                    notice.email,
                    notice.key.access_key_id,
                    notice.key.created_at.format("%Y-%m-%d"),
                    age::age_in_days(notice.key.created_at, now),
                    notice.threshold,
                )?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write the end-of-run summary for `keywarden audit`.
pub fn write_audit_summary<W: Write>(
    format: ReportOutputFormat,
    mut writer: W,
    outcome: &AuditOutcome,
) -> Result<()> {
    let (status, error) = match outcome {
        AuditOutcome::Completed(_) => ("completed", None),
        AuditOutcome::PartialFailure(_) => ("partial_failure", None),
        AuditOutcome::Aborted(err) => ("aborted", Some(err.to_string())),
    };
    let report = outcome.report();

    match format {
        ReportOutputFormat::Json => {
            let summary = AuditSummary {
                status,
                error,
                mode: report.map(|r| r.mode),
                notices: report.map_or(0, |r| r.notices()),
                notified: report.map_or(0, |r| r.notified()),
                deleted: report.map_or(0, |r| r.deleted()),
                failures: report.map_or(0, |r| r.failures()),
                outcomes: report.map(|r| r.outcomes.as_slice()).unwrap_or_default(),
            };
            serde_json::to_writer_pretty(&mut writer, &summary)?;
            writeln!(writer)?;
        }
        ReportOutputFormat::Pretty => {
            writeln!(writer, "Audit {status}")?;
            if let Some(error) = error {
                writeln!(writer, "  error: {error}")?;
            }
            if let Some(report) = report {
                for o in &report.outcomes {
                    let mail = match &o.notify_error {
                        None => "warned".to_string(),
                        Some(err) => format!("warning failed: {err}"),
                    };
                    let deletion = match &o.deletion {
                        DeletionAction::NotDue => "kept".to_string(),
                        DeletionAction::Skipped => "deletion skipped".to_string(),
                        DeletionAction::Deleted => "deleted".to_string(),
                        DeletionAction::Failed(err) => format!("deletion failed: {err}"),
                    };
                    writeln!(
                        writer,
                        "  {} {} (>{} days): {mail}, {deletion}",
                        o.notice.user_name, o.notice.key.access_key_id, o.notice.threshold
                    )?;
                }
                writeln!(
                    writer,
                    "  {} stale keys, {} warned, {} deleted, {} failed",
                    report.notices(),
                    report.notified(),
                    report.deleted(),
                    report.failures()
                )?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}
