//! The key audit workflow.
//!
//! One sequential pass: page through users, skip those without an `email`
//! tag, page through each user's access keys and turn every stale key into a
//! [`StaleCredentialNotice`]. Each notice is then acted on in discovery order:
//! warn the owner, and revoke the key if it is past [`DELETE_AFTER_DAYS`] and
//! destructive mode is on.
//!
//! Enumeration failures abort the run. Notification and deletion failures are
//! recorded per notice and the run carries on.

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::{
    age::{self, AgeThreshold, DELETE_AFTER_DAYS},
    iam::{self, AccessKey, IdentityDirectory},
    notify::{ExpiryMessage, Notifier},
};

/// Flag value that turns revocation on.
///
/// The name reads like a dry-run switch but it is the opposite: only this
/// exact string allows keys to be deleted.
pub const DELETION_SENTINEL: &str = "--dry-run";

/// Whether stale keys past the hard limit are actually revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionMode {
    EnableDestructiveAction,
    #[default]
    Default,
}

impl DeletionMode {
    /// Map the raw flag value; anything but an exact sentinel match is `Default`.
    pub fn from_flag(raw: Option<&str>) -> Self {
        match raw {
            Some(DELETION_SENTINEL) => Self::EnableDestructiveAction,
            _ => Self::Default,
        }
    }

    pub fn deletes(self) -> bool {
        matches!(self, Self::EnableDestructiveAction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleCredentialNotice {
    pub user_name: String,
    pub email: String,
    pub key: AccessKey,
    pub threshold: AgeThreshold,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AuditSettings {
    pub mode: DeletionMode,
    /// Extra threshold checked ahead of the fixed 57/50 chain.
    pub older_than: Option<u32>,
    /// Upper bound on enumeration. Once notices are being acted on the run
    /// is never cut short, so every deletion lands in the report.
    pub enumeration_timeout: Option<Duration>,
}

/// Failures that end a run before every notice has been acted on.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Couldn't load configuration. Have you set up your AWS account? {0:#}")]
    Config(anyhow::Error),

    #[error("Error listing users: {0:#}")]
    ListUsers(anyhow::Error),

    #[error("Error listing tags for user `{user_name}`: {error:#}")]
    ListTags { user_name: String, error: anyhow::Error },

    #[error("Error listing access keys for user `{user_name}`: {error:#}")]
    ListAccessKeys { user_name: String, error: anyhow::Error },

    #[error("Enumeration did not finish within {0:?}")]
    TimedOut(Duration),
}

/// What happened to a key at the revocation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum DeletionAction {
    /// Younger than the hard limit.
    NotDue,
    /// Past the hard limit, but destructive mode is off.
    Skipped,
    Deleted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeOutcome {
    pub notice: StaleCredentialNotice,
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_error: Option<String>,
    pub deletion: DeletionAction,
}

impl NoticeOutcome {
    pub fn failed(&self) -> bool {
        self.notify_error.is_some() || matches!(self.deletion, DeletionAction::Failed(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub mode: DeletionMode,
    pub outcomes: Vec<NoticeOutcome>,
}

impl AuditReport {
    pub fn notices(&self) -> usize {
        self.outcomes.len()
    }

    pub fn notified(&self) -> usize {
        self.outcomes.iter().filter(|o| o.notified).count()
    }

    pub fn deleted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.deletion == DeletionAction::Deleted).count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.failed()).count()
    }
}

/// How an audit run ended.
#[derive(Debug)]
pub enum AuditOutcome {
    /// Every notice was notified and, where due, revoked.
    Completed(AuditReport),
    /// All notices were processed but at least one notification or deletion failed.
    PartialFailure(AuditReport),
    /// Configuration, enumeration or the enumeration deadline failed before
    /// the action phase began, so no mail was sent and no key was deleted.
    Aborted(AuditError),
}

impl AuditOutcome {
    pub const EXIT_COMPLETED: i32 = 0;
    pub const EXIT_ABORTED: i32 = 2;
    pub const EXIT_PARTIAL_FAILURE: i32 = 3;

    pub fn from_report(report: AuditReport) -> Self {
        if report.failures() > 0 {
            Self::PartialFailure(report)
        } else {
            Self::Completed(report)
        }
    }

    pub fn report(&self) -> Option<&AuditReport> {
        match self {
            Self::Completed(report) | Self::PartialFailure(report) => Some(report),
            Self::Aborted(_) => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed(_) => Self::EXIT_COMPLETED,
            Self::PartialFailure(_) => Self::EXIT_PARTIAL_FAILURE,
            Self::Aborted(_) => Self::EXIT_ABORTED,
        }
    }
}

/// Enumerate every user with an `email` tag and collect a notice for each stale key.
///
/// Notices come out in user order, then key order within a user.
pub async fn find_stale_credentials(
    directory: &dyn IdentityDirectory,
    now: DateTime<Utc>,
    older_than: Option<u32>,
) -> Result<Vec<StaleCredentialNotice>, AuditError> {
    let users = iam::list_all_users(directory).await.map_err(AuditError::ListUsers)?;
    debug!("Found {} IAM users", users.len());

    let mut notices = Vec::new();
    for user in users {
        let user_name = user.user_name;
        let email = iam::find_email_tag(directory, &user_name).await.map_err(|error| {
            AuditError::ListTags { user_name: user_name.clone(), error }
        })?;
        let Some(email) = email else {
            debug!("Skipping user {user_name}: no {} tag", iam::EMAIL_TAG_KEY);
            continue;
        };

        let keys = iam::list_all_access_keys(directory, &user_name).await.map_err(|error| {
            AuditError::ListAccessKeys { user_name: user_name.clone(), error }
        })?;

        for key in keys {
            let Some(threshold) = age::classify(key.created_at, now, older_than) else {
                continue;
            };
            info!(
                "Access key {} for user {user_name} is older than {threshold} days ({} days old)",
                key.access_key_id,
                age::age_in_days(key.created_at, now)
            );
            notices.push(StaleCredentialNotice {
                user_name: user_name.clone(),
                email: email.clone(),
                key,
                threshold,
            });
        }
    }

    Ok(notices)
}

/// Warn and, where due, revoke for each notice in order.
///
/// A failed notification does not stop the revocation step for the same key.
pub async fn act_on_notices(
    directory: &dyn IdentityDirectory,
    notifier: &dyn Notifier,
    notices: Vec<StaleCredentialNotice>,
    mode: DeletionMode,
    now: DateTime<Utc>,
) -> AuditReport {
    let mut outcomes = Vec::with_capacity(notices.len());

    for notice in notices {
        let message = ExpiryMessage::for_threshold(notice.threshold);
        let notify_error = match notifier.send(&notice.email, &message).await {
            Ok(()) => {
                info!("Warning sent to {} for user {}", notice.email, notice.user_name);
                None
            }
            Err(err) => {
                warn!("Error sending email to {} for user {}: {err:#}", notice.email, notice.user_name);
                Some(format!("{err:#}"))
            }
        };

        let deletion = if !age::is_older_than(notice.key.created_at, now, DELETE_AFTER_DAYS) {
            DeletionAction::NotDue
        } else if !mode.deletes() {
            info!(
                "Access key {} for user {} is past {DELETE_AFTER_DAYS} days; deletion disabled",
                notice.key.access_key_id, notice.user_name
            );
            DeletionAction::Skipped
        } else {
            match directory.delete_access_key(&notice.user_name, &notice.key.access_key_id).await {
                Ok(()) => {
                    info!(
                        "Deleted access key {} for user {}",
                        notice.key.access_key_id, notice.user_name
                    );
                    DeletionAction::Deleted
                }
                Err(err) => {
                    warn!("Error deleting access key {}: {err:#}", notice.key.access_key_id);
                    DeletionAction::Failed(format!("{err:#}"))
                }
            }
        };

        outcomes.push(NoticeOutcome {
            notified: notify_error.is_none(),
            notify_error,
            deletion,
            notice,
        });
    }

    AuditReport { mode, outcomes }
}

/// Run `fut`, giving up with [`AuditError::TimedOut`] once `limit` elapses.
pub async fn with_deadline<T, F>(limit: Option<Duration>, fut: F) -> Result<T, AuditError>
where
    F: Future<Output = Result<T, AuditError>>,
{
    match limit {
        Some(limit) => timeout(limit, fut).await.map_err(|_| AuditError::TimedOut(limit))?,
        None => fut.await,
    }
}

/// Run the full audit: enumerate, then act.
///
/// Only enumeration is bounded by `settings.enumeration_timeout`.
pub async fn run_audit(
    directory: &dyn IdentityDirectory,
    notifier: &dyn Notifier,
    settings: AuditSettings,
    now: DateTime<Utc>,
) -> AuditOutcome {
    let enumeration = find_stale_credentials(directory, now, settings.older_than);
    let notices = match with_deadline(settings.enumeration_timeout, enumeration).await {
        Ok(notices) => notices,
        Err(err) => {
            error!("Error getting users and their keys: {err}");
            return AuditOutcome::Aborted(err);
        }
    };
    info!("{} stale access keys found", notices.len());

    let report = act_on_notices(directory, notifier, notices, settings.mode, now).await;
    AuditOutcome::from_report(report)
}
