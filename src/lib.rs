pub mod age;
pub mod audit;
pub mod aws;
pub mod cli;
pub mod iam;
pub mod notify;
pub mod pagination;
pub mod reporter;
pub mod runner;

pub use audit::{
    act_on_notices, find_stale_credentials, run_audit, AuditError, AuditOutcome, AuditReport,
    AuditSettings, DeletionMode, StaleCredentialNotice,
};
