//! Access key age classification.
//!
//! Keys are bucketed by a priority chain: an optional caller-supplied
//! threshold first, then 57 days, then 50 days. The first threshold a key is
//! older than becomes the label quoted in the warning email. Revocation uses a
//! separate fixed limit ([`DELETE_AFTER_DAYS`]) that ignores the label.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Keys older than this are warned with the "57 days" message.
pub const FINAL_WARNING_DAYS: u32 = 57;

/// Youngest age at which a key is reported at all.
pub const FIRST_WARNING_DAYS: u32 = 50;

/// Keys older than this are revoked when destructive mode is enabled.
pub const DELETE_AFTER_DAYS: u32 = 100;

/// The day count a stale key was found to be older than.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AgeThreshold(pub u32);

impl AgeThreshold {
    pub fn days(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgeThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// True when `created_at + days` lies strictly before `now`.
pub fn is_older_than(created_at: DateTime<Utc>, now: DateTime<Utc>, days: u32) -> bool {
    created_at + Duration::days(i64::from(days)) < now
}

/// Classify a key by age, returning `None` when it is not stale.
///
/// The chain is evaluated top to bottom and the first match wins:
/// `override_days` (when given), then [`FINAL_WARNING_DAYS`], then
/// [`FIRST_WARNING_DAYS`]. An override larger than 57 that the key has not
/// reached simply falls through to the fixed thresholds.
pub fn classify(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    override_days: Option<u32>,
) -> Option<AgeThreshold> {
    if let Some(days) = override_days {
        if is_older_than(created_at, now, days) {
            return Some(AgeThreshold(days));
        }
    }

    if is_older_than(created_at, now, FINAL_WARNING_DAYS) {
        Some(AgeThreshold(FINAL_WARNING_DAYS))
    } else if is_older_than(created_at, now, FIRST_WARNING_DAYS) {
        Some(AgeThreshold(FIRST_WARNING_DAYS))
    } else {
        None
    }
}

/// Whole days elapsed since `created_at`, for log lines.
pub fn age_in_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_days()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn aged(days: i64, extra_secs: i64) -> DateTime<Utc> {
        now() - Duration::days(days) - Duration::seconds(extra_secs)
    }

    #[test]
    fn fresh_keys_are_not_stale() {
        assert_eq!(classify(aged(0, 0), now(), None), None);
        assert_eq!(classify(aged(49, 0), now(), None), None);
    }

    #[test]
    fn exactly_fifty_days_is_not_stale() {
        assert_eq!(classify(aged(50, 0), now(), None), None);
        assert_eq!(classify(aged(50, 1), now(), None), Some(AgeThreshold(50)));
    }

    #[test]
    fn between_fifty_and_fifty_seven_gets_fifty() {
        assert_eq!(classify(aged(53, 0), now(), None), Some(AgeThreshold(50)));
        assert_eq!(classify(aged(57, 0), now(), None), Some(AgeThreshold(50)));
    }

    #[test]
    fn past_fifty_seven_gets_fifty_seven_regardless_of_how_old() {
        assert_eq!(classify(aged(57, 1), now(), None), Some(AgeThreshold(57)));
        assert_eq!(classify(aged(60, 0), now(), None), Some(AgeThreshold(57)));
        assert_eq!(classify(aged(400, 0), now(), None), Some(AgeThreshold(57)));
    }

    #[test]
    fn override_wins_when_exceeded() {
        assert_eq!(classify(aged(40, 0), now(), Some(30)), Some(AgeThreshold(30)));
        assert_eq!(classify(aged(120, 0), now(), Some(90)), Some(AgeThreshold(90)));
        assert_eq!(classify(aged(0, 1), now(), Some(0)), Some(AgeThreshold(0)));
    }

    #[test]
    fn override_not_reached_falls_through_to_fixed_chain() {
        assert_eq!(classify(aged(60, 0), now(), Some(90)), Some(AgeThreshold(57)));
        assert_eq!(classify(aged(52, 0), now(), Some(90)), Some(AgeThreshold(50)));
        assert_eq!(classify(aged(10, 0), now(), Some(30)), None);
    }

    #[test]
    fn deletion_limit_is_strict() {
        assert!(!is_older_than(aged(100, 0), now(), DELETE_AFTER_DAYS));
        assert!(is_older_than(aged(100, 1), now(), DELETE_AFTER_DAYS));
        assert!(!is_older_than(aged(60, 0), now(), DELETE_AFTER_DAYS));
    }

    #[test]
    fn label_renders_as_day_count() {
        assert_eq!(AgeThreshold(57).to_string(), "57");
        assert_eq!(age_in_days(aged(120, 30), now()), 120);
    }
}
