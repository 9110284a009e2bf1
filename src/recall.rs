//! Recall Model
//!
//! Per-color mastery records and the spaced-repetition update rules.
//! All update functions are pure: they take the current record and a
//! timestamp and return the updated record. Persistence is the session
//! controller's job.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Derived mastery bucket for a record. Ordering follows learning
/// progression, so `New < Learning < Mastered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MasteryLevel {
    New,
    Learning,
    Mastered,
}

/// Recall history for one color, created lazily on first encounter.
///
/// Every field defaults to its zero value so records persisted by older
/// builds (or hand-edited ones with missing fields) deserialize cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallRecord {
    #[serde(default)]
    pub correct_streak: u32,
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interval_days: u32,
    #[serde(default)]
    pub next_due_at: Option<DateTime<Utc>>,
}

impl RecallRecord {
    /// True if the color has never been presented for recall
    pub fn is_unattempted(&self) -> bool {
        self.correct_streak == 0 && self.last_reviewed_at.is_none()
    }

    /// True if a review is due at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        matches!(self.next_due_at, Some(due) if due <= now)
    }
}

/// Mastery bucket for a record under the configured thresholds
pub fn level_of(record: &RecallRecord, config: &Config) -> MasteryLevel {
    if record.correct_streak >= config.mastery_threshold {
        MasteryLevel::Mastered
    } else if record.correct_streak >= config.learning_threshold {
        MasteryLevel::Learning
    } else {
        MasteryLevel::New
    }
}

/// Record a successful recall: bump the streak and push the next review
/// out along the configured interval sequence (clamped at its tail).
pub fn apply_success(record: &RecallRecord, now: DateTime<Utc>, config: &Config) -> RecallRecord {
    let correct_streak = record.correct_streak + 1;
    let index = (correct_streak as usize).min(config.srs_intervals.len().saturating_sub(1));
    let interval_days = config.srs_intervals.get(index).copied().unwrap_or(0);

    RecallRecord {
        correct_streak,
        last_reviewed_at: Some(now),
        interval_days,
        next_due_at: Some(now + Duration::days(i64::from(interval_days))),
    }
}

/// Record a failed recall: the streak is left untouched (mastery credit is
/// never taken away), but the interval resets and the color is due again
/// immediately.
pub fn apply_failure(record: &RecallRecord, now: DateTime<Utc>) -> RecallRecord {
    RecallRecord {
        correct_streak: record.correct_streak,
        last_reviewed_at: Some(now),
        interval_days: 0,
        next_due_at: Some(now),
    }
}
