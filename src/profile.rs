//! Learner Profiles
//!
//! A profile owns the per-color recall records plus the play streak and
//! session counters. During a session the controller holds the profile
//! exclusively; everything here is plain data and pure helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::Config;
use crate::lexicon::{Lexicon, LexiconItem};
use crate::recall::{self, MasteryLevel, RecallRecord};

/// Avatar choices offered at profile creation
#[derive(Debug, Clone, Copy)]
pub struct Avatar {
    pub emoji: &'static str,
    pub color: &'static str,
}

pub const AVATARS: [Avatar; 4] = [
    Avatar { emoji: "🦊", color: "#ff6b6b" },
    Avatar { emoji: "🐸", color: "#4ecdc4" },
    Avatar { emoji: "🐥", color: "#ffe66d" },
    Avatar { emoji: "🦄", color: "#a855f7" },
];

/// A learner and their recall history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_played_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub sessions_completed: u32,
    #[serde(default)]
    pub is_onboarded: bool,
    #[serde(default)]
    pub records: HashMap<String, RecallRecord>,
}

impl LearnerProfile {
    /// Create a fresh profile with one of the built-in avatars
    pub fn new(name: &str, avatar_index: usize) -> Self {
        let avatar = AVATARS[avatar_index % AVATARS.len()];
        let now = Utc::now();
        Self {
            id: format!("{}", now.timestamp_millis()),
            name: if name.trim().is_empty() {
                "Player".to_string()
            } else {
                name.trim().to_string()
            },
            avatar: avatar.emoji.to_string(),
            color: avatar.color.to_string(),
            created_at: now,
            last_played_at: None,
            streak_days: 0,
            sessions_completed: 0,
            is_onboarded: false,
            records: HashMap::new(),
        }
    }

    /// Recall record for a color, default zero-values if never seen
    pub fn record(&self, name: &str) -> RecallRecord {
        self.records.get(name).cloned().unwrap_or_default()
    }

    /// Store an updated recall record
    pub fn set_record(&mut self, name: &str, record: RecallRecord) {
        self.records.insert(name.to_string(), record);
    }

    /// Update the consecutive-day play streak.
    ///
    /// Exactly one calendar day since the last play extends the streak, a
    /// longer gap resets it to 1, playing again on the same day leaves it
    /// alone, and a first-ever play starts it at 1.
    pub fn register_play(&mut self, now: DateTime<Utc>) {
        match self.last_played_at {
            Some(last) => {
                let gap = (now.date_naive() - last.date_naive()).num_days();
                if gap == 1 {
                    self.streak_days += 1;
                } else if gap > 1 {
                    self.streak_days = 1;
                }
            }
            None => self.streak_days = 1,
        }
        self.last_played_at = Some(now);
    }

    /// Colors with at least one successful recall, in catalog order
    pub fn known_items<'a>(&self, lexicon: &'a Lexicon) -> Vec<&'a LexiconItem> {
        lexicon
            .items()
            .iter()
            .filter(|item| self.record(&item.name).correct_streak > 0)
            .collect()
    }

    /// Number of mastered colors
    pub fn mastered_count(&self, lexicon: &Lexicon, config: &Config) -> usize {
        lexicon
            .items()
            .iter()
            .filter(|item| {
                recall::level_of(&self.record(&item.name), config) == MasteryLevel::Mastered
            })
            .count()
    }
}
