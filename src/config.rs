use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::recall::MasteryLevel;

/// Listening-window durations keyed by mastery level.
///
/// Less-mastered colors get more time to answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListeningWindows {
    pub new_ms: u64,
    pub learning_ms: u64,
    pub mastered_ms: u64,
}

impl ListeningWindows {
    pub fn for_level(&self, level: MasteryLevel) -> Duration {
        let ms = match level {
            MasteryLevel::New => self.new_ms,
            MasteryLevel::Learning => self.learning_ms,
            MasteryLevel::Mastered => self.mastered_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Session pacing
    pub session_duration_ms: u64,
    pub listening_window_ms: ListeningWindows,
    pub pacing_delay_ms: u64,
    pub success_delay_ms: u64,
    pub end_screen_delay_ms: u64,
    pub retest_delay_ms: u64,

    // Spaced repetition
    pub learning_threshold: u32,
    pub mastery_threshold: u32,
    pub srs_intervals: Vec<u32>,
    pub max_phase: u32,

    // Engines
    pub speech_engine: String,
    pub voice_engine: String,
    pub trailing_silence_ms: u64,

    // Profiles
    pub max_profiles: usize,
    pub db_path: String,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_duration_ms: 5 * 60 * 1000,
            listening_window_ms: ListeningWindows {
                new_ms: 8000,
                learning_ms: 6000,
                mastered_ms: 4000,
            },
            pacing_delay_ms: 1000,
            success_delay_ms: 1500,
            end_screen_delay_ms: 5000,
            retest_delay_ms: 30_000,
            learning_threshold: 2,
            mastery_threshold: 3,
            srs_intervals: vec![0, 1, 3, 7, 14, 30],
            max_phase: 7,
            speech_engine: "console".to_string(),
            voice_engine: "console".to_string(),
            trailing_silence_ms: 500,
            max_profiles: 4,
            db_path: dirs::data_dir()
                .unwrap_or_default()
                .join("colorbuddy/profiles.db")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from file or create default
    pub fn load() -> Result<Self> {
        let config_path = config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            match serde_json::from_str(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    // Graceful degradation: log warning and use defaults
                    tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    // Backup corrupt file for debugging
                    let backup_path = config_path.with_extension("json.corrupt");
                    let _ = std::fs::rename(&config_path, &backup_path);
                    Ok(Self::default())
                }
            }
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn session_duration(&self) -> Duration {
        Duration::from_millis(self.session_duration_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }

    pub fn end_screen_delay(&self) -> Duration {
        Duration::from_millis(self.end_screen_delay_ms)
    }

    pub fn retest_delay(&self) -> Duration {
        Duration::from_millis(self.retest_delay_ms)
    }

    pub fn trailing_silence(&self) -> Duration {
        Duration::from_millis(self.trailing_silence_ms)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("colorbuddy")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session_duration_ms, 300_000);
        assert_eq!(config.listening_window_ms.new_ms, 8000);
        assert_eq!(config.mastery_threshold, 3);
        assert_eq!(config.learning_threshold, 2);
        assert_eq!(config.srs_intervals, vec![0, 1, 3, 7, 14, 30]);
        assert_eq!(config.max_profiles, 4);
    }

    #[test]
    fn test_window_ordering() {
        // New colors must get the most time, mastered the least
        let config = Config::default();
        let w = &config.listening_window_ms;
        assert!(w.new_ms >= w.learning_ms);
        assert!(w.learning_ms >= w.mastered_ms);
        assert_eq!(w.for_level(MasteryLevel::New), Duration::from_millis(8000));
        assert_eq!(
            w.for_level(MasteryLevel::Mastered),
            Duration::from_millis(4000)
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let restored: Config = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config.retest_delay_ms, restored.retest_delay_ms);
        assert_eq!(config.srs_intervals, restored.srs_intervals);
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        // Missing fields fall back to defaults rather than failing
        let partial = r#"{ "mastery_threshold": 5 }"#;
        let config: Config = serde_json::from_str(partial).expect("partial config should parse");
        assert_eq!(config.mastery_threshold, 5);
        assert_eq!(config.learning_threshold, 2);
    }

    #[test]
    fn test_config_corrupt_json_handling() {
        let corrupt_json = "{ not valid json";
        let result: Result<Config, _> = serde_json::from_str(corrupt_json);
        assert!(result.is_err());
    }
}
