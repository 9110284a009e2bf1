//! Voice Input Module
//!
//! Bounded voice-capture windows. An engine resolves every `capture` call
//! exactly once: with a heard utterance, with silence when the window
//! elapses, or with a non-recoverable error. Recoverable conditions (no
//! speech yet, capture restarted) never end the window early; the deadline
//! governs.

use crate::config::Config;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub mod console;
pub mod scripted;

/// Result of one bounded listening window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    /// An utterance was recognized before the deadline
    Heard(String),
    /// The window elapsed with nothing recognized
    Silence,
    /// The capture device failed in a non-recoverable way
    Failed(String),
}

/// Trait for voice-capture engines
#[async_trait]
pub trait VoiceEngine: Send + Sync + std::fmt::Debug {
    /// Open a capture window of the given duration.
    ///
    /// `target_hint` is the word currently expected; engines may use it to
    /// bias recognition (a keyword grammar, a prompt) but scoring is the
    /// caller's job.
    async fn capture(&self, target_hint: &str, window: Duration) -> ListenOutcome;

    /// Abort an in-flight capture. Idempotent; a no-op when idle.
    fn stop(&self);

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Factory to create the configured voice engine
pub fn create_engine(config: &Config) -> Arc<dyn VoiceEngine> {
    info!("🛠️ Creating voice engine: {}", config.voice_engine);
    let engine: Arc<dyn VoiceEngine> = match config.voice_engine.as_str() {
        "console" => Arc::new(console::ConsoleVoice::new()),
        other => {
            warn!("  - Unknown engine '{}', falling back to console", other);
            Arc::new(console::ConsoleVoice::new())
        }
    };
    info!("✅ Voice engine '{}' initialized", engine.name());
    engine
}
