//! Speech Output Module
//!
//! Provides a unified interface for spoken prompts.

use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub mod console;
pub mod system;

/// Trait for speech engines.
///
/// `speak` resolves only after the utterance has finished playing plus a
/// short trailing silence, so the microphone never opens on the tail of
/// our own voice. A cancelled utterance resolves with an error, never as
/// a normal completion.
#[async_trait]
pub trait SpeechEngine: Send + Sync + std::fmt::Debug {
    /// Speak the given text to completion
    async fn speak(&self, text: &str) -> Result<()>;

    /// Stop the current utterance immediately
    fn cancel(&self);

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Factory to create the configured speech engine
pub fn create_engine(config: &Config) -> Arc<dyn SpeechEngine> {
    info!("🛠️ Creating speech engine: {}", config.speech_engine);
    let engine: Arc<dyn SpeechEngine> = match config.speech_engine.as_str() {
        "system" => Arc::new(system::SystemSpeech::new(config.trailing_silence())),
        "console" => Arc::new(console::ConsoleSpeech::new(config.trailing_silence())),
        other => {
            warn!("  - Unknown engine '{}', falling back to console", other);
            Arc::new(console::ConsoleSpeech::new(config.trailing_silence()))
        }
    };
    info!("✅ Speech engine '{}' initialized", engine.name());
    engine
}
