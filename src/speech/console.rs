//! Console speech engine
//!
//! Prints utterances instead of playing audio, pacing itself roughly like
//! a real voice so the session rhythm survives in a terminal.

use super::SpeechEngine;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

/// Fixed cost per utterance plus per-character speaking time
const BASE_MS: u64 = 250;
const PER_CHAR_MS: u64 = 35;

#[derive(Debug)]
pub struct ConsoleSpeech {
    trailing_silence: Duration,
    /// Bumped by `cancel`; an in-flight `speak` compares against the value
    /// it captured at start and bails out on mismatch.
    cancel_generation: AtomicU64,
}

impl ConsoleSpeech {
    pub fn new(trailing_silence: Duration) -> Self {
        Self {
            trailing_silence,
            cancel_generation: AtomicU64::new(0),
        }
    }

    fn speaking_time(text: &str) -> Duration {
        Duration::from_millis(BASE_MS + PER_CHAR_MS * text.chars().count() as u64)
    }
}

#[async_trait]
impl SpeechEngine for ConsoleSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        let generation = self.cancel_generation.load(Ordering::SeqCst);
        info!("🔊 \"{}\"", text);

        tokio::time::sleep(Self::speaking_time(text)).await;
        if self.cancel_generation.load(Ordering::SeqCst) != generation {
            return Err(anyhow::anyhow!("utterance cancelled"));
        }

        // Let the room go quiet before anyone opens a microphone
        tokio::time::sleep(self.trailing_silence).await;
        if self.cancel_generation.load(Ordering::SeqCst) != generation {
            return Err(anyhow::anyhow!("utterance cancelled"));
        }
        Ok(())
    }

    fn cancel(&self) {
        self.cancel_generation.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "console"
    }
}
