//! System speech engine
//!
//! Drives a system TTS command (spd-say or espeak-ng) and waits for it to
//! finish speaking before resolving.

use super::SpeechEngine;
use anyhow::Result;
use async_trait::async_trait;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
pub struct SystemSpeech {
    trailing_silence: Duration,
    cancel_generation: Arc<AtomicU64>,
    active: Arc<Mutex<Option<Child>>>,
}

impl SystemSpeech {
    pub fn new(trailing_silence: Duration) -> Self {
        Self {
            trailing_silence,
            cancel_generation: Arc::new(AtomicU64::new(0)),
            active: Arc::new(Mutex::new(None)),
        }
    }

    fn spawn_tts(text: &str) -> Result<Child> {
        // spd-say needs -w to block until playback finishes; espeak-ng
        // blocks by default.
        if let Ok(child) = Command::new("spd-say").arg("-w").arg(text).spawn() {
            return Ok(child);
        }
        if let Ok(child) = Command::new("espeak-ng").arg(text).spawn() {
            return Ok(child);
        }
        Err(anyhow::anyhow!(
            "No system TTS command found (tried spd-say, espeak-ng)"
        ))
    }
}

#[async_trait]
impl SpeechEngine for SystemSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        let generation = self.cancel_generation.load(Ordering::SeqCst);
        debug!("System speaking: {}", text);

        let text_owned = text.to_string();
        let active = self.active.clone();

        // Blocking subprocess wait happens off the async threads
        let status = tokio::task::spawn_blocking(move || -> Result<std::process::ExitStatus> {
            let child = Self::spawn_tts(&text_owned)?;
            *active.lock().map_err(|e| anyhow::anyhow!("lock poisoned: {}", e))? = Some(child);

            // Take the handle back to wait on it; cancel() may already
            // have killed and cleared it.
            let taken = active
                .lock()
                .map_err(|e| anyhow::anyhow!("lock poisoned: {}", e))?
                .take();
            match taken {
                Some(mut child) => Ok(child.wait()?),
                None => Err(anyhow::anyhow!("utterance cancelled")),
            }
        })
        .await
        .map_err(|e| anyhow::anyhow!("Task join error: {}", e))??;

        if !status.success() {
            return Err(anyhow::anyhow!("TTS command failed with status {}", status));
        }
        if self.cancel_generation.load(Ordering::SeqCst) != generation {
            return Err(anyhow::anyhow!("utterance cancelled"));
        }

        tokio::time::sleep(self.trailing_silence).await;
        if self.cancel_generation.load(Ordering::SeqCst) != generation {
            return Err(anyhow::anyhow!("utterance cancelled"));
        }
        Ok(())
    }

    fn cancel(&self) {
        self.cancel_generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.active.lock() {
            if let Some(mut child) = slot.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }

    fn name(&self) -> &str {
        "system"
    }
}
