//! Console voice engine
//!
//! Reads a typed line from stdin in place of a microphone. One line is
//! one utterance; an empty line or an expired window counts as silence.

use super::{ListenOutcome, VoiceEngine};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct ConsoleVoice {
    stopped: Notify,
}

impl ConsoleVoice {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoiceEngine for ConsoleVoice {
    async fn capture(&self, target_hint: &str, window: Duration) -> ListenOutcome {
        info!(
            "🎙️ Listening for {:.1}s (type your answer)",
            window.as_secs_f32()
        );
        debug!("Expecting something like '{}'", target_hint);

        let deadline = Instant::now() + window;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        // Blank lines are "no speech yet", not an answer; keep the window
        // open until the deadline
        loop {
            tokio::select! {
                _ = self.stopped.notified() => {
                    debug!("Capture stopped");
                    return ListenOutcome::Silence;
                }
                line = tokio::time::timeout_at(deadline, lines.next_line()) => match line {
                    Ok(Ok(Some(text))) if !text.trim().is_empty() => {
                        return ListenOutcome::Heard(text.trim().to_string());
                    }
                    Ok(Ok(Some(_))) => continue,
                    // Closed stdin: nothing more is coming, wait out the window
                    Ok(Ok(None)) => {
                        tokio::time::sleep_until(deadline).await;
                        return ListenOutcome::Silence;
                    }
                    Ok(Err(e)) => return ListenOutcome::Failed(e.to_string()),
                    Err(_) => {
                        debug!("Listening window elapsed");
                        return ListenOutcome::Silence;
                    }
                },
            }
        }
    }

    fn stop(&self) {
        self.stopped.notify_waiters();
    }

    fn name(&self) -> &str {
        "console"
    }
}
