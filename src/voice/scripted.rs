//! Scripted voice engine
//!
//! Plays back a fixed sequence of listen outcomes, one per capture window.
//! Used by tests and demo runs where real audio is unavailable.

use super::{ListenOutcome, VoiceEngine};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted utterance: the outcome plus how long the "speaker" waits
/// before producing it.
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    pub delay: Duration,
    pub outcome: ListenOutcome,
}

impl ScriptedReply {
    pub fn immediate(outcome: ListenOutcome) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome,
        }
    }

    pub fn heard(text: &str) -> Self {
        Self::immediate(ListenOutcome::Heard(text.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct ScriptedVoice {
    script: Mutex<VecDeque<ScriptedReply>>,
    stops: AtomicU64,
}

impl ScriptedVoice {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            stops: AtomicU64::new(0),
        }
    }

    /// A script of utterances heard immediately, in order
    pub fn saying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| ScriptedReply::heard(t)))
    }

    pub fn push(&self, reply: ScriptedReply) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply);
        }
    }

    /// How many times `stop` has been called
    pub fn stop_count(&self) -> u64 {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoiceEngine for ScriptedVoice {
    async fn capture(&self, _target_hint: &str, window: Duration) -> ListenOutcome {
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());

        match next {
            Some(reply) if reply.delay <= window => {
                tokio::time::sleep(reply.delay).await;
                reply.outcome
            }
            // The scripted speaker missed the window (or stayed quiet)
            Some(_late) => {
                tokio::time::sleep(window).await;
                ListenOutcome::Silence
            }
            None => {
                tokio::time::sleep(window).await;
                ListenOutcome::Silence
            }
        }
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
