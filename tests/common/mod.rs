//! Shared fixtures for session integration tests.
//!
//! Sessions run against an in-memory store, a scripted voice engine, a
//! recording speech engine, and a view-collecting UI, with all pacing
//! delays shrunk so a full session finishes in well under a second.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use colorbuddy::config::{Config, ListeningWindows};
use colorbuddy::lexicon::{Lexicon, LexiconItem};
use colorbuddy::profile::LearnerProfile;
use colorbuddy::session::SessionController;
use colorbuddy::speech::SpeechEngine;
use colorbuddy::storage::MemoryStore;
use colorbuddy::ui::{SessionUi, SessionView};
use colorbuddy::voice::scripted::ScriptedVoice;

/// Speech engine that resolves instantly and remembers what it said
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechEngine for RecordingSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn cancel(&self) {}

    fn name(&self) -> &str {
        "recording"
    }
}

/// UI that collects every view it is shown
#[derive(Default)]
pub struct CollectingUi {
    views: Mutex<Vec<SessionView>>,
}

impl CollectingUi {
    pub fn views(&self) -> Vec<SessionView> {
        self.views.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&SessionView) -> bool) -> usize {
        self.views().iter().filter(|v| predicate(v)).count()
    }
}

impl SessionUi for CollectingUi {
    fn show(&self, view: &SessionView) {
        self.views.lock().unwrap().push(view.clone());
    }
}

/// Configuration with all delays shrunk for fast tests
pub fn fast_config() -> Config {
    Config {
        session_duration_ms: 10_000,
        listening_window_ms: ListeningWindows {
            new_ms: 40,
            learning_ms: 30,
            mastered_ms: 20,
        },
        pacing_delay_ms: 2,
        success_delay_ms: 2,
        end_screen_delay_ms: 2,
        retest_delay_ms: 60,
        trailing_silence_ms: 0,
        ..Default::default()
    }
}

pub fn phase1_item(name: &str, hex: &str) -> LexiconItem {
    LexiconItem {
        name: name.to_string(),
        hex: hex.to_string(),
        phase: 1,
        variants: vec![name.to_lowercase()],
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub speech: Arc<RecordingSpeech>,
    pub ui: Arc<CollectingUi>,
    pub voice: Arc<ScriptedVoice>,
    pub lexicon: Arc<Lexicon>,
    pub config: Arc<Config>,
}

impl TestContext {
    pub fn new(lexicon: Lexicon, config: Config, voice: ScriptedVoice) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            speech: Arc::new(RecordingSpeech::default()),
            ui: Arc::new(CollectingUi::default()),
            voice: Arc::new(voice),
            lexicon: Arc::new(lexicon),
            config: Arc::new(config),
        }
    }

    pub fn controller(&self, profile: LearnerProfile) -> SessionController {
        SessionController::with_rng(
            profile,
            self.lexicon.clone(),
            self.config.clone(),
            self.store.clone(),
            self.speech.clone(),
            self.voice.clone(),
            self.ui.clone(),
            StdRng::seed_from_u64(7),
        )
    }
}
