//! Session Controller
//!
//! The turn-based state machine driving one learning session: teach or
//! prompt, listen, celebrate or correct, repeat until the time budget or
//! the curriculum runs out.
//!
//! All long-running work (speech playback, capture windows, pacing
//! delays, the surprise-retest timer) runs in spawned tasks that report
//! back through one event channel. Every event carries the turn id in
//! effect when its operation was issued; the handler discards any event
//! whose turn no longer matches. That fence is the only thing standing
//! between an abandoned capture window and a later turn's state, so
//! every new turn bumps the id and stops outstanding speech and capture
//! before issuing anything new.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::BuddyResult;
use crate::lexicon::{Lexicon, LexiconItem};
use crate::matcher;
use crate::profile::LearnerProfile;
use crate::recall::{self, MasteryLevel};
use crate::scheduler::{PickKind, Scheduler};
use crate::speech::SpeechEngine;
use crate::storage::ProfileStore;
use crate::ui::{SessionUi, SessionView};
use crate::voice::{ListenOutcome, VoiceEngine};

const PROMPT_PHRASE: &str = "What color is this?";
const PARROT_PRAISE: &str = "Great!";
const CLOSING_PHRASE: &str = "Great job today! See you next time!";

fn greeting_phrase(name: &str) -> String {
    format!("Hi {}! Let's learn colors!", name)
}

fn intro_phrase(color: &str) -> String {
    format!("Look! This is {}. {}.", color, color)
}

fn success_phrase(color: &str) -> String {
    format!("Yes! It's {}!", color)
}

fn correction_phrase(color: &str) -> String {
    format!("This color is {}. Can you say {}?", color, color)
}

/// Completion signals from spawned operations.
///
/// `RetestDue` and `ManualResolve` carry no turn id: the retest timer is
/// meant to outlive the turn that armed it, and the parent override is a
/// live out-of-band signal.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SpeechDone { turn: u64 },
    PacingDone { turn: u64 },
    Heard { turn: u64, outcome: ListenOutcome },
    RetestDue { name: String },
    ManualResolve { correct: bool },
}

impl SessionEvent {
    /// The turn this event is fenced to, if any
    fn turn(&self) -> Option<u64> {
        match self {
            SessionEvent::SpeechDone { turn }
            | SessionEvent::PacingDone { turn }
            | SessionEvent::Heard { turn, .. } => Some(*turn),
            SessionEvent::RetestDue { .. } | SessionEvent::ManualResolve { .. } => None,
        }
    }
}

/// Feedback sub-states after a listening window resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feedback {
    /// Confirmation is playing, pacing follows
    Success,
    /// The correction is playing, a parroting window follows
    Correction,
    /// The parroting window resolved, praise or pacing is playing
    Parroted,
}

/// Where the session currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Greeting,
    Onboarding { index: usize },
    Teaching,
    Prompting,
    Listening { parroting: bool },
    Feedback(Feedback),
    Closing,
}

/// The color a turn is about
#[derive(Debug, Clone)]
struct ActiveItem {
    item: LexiconItem,
    /// True when the turn started by teaching the color, so a miss in the
    /// immediate recall attempt carries no penalty
    first_exposure: bool,
}

/// What a finished session looked like
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns: u32,
    pub streak_days: u32,
    pub known: usize,
    pub mastered: usize,
    pub sessions_completed: u32,
}

/// Out-of-band control for a running session. A parent can resolve the
/// current listening window by hand when the recognizer is being unfair.
#[derive(Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub fn resolve_manually(&self, correct: bool) {
        let _ = self.tx.send(SessionEvent::ManualResolve { correct });
    }
}

pub struct SessionController {
    config: Arc<Config>,
    lexicon: Arc<Lexicon>,
    scheduler: Scheduler,
    store: Arc<dyn ProfileStore>,
    speech: Arc<dyn SpeechEngine>,
    voice: Arc<dyn VoiceEngine>,
    ui: Arc<dyn SessionUi>,
    profile: LearnerProfile,
    rng: StdRng,

    turn_id: u64,
    phase: Phase,
    current: Option<ActiveItem>,
    retest_queue: VecDeque<String>,
    started_at: Instant,
    turns_taken: u32,
    finished: bool,

    tx: UnboundedSender<SessionEvent>,
    rx: UnboundedReceiver<SessionEvent>,
}

impl SessionController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profile: LearnerProfile,
        lexicon: Arc<Lexicon>,
        config: Arc<Config>,
        store: Arc<dyn ProfileStore>,
        speech: Arc<dyn SpeechEngine>,
        voice: Arc<dyn VoiceEngine>,
        ui: Arc<dyn SessionUi>,
    ) -> Self {
        Self::with_rng(
            profile,
            lexicon,
            config,
            store,
            speech,
            voice,
            ui,
            StdRng::from_entropy(),
        )
    }

    /// Like `new` but with an explicit rng, so interleaved-review picks
    /// are reproducible
    #[allow(clippy::too_many_arguments)]
    pub fn with_rng(
        profile: LearnerProfile,
        lexicon: Arc<Lexicon>,
        config: Arc<Config>,
        store: Arc<dyn ProfileStore>,
        speech: Arc<dyn SpeechEngine>,
        voice: Arc<dyn VoiceEngine>,
        ui: Arc<dyn SessionUi>,
        rng: StdRng,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(lexicon.clone(), config.clone());
        Self {
            config,
            lexicon,
            scheduler,
            store,
            speech,
            voice,
            ui,
            profile,
            rng,
            turn_id: 0,
            phase: Phase::Greeting,
            current: None,
            retest_queue: VecDeque::new(),
            started_at: Instant::now(),
            turns_taken: 0,
            finished: false,
            tx,
            rx,
        }
    }

    /// Out-of-band control handle for this session
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            tx: self.tx.clone(),
        }
    }

    /// The profile as it stands (final state once `run` has returned)
    pub fn profile(&self) -> &LearnerProfile {
        &self.profile
    }

    /// Run the session to completion
    pub async fn run(&mut self) -> BuddyResult<SessionSummary> {
        self.started_at = Instant::now();
        self.profile.register_play(Utc::now());
        self.persist();
        info!(
            "▶️ Session started for {} (day streak {})",
            self.profile.name, self.profile.streak_days
        );

        self.ui.show(&SessionView::Greeting {
            name: self.profile.name.clone(),
        });
        self.phase = Phase::Greeting;
        self.say(&greeting_phrase(&self.profile.name));

        while !self.finished {
            let event = match self.rx.recv().await {
                Some(event) => event,
                None => break,
            };
            self.handle_event(event);
        }

        Ok(self.summary())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            turns: self.turns_taken,
            streak_days: self.profile.streak_days,
            known: self.profile.known_items(&self.lexicon).len(),
            mastered: self.profile.mastered_count(&self.lexicon, &self.config),
            sessions_completed: self.profile.sessions_completed,
        }
    }

    // ---- event handling ----

    fn handle_event(&mut self, event: SessionEvent) {
        if let Some(turn) = event.turn() {
            if turn != self.turn_id {
                debug!(
                    "🚫 Stale event from turn {} discarded (now on turn {})",
                    turn, self.turn_id
                );
                return;
            }
        }

        match event {
            SessionEvent::SpeechDone { .. } => self.on_speech_done(),
            SessionEvent::PacingDone { .. } => self.on_pacing_done(),
            SessionEvent::Heard { outcome, .. } => self.on_heard(outcome),
            SessionEvent::RetestDue { name } => self.on_retest_due(name),
            SessionEvent::ManualResolve { correct } => self.on_manual_resolve(correct),
        }
    }

    fn on_speech_done(&mut self) {
        match self.phase {
            Phase::Greeting => {
                if self.profile.is_onboarded {
                    self.next_turn();
                } else {
                    info!("🧸 First session: teaching the primary colors");
                    self.teach_onboarding(0);
                }
            }
            Phase::Onboarding { .. } => self.pacing(self.config.pacing_delay()),
            Phase::Teaching | Phase::Prompting => self.open_listening(false),
            Phase::Feedback(Feedback::Success) => self.pacing(self.config.success_delay()),
            Phase::Feedback(Feedback::Correction) => self.open_listening(true),
            Phase::Feedback(Feedback::Parroted) => self.next_turn(),
            Phase::Closing => self.pacing(self.config.end_screen_delay()),
            Phase::Listening { .. } => {
                debug!("Speech completion while listening ignored")
            }
        }
    }

    fn on_pacing_done(&mut self) {
        match self.phase {
            Phase::Onboarding { index } => self.teach_onboarding(index + 1),
            Phase::Feedback(Feedback::Success) | Phase::Feedback(Feedback::Parroted) => {
                self.next_turn()
            }
            Phase::Closing => self.finished = true,
            other => debug!("Pacing tick in {:?} ignored", other),
        }
    }

    fn on_heard(&mut self, outcome: ListenOutcome) {
        let parroting = match self.phase {
            Phase::Listening { parroting } => parroting,
            _ => {
                debug!("Listen result outside a listening window ignored");
                return;
            }
        };
        let active = match self.current.clone() {
            Some(active) => active,
            None => {
                warn!("Listening phase without an active color");
                return;
            }
        };

        let correct = match outcome {
            ListenOutcome::Heard(text) => {
                let ok = matcher::matches(&text, &active.item);
                if ok {
                    info!("✅ Heard \"{}\" for {}", text, active.item.name);
                } else if let Some((variant, score)) =
                    matcher::closest_variant(&text, &active.item)
                {
                    // Near misses are worth a look when curating variants
                    info!(
                        "❌ Heard \"{}\" for {} (closest variant \"{}\", {:.2})",
                        text, active.item.name, variant, score
                    );
                }
                ok
            }
            ListenOutcome::Silence => {
                debug!("🤫 Window elapsed with nothing recognized");
                false
            }
            ListenOutcome::Failed(e) => {
                // Device trouble reads as a miss; the learner gets the
                // normal correction turn instead of an error
                warn!("⚠️ Voice capture failed, treating as a miss: {}", e);
                false
            }
        };

        self.resolve_listen(active, parroting, correct);
    }

    fn on_manual_resolve(&mut self, correct: bool) {
        let parroting = match self.phase {
            Phase::Listening { parroting } => parroting,
            _ => {
                debug!("Manual resolve outside a listening window ignored");
                return;
            }
        };
        let active = match self.current.clone() {
            Some(active) => active,
            None => return,
        };

        info!(
            "🙋 Manual override: {}",
            if correct { "correct" } else { "incorrect" }
        );
        self.voice.stop();
        self.resolve_listen(active, parroting, correct);
    }

    fn on_retest_due(&mut self, name: String) {
        // Session-scoped on purpose: the retest delay is meant to span
        // turns, so only session end invalidates it.
        if self.finished || self.phase == Phase::Closing {
            debug!("Retest for {} arrived after session end, discarded", name);
            return;
        }
        debug!("🔁 {} queued for a surprise retest", name);
        self.retest_queue.push_back(name);
    }

    // ---- transitions ----

    fn resolve_listen(&mut self, active: ActiveItem, parroting: bool, correct: bool) {
        if parroting {
            // Parroting practice never feeds the recall model
            self.phase = Phase::Feedback(Feedback::Parroted);
            if correct {
                self.say(PARROT_PRAISE);
            } else {
                self.pacing(self.config.pacing_delay());
            }
            return;
        }

        if correct {
            self.succeed(active);
        } else {
            self.fail(active);
        }
    }

    fn succeed(&mut self, active: ActiveItem) {
        let updated = recall::apply_success(
            &self.profile.record(&active.item.name),
            Utc::now(),
            &self.config,
        );
        self.profile.set_record(&active.item.name, updated);
        self.persist();

        self.ui.show(&SessionView::Success {
            item: active.item.clone(),
        });
        self.phase = Phase::Feedback(Feedback::Success);
        self.say(&success_phrase(&active.item.name));
    }

    fn fail(&mut self, active: ActiveItem) {
        if !active.first_exposure {
            let updated =
                recall::apply_failure(&self.profile.record(&active.item.name), Utc::now());
            self.profile.set_record(&active.item.name, updated);
            self.persist();
        }

        self.schedule_retest(&active.item.name);

        self.ui.show(&SessionView::Correction {
            item: active.item.clone(),
        });
        self.phase = Phase::Feedback(Feedback::Correction);
        self.say(&correction_phrase(&active.item.name));
    }

    fn next_turn(&mut self) {
        // New turn: everything still in flight is now stale
        self.turn_id += 1;
        self.speech.cancel();
        self.voice.stop();
        self.current = None;

        if self.started_at.elapsed() >= self.config.session_duration() {
            info!("⏰ Session time budget spent");
            self.end_session();
            return;
        }

        if let Some(name) = self.retest_queue.pop_front() {
            if let Some(item) = self.lexicon.find(&name).cloned() {
                info!("🔁 Surprise retest: {}", item.name);
                self.begin_prompt(item);
                return;
            }
        }

        let pick = self
            .scheduler
            .next_item(&self.profile, Utc::now(), &mut self.rng)
            .map(|pick| (pick.item.clone(), pick.kind));
        match pick {
            Some((item, PickKind::New)) => self.begin_teach(item),
            Some((item, PickKind::Review)) => self.begin_prompt(item),
            None => {
                info!("📭 Nothing left to teach or review");
                self.end_session();
            }
        }
    }

    fn begin_teach(&mut self, item: LexiconItem) {
        self.turns_taken += 1;
        self.current = Some(ActiveItem {
            item: item.clone(),
            first_exposure: true,
        });
        self.phase = Phase::Teaching;
        self.ui.show(&SessionView::Teach { item: item.clone() });
        self.say(&intro_phrase(&item.name));
    }

    fn begin_prompt(&mut self, item: LexiconItem) {
        self.turns_taken += 1;
        self.current = Some(ActiveItem {
            item: item.clone(),
            first_exposure: false,
        });
        self.phase = Phase::Prompting;
        self.ui.show(&SessionView::Test { item });
        self.say(PROMPT_PHRASE);
    }

    fn teach_onboarding(&mut self, index: usize) {
        let item = self
            .lexicon
            .items_by_phase(1)
            .get(index)
            .map(|item| (*item).clone());
        match item {
            Some(item) => {
                self.phase = Phase::Onboarding { index };
                self.current = Some(ActiveItem {
                    item: item.clone(),
                    first_exposure: true,
                });
                self.ui.show(&SessionView::Teach { item: item.clone() });
                self.say(&intro_phrase(&item.name));
            }
            None => {
                self.profile.is_onboarded = true;
                self.persist();
                self.end_session();
            }
        }
    }

    fn open_listening(&mut self, parroting: bool) {
        let active = match self.current.clone() {
            Some(active) => active,
            None => {
                warn!("No active color to listen for");
                return;
            }
        };

        // A freshly taught color and parroting practice both get the
        // longest window; tested colors get less time as mastery grows
        let window = if parroting || active.first_exposure {
            self.config.listening_window_ms.for_level(MasteryLevel::New)
        } else {
            let level = recall::level_of(&self.profile.record(&active.item.name), &self.config);
            self.config.listening_window_ms.for_level(level)
        };

        self.phase = Phase::Listening { parroting };
        self.ui.show(&SessionView::Listening {
            item: active.item.clone(),
            window,
        });

        let voice = self.voice.clone();
        let tx = self.tx.clone();
        let turn = self.turn_id;
        let hint = active.item.name.clone();
        tokio::spawn(async move {
            let outcome = voice.capture(&hint, window).await;
            let _ = tx.send(SessionEvent::Heard { turn, outcome });
        });
    }

    fn end_session(&mut self) {
        self.profile.sessions_completed += 1;
        self.persist();

        let summary = self.summary();
        info!(
            "🏁 Session complete: {} turns, {} known, {} mastered",
            summary.turns, summary.known, summary.mastered
        );
        self.ui.show(&SessionView::End { summary });
        self.current = None;
        self.phase = Phase::Closing;
        self.say(CLOSING_PHRASE);
    }

    // ---- spawned operations ----

    fn say(&self, text: &str) {
        let speech = self.speech.clone();
        let tx = self.tx.clone();
        let turn = self.turn_id;
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = speech.speak(&text).await {
                // Cancelled or broken either way the completion is fenced
                // by the turn id, so report and move on
                debug!("Speech did not complete: {}", e);
            }
            let _ = tx.send(SessionEvent::SpeechDone { turn });
        });
    }

    fn pacing(&self, delay: Duration) {
        let tx = self.tx.clone();
        let turn = self.turn_id;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionEvent::PacingDone { turn });
        });
    }

    fn schedule_retest(&self, name: &str) {
        let tx = self.tx.clone();
        let name = name.to_string();
        let delay = self.config.retest_delay();
        debug!("⏲️ Retest for {} armed in {:?}", name, delay);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionEvent::RetestDue { name });
        });
    }

    fn persist(&self) {
        if let Err(e) = self.store.put(&self.profile) {
            warn!("⚠️ Could not persist profile {}: {}", self.profile.id, e);
        }
    }
}
