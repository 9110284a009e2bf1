//! Session UI
//!
//! Render-only notifications from the session controller. Implementations
//! draw whatever they like; none of them can touch the data model.

use std::time::Duration;

use crate::lexicon::LexiconItem;
use crate::session::SessionSummary;

/// What the session wants on screen right now
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    Greeting { name: String },
    Teach { item: LexiconItem },
    Test { item: LexiconItem },
    Listening { item: LexiconItem, window: Duration },
    Success { item: LexiconItem },
    Correction { item: LexiconItem },
    End { summary: SessionSummary },
}

pub trait SessionUi: Send + Sync {
    fn show(&self, view: &SessionView);
}

/// Terminal renderer
#[derive(Debug, Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }
}

impl SessionUi for ConsoleUi {
    fn show(&self, view: &SessionView) {
        match view {
            SessionView::Greeting { name } => {
                println!("👋 Welcome back, {}!", name);
            }
            SessionView::Teach { item } => {
                println!("🎨 {} {}  ({})", swatch(&item.hex), item.name, item.hex);
            }
            SessionView::Test { item } => {
                println!("❓ {} What color is this?", swatch(&item.hex));
            }
            SessionView::Listening { window, .. } => {
                println!("🎙️ ({}s)", window.as_secs());
            }
            SessionView::Success { item } => {
                println!("🎉 {}!", item.name);
            }
            SessionView::Correction { item } => {
                println!("💡 {} It's {}.", swatch(&item.hex), item.name);
            }
            SessionView::End { summary } => {
                println!(
                    "🏁 Session over: {} turns, {} colors known, {} mastered, {} day streak",
                    summary.turns, summary.known, summary.mastered, summary.streak_days
                );
            }
        }
    }
}

/// A colored block via 24-bit ANSI, falling back to plain text if the hex
/// value is unparsable.
fn swatch(hex: &str) -> String {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 && hex.is_ascii() {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return format!("\x1b[48;2;{};{};{}m   \x1b[0m", r, g, b);
        }
    }
    "[ ]".to_string()
}

/// Discards everything; used where no rendering is wanted
#[derive(Debug, Default)]
pub struct NullUi;

impl NullUi {
    pub fn new() -> Self {
        Self
    }
}

impl SessionUi for NullUi {
    fn show(&self, _view: &SessionView) {}
}
