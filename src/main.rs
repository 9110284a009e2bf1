//! ColorBuddy - Voice Color Tutor
//!
//! Teaches colors through spoken prompts and voice answers, spacing
//! repetition by how well each color is remembered.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use colorbuddy::config::Config;
use colorbuddy::lexicon::Lexicon;
use colorbuddy::profile::LearnerProfile;
use colorbuddy::session::SessionController;
use colorbuddy::storage::{MemoryStore, ProfileStore, SqliteStore};
use colorbuddy::ui::ConsoleUi;
use colorbuddy::{speech, voice};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Learner profile name (created on first use)
    #[arg(short, long)]
    profile: Option<String>,

    /// List existing profiles and exit
    #[arg(long)]
    list_profiles: bool,

    /// Show learning stats for the selected profile and exit
    #[arg(long)]
    stats: bool,

    /// Speech engine override (console, system)
    #[arg(long)]
    speech: Option<String>,

    /// Voice engine override (console)
    #[arg(long)]
    voice: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🎨 ColorBuddy v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load()?;
    if let Some(engine) = args.speech {
        config.speech_engine = engine;
    }
    if let Some(engine) = args.voice {
        config.voice_engine = engine;
    }

    // A broken database is never fatal: fall back to an in-memory store
    // and play a one-off session
    let store: Arc<dyn ProfileStore> = match SqliteStore::open(Path::new(&config.db_path)) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("⚠️ Could not open profile store ({}), progress will not be saved", e);
            Arc::new(MemoryStore::new())
        }
    };

    let lexicon = Arc::new(Lexicon::builtin());
    let config = Arc::new(config);

    if args.list_profiles {
        let profiles = store.list_all().unwrap_or_default();
        if profiles.is_empty() {
            println!("No profiles yet. Start a session with --profile <name>.");
        }
        for profile in profiles {
            println!(
                "{} {}  (streak {}, {} sessions)",
                profile.avatar, profile.name, profile.streak_days, profile.sessions_completed
            );
        }
        return Ok(());
    }

    let profile = select_profile(store.as_ref(), &config, args.profile.as_deref())?;

    if args.stats {
        let known = profile.known_items(&lexicon);
        println!("{} {}", profile.avatar, profile.name);
        println!("  Colors learned: {}", known.len());
        println!("  Mastered:       {}", profile.mastered_count(&lexicon, &config));
        println!("  Day streak:     {}", profile.streak_days);
        println!("  Sessions:       {}", profile.sessions_completed);
        return Ok(());
    }

    let speech_engine = speech::create_engine(&config);
    let voice_engine = voice::create_engine(&config);

    let mut controller = SessionController::new(
        profile,
        lexicon,
        config,
        store,
        speech_engine,
        voice_engine,
        Arc::new(ConsoleUi::new()),
    );

    let summary = controller.run().await?;
    info!(
        "✅ Done: {} turns, {} colors known, {} mastered",
        summary.turns, summary.known, summary.mastered
    );

    Ok(())
}

/// Find the named profile, or create it if there is room
fn select_profile(
    store: &dyn ProfileStore,
    config: &Config,
    name: Option<&str>,
) -> Result<LearnerProfile> {
    let profiles = store.list_all().unwrap_or_else(|e| {
        warn!("⚠️ Could not read profiles ({}), starting fresh", e);
        Vec::new()
    });

    let name = match name {
        Some(name) => name.to_string(),
        None => match profiles.first() {
            Some(first) => first.name.clone(),
            None => "Player".to_string(),
        },
    };

    if let Some(existing) = profiles.iter().find(|p| p.name.eq_ignore_ascii_case(&name)) {
        return Ok(existing.clone());
    }

    if profiles.len() >= config.max_profiles {
        anyhow::bail!(
            "All {} profile slots are in use; pick an existing profile with --list-profiles",
            config.max_profiles
        );
    }

    // Rotate avatars so siblings get distinct buddies
    let profile = LearnerProfile::new(&name, profiles.len());
    store
        .put(&profile)
        .map_err(|e| anyhow::anyhow!("could not create profile: {}", e))?;
    info!("🆕 Created profile {} {}", profile.avatar, profile.name);
    Ok(profile)
}
