//! voice-assistant: voice-driven command assistant
//!
//! Listens for a spoken command, normalizes it, asks a language backend what
//! to do, and either speaks an answer, types text, evaluates arithmetic, or
//! asks a follow-up question. Pending follow-up questions are persisted and
//! survive a restart.
//!
//! Speak "exit", "quit", "stop" or "goodbye" to end the session.

mod actions;
mod assistant;
mod backend;
mod calc;
mod config;
mod keyboard;
mod lifecycle;
mod location;
mod normalize;
mod session;
mod speech;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::actions::ActionDispatcher;
use crate::assistant::{Assistant, Timing};
use crate::backend::{GeminiBackend, LanguageBackend};
use crate::config::Config;
use crate::keyboard::SystemTypist;
use crate::lifecycle::ShutdownSignal;
use crate::location::IpInfoLocator;
use crate::session::SessionStore;
use crate::speech::{CommandListener, CommandSpeaker, Listener, StdinListener};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "voice-assistant starting"
    );

    // Load configuration; a missing credential aborts here
    let config = Config::load()?;
    config
        .ensure_dirs()
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
    info!(data_dir = ?config.data_dir, model = %config.model, "configuration loaded");

    let mut shutdown = ShutdownSignal::new().context("failed to register signal handlers")?;

    let backend: Arc<dyn LanguageBackend> = Arc::new(
        GeminiBackend::new(config.api_key.clone(), &config.model)
            .context("failed to create backend client")?,
    );
    let locator = IpInfoLocator::new().context("failed to create location client")?;

    let listener: Arc<dyn Listener> = match &config.stt {
        Some(stt) => Arc::new(CommandListener::new(&stt.program, stt.args.clone())),
        None => {
            info!("no speech capture command configured, reading commands from stdin");
            Arc::new(StdinListener::new())
        }
    };
    let speaker = Arc::new(CommandSpeaker::new(&config.tts.program, config.tts.args.clone()));
    let dispatcher = ActionDispatcher::new(speaker, Arc::new(SystemTypist::new()), config.typing_delay);

    let timing = Timing {
        listen_timeout: config.listen_timeout,
        max_phrase: config.max_phrase,
        turn_pause: config.turn_pause,
    };

    let mut assistant = Assistant::start(
        SessionStore::new(config.session_path()),
        &locator,
        backend,
        listener,
        dispatcher,
        timing,
    )
    .await
    .context("failed to restore session")?;

    tokio::select! {
        _ = assistant.run() => {
            info!("turn loop finished");
        }

        // Leaves any pending clarification in place for the next run
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    info!(state = %assistant.machine().state(), "voice-assistant stopped");

    Ok(())
}
