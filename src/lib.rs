pub mod config;
pub mod conversation; // Session lifecycle, turns, pacing
pub mod models;
pub mod pipeline; // Rule tables, classifier, symptoms, stage, emotion, pacing
pub mod services; // Reasoning, geolocation, report, transcript collaborators

pub use conversation::{AssistantError, ConversationOrchestrator, SendOutcome, TurnState};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set, otherwise `config::default_log_filter()` applies.
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} v{} tracing initialised", config::APP_NAME, config::APP_VERSION);
    }
}
