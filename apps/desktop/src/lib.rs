pub mod commands;
pub mod config;
pub mod db;
pub mod speech;
pub mod state;

use config::AppConfig;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Load configuration and build the application state.
pub fn run() -> anyhow::Result<AppState> {
    init_tracing();

    let config = AppConfig::from_env()?;
    AppState::bootstrap(config)
}
