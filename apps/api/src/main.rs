//! # Flashdeck API Server
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  env ──► ApiConfig ──► Database (migrations) ──► Generator             │
//! │                                   │                  │                  │
//! │                                   ▼                  ▼                  │
//! │                               AppState ──► Router ──► axum::serve      │
//! │                                   │                                     │
//! │                                   └──► study session sweep (interval)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flashdeck_ai::{ChatCompletionsGenerator, FlashcardGenerator};
use flashdeck_api::{build_router, ApiConfig, AppState, StudySessions};
use flashdeck_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Flashdeck API server...");

    let config = ApiConfig::load().context("Failed to load configuration")?;
    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET is not set, using the development secret");
    }
    info!(
        addr = %config.socket_addr(),
        database = %config.database_path.display(),
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    let ai_config = config.ai_config();
    if !ai_config.is_configured() {
        tracing::warn!("AI_API_KEY is not set, card generation is disabled");
    }
    let generator: Arc<dyn FlashcardGenerator> = Arc::new(
        ChatCompletionsGenerator::new(ai_config).context("Failed to build AI client")?,
    );

    let addr = config.socket_addr();
    let state = AppState::new(db.clone(), config, generator);
    spawn_session_sweep(state.sessions.clone());

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,flashdeck=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Drops idle study sessions in the background.
fn spawn_session_sweep(sessions: StudySessions) {
    let period = (sessions.idle_timeout() / 4).clamp(Duration::from_secs(1), Duration::from_secs(300));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "Expired study sessions removed");
            }
        }
    });
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
