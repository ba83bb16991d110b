//! # Flashdeck API
//!
//! JSON API over decks, cards, study sessions and AI generation.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Routes                                      │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  decks         │  │  cards         │  │  study                     ││
//! │  │                │  │                │  │                            ││
//! │  │ • list/create  │  │ • add/clear    │  │ • start                    ││
//! │  │ • view/update  │  │ • reorder      │  │ • view                     ││
//! │  │ • delete       │  │ • update/delete│  │ • actions / finish         ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  generate      │  │  health        │                                │
//! │  │ (entitlement)  │  │ (no auth)      │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      AppState                                     │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  Database    │  │  Generator   │  │  JwtVerifier             ││  │
//! │  │  │  (SQLite)    │  │  (dyn trait) │  │  StudySessions           ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables are listed on [`ApiConfig`].

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod study_sessions;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use flashdeck_ai::FlashcardGenerator;
use flashdeck_db::Database;

// Re-exports
pub use auth::{AuthUser, JwtVerifier};
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use study_sessions::StudySessions;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
    pub jwt: Arc<JwtVerifier>,
    pub generator: Arc<dyn FlashcardGenerator>,
    pub sessions: StudySessions,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig, generator: Arc<dyn FlashcardGenerator>) -> Self {
        AppState {
            db,
            jwt: Arc::new(JwtVerifier::new(&config.jwt_secret)),
            sessions: StudySessions::new(config.study_session_idle),
            config: Arc::new(config),
            generator,
        }
    }
}

/// Builds the full router with request tracing and CORS.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_allowed_origin.as_deref());

    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("CORS_ALLOWED_ORIGIN is not a valid header value, allowing any origin");
            base.allow_origin(Any)
        }
        None => base.allow_origin(Any),
    }
}
