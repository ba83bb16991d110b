//! # HTTP Routes
//!
//! Every handler follows the same shape:
//!
//! ```text
//! AuthUser (401) ─► authorize ownership (404) ─► validate (422) ─► write ─► JSON
//! ```
//!
//! Ownership is never checked inline; handlers obtain an `OwnedDeck` or
//! `OwnedCard` from the repository and every write requires one.

pub mod cards;
pub mod decks;
pub mod generate;
pub mod health;
pub mod study;

use axum::routing::{get, post, put};
use axum::Router;

use crate::AppState;

/// All routes, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/decks", get(decks::list_decks).post(decks::create_deck))
        .route(
            "/decks/{deck_id}",
            get(decks::get_deck)
                .put(decks::update_deck)
                .delete(decks::delete_deck),
        )
        .route(
            "/decks/{deck_id}/cards",
            post(cards::create_card).delete(cards::delete_all_cards),
        )
        .route("/decks/{deck_id}/cards/order", put(cards::reorder_cards))
        .route("/decks/{deck_id}/generate", post(generate::generate_cards))
        .route("/decks/{deck_id}/study", post(study::start_study))
        .route(
            "/cards/{card_id}",
            put(cards::update_card).delete(cards::delete_card),
        )
        .route(
            "/study/{session_id}",
            get(study::get_study).delete(study::finish_study),
        )
        .route("/study/{session_id}/actions", post(study::apply_action))
}
