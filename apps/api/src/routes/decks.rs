//! Deck handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use flashdeck_core::{Card, Deck, DeckInput, DeckSummary, AI_GENERATION_FEATURE};

use crate::auth::AuthUser;
use crate::error::{ApiError, DbResultExt, Operation};
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

/// A deck with its cards in display order.
#[derive(Debug, Serialize)]
pub struct DeckDetail {
    #[serde(flatten)]
    pub deck: Deck,
    pub cards: Vec<Card>,
    /// The user may ask for AI-generated cards for this deck.
    pub can_generate: bool,
}

/// `GET /decks`
pub async fn list_decks(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<DeckSummary>>, ApiError> {
    let decks = state
        .db
        .decks()
        .list_for_user(&user.id)
        .await
        .during(Operation::ListDecks)?;

    Ok(Json(decks))
}

/// `POST /decks`
pub async fn create_deck(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<DeckInput>,
) -> Result<(StatusCode, Json<Deck>), ApiError> {
    let draft = input.validate()?;

    let deck = state
        .db
        .decks()
        .create(&user.id, &draft)
        .await
        .during(Operation::CreateDeck)?;

    tracing::info!(deck_id = deck.id, user_id = %user.id, "Deck created");
    Ok((StatusCode::CREATED, Json(deck)))
}

/// `GET /decks/{deck_id}`
pub async fn get_deck(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(deck_id): ApiPath<i64>,
) -> Result<Json<DeckDetail>, ApiError> {
    let owned = state
        .db
        .decks()
        .authorize(deck_id, &user.id)
        .await
        .during(Operation::ViewDeck)?;

    let cards = state
        .db
        .cards()
        .list_for_deck(&owned)
        .await
        .during(Operation::ViewDeck)?;

    let deck = owned.into_deck();
    Ok(Json(DeckDetail {
        can_generate: user.has_feature(AI_GENERATION_FEATURE) && deck.has_description(),
        deck,
        cards,
    }))
}

/// `PUT /decks/{deck_id}`
///
/// Ownership is checked before validation, so a foreign deck is reported as
/// missing even when the body is also invalid.
pub async fn update_deck(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(deck_id): ApiPath<i64>,
    ApiJson(input): ApiJson<DeckInput>,
) -> Result<Json<Deck>, ApiError> {
    let decks = state.db.decks();
    let owned = decks
        .authorize(deck_id, &user.id)
        .await
        .during(Operation::UpdateDeck)?;

    let draft = input.validate()?;
    let deck = decks
        .update(&owned, &draft)
        .await
        .during(Operation::UpdateDeck)?;

    tracing::info!(deck_id, user_id = %user.id, "Deck updated");
    Ok(Json(deck))
}

/// `DELETE /decks/{deck_id}`
pub async fn delete_deck(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(deck_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    let decks = state.db.decks();
    let owned = decks
        .authorize(deck_id, &user.id)
        .await
        .during(Operation::DeleteDeck)?;

    decks.delete(owned).await.during(Operation::DeleteDeck)?;

    tracing::info!(deck_id, user_id = %user.id, "Deck deleted");
    Ok(StatusCode::NO_CONTENT)
}
