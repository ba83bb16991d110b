//! Card handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use flashdeck_core::validation::validate_card_ids;
use flashdeck_core::{Card, CardInput};

use crate::auth::AuthUser;
use crate::error::{ApiError, DbResultExt, Operation};
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Card ids in their new order.
    pub card_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AffectedRows {
    pub count: u64,
}

/// `POST /decks/{deck_id}/cards`
pub async fn create_card(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(deck_id): ApiPath<i64>,
    ApiJson(input): ApiJson<CardInput>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    let owned = state
        .db
        .decks()
        .authorize(deck_id, &user.id)
        .await
        .during(Operation::AddCard)?;

    let draft = input.validate()?;
    let card = state
        .db
        .cards()
        .create(&owned, &draft)
        .await
        .during(Operation::AddCard)?;

    tracing::info!(deck_id, card_id = card.id, order = card.order, "Card created");
    Ok((StatusCode::CREATED, Json(card)))
}

/// `PUT /cards/{card_id}`
pub async fn update_card(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(card_id): ApiPath<i64>,
    ApiJson(input): ApiJson<CardInput>,
) -> Result<Json<Card>, ApiError> {
    let cards = state.db.cards();
    let owned = cards
        .authorize(card_id, &user.id)
        .await
        .during(Operation::UpdateCard)?;

    let draft = input.validate()?;
    let card = cards
        .update(&owned, &draft)
        .await
        .during(Operation::UpdateCard)?;

    tracing::info!(card_id, deck_id = card.deck_id, "Card updated");
    Ok(Json(card))
}

/// `DELETE /cards/{card_id}`
pub async fn delete_card(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(card_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    let cards = state.db.cards();
    let owned = cards
        .authorize(card_id, &user.id)
        .await
        .during(Operation::DeleteCard)?;

    let deck_id = owned.deck().id();
    cards.delete(owned).await.during(Operation::DeleteCard)?;

    tracing::info!(card_id, deck_id, "Card deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /decks/{deck_id}/cards/order`
///
/// Ids that don't belong to the deck are skipped.
pub async fn reorder_cards(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(deck_id): ApiPath<i64>,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let owned = state
        .db
        .decks()
        .authorize(deck_id, &user.id)
        .await
        .during(Operation::ReorderCards)?;

    validate_card_ids(&request.card_ids)?;

    let cards = state.db.cards();
    let moved = cards
        .reorder(&owned, &request.card_ids)
        .await
        .during(Operation::ReorderCards)?;
    tracing::info!(deck_id, card_count = moved, "Cards reordered");

    let listed = cards
        .list_for_deck(&owned)
        .await
        .during(Operation::ReorderCards)?;
    Ok(Json(listed))
}

/// `DELETE /decks/{deck_id}/cards`
pub async fn delete_all_cards(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(deck_id): ApiPath<i64>,
) -> Result<Json<AffectedRows>, ApiError> {
    let owned = state
        .db
        .decks()
        .authorize(deck_id, &user.id)
        .await
        .during(Operation::ClearCards)?;

    let count = state
        .db
        .cards()
        .delete_all(&owned)
        .await
        .during(Operation::ClearCards)?;

    tracing::info!(deck_id, card_count = count, "All cards deleted");
    Ok(Json(AffectedRows { count }))
}
