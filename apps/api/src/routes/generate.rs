//! AI card generation handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use flashdeck_ai::{AiError, GenerationRequest};
use flashdeck_core::validation::validate_generation_count;
use flashdeck_core::{Card, CardDraft, CardInput, FieldErrors, AI_GENERATION_FEATURE};

use crate::auth::AuthUser;
use crate::error::{ApiError, DbResultExt, Operation};
use crate::extract::ApiPath;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// How many cards to ask for. Defaults to 20.
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub cards: Vec<Card>,
    pub total_generated: usize,
}

/// `POST /decks/{deck_id}/generate`
///
/// ## Checks, in order
/// 1. `ai_flashcard_generation` entitlement (403)
/// 2. Deck ownership (404)
/// 3. Deck has a description (422)
/// 4. `count` within 1..=50 (422)
///
/// The body is optional. Generated cards are appended after the deck's
/// current last card.
pub async fn generate_cards(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(deck_id): ApiPath<i64>,
    body: Bytes,
) -> Result<(StatusCode, Json<GenerateResponse>), ApiError> {
    user.require_feature(AI_GENERATION_FEATURE)?;

    let owned = state
        .db
        .decks()
        .authorize(deck_id, &user.id)
        .await
        .during(Operation::GenerateCards)?;

    let deck = owned.deck();
    let description = deck
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let Some(description) = description else {
        let mut errors = FieldErrors::new();
        errors.push(
            "description",
            "Add a description to this deck before generating cards.",
        );
        return Err(ApiError::validation(errors));
    };

    let request: GenerateRequest = if body.is_empty() {
        GenerateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::malformed_body(&e.to_string()))?
    };
    let count = validate_generation_count(request.count).map_err(|e| {
        let mut errors = FieldErrors::new();
        errors.add(e);
        ApiError::validation(errors)
    })?;

    let generation = GenerationRequest::new(&deck.title, Some(description), count);
    tracing::info!(deck_id, count, "Requesting generated cards");
    let generated = state.generator.generate(&generation).await?;

    let drafts: Vec<CardDraft> = generated
        .into_iter()
        .filter_map(|card| CardInput::from(card).validate().ok())
        .take(count as usize)
        .collect();
    if drafts.is_empty() {
        return Err(AiError::EmptyResult.into());
    }

    let cards = state
        .db
        .cards()
        .create_many(&owned, &drafts)
        .await
        .during(Operation::GenerateCards)?;

    tracing::info!(deck_id, card_count = cards.len(), "Generated cards saved");
    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            total_generated: cards.len(),
            cards,
        }),
    ))
}
