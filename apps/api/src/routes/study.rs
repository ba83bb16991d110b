//! Study session handlers.
//!
//! The session is a snapshot of the deck's cards taken at start; later
//! edits to the deck don't reach it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use flashdeck_core::{StudyAction, StudyCard, StudyInput, StudySession};

use crate::auth::AuthUser;
use crate::error::{ApiError, DbResultExt, Operation};
use crate::extract::{ApiJson, ApiPath};
use crate::study_sessions::StudySnapshot;
use crate::AppState;

const SESSION_NOT_FOUND: &str = "Study session not found or it has expired.";

/// Body of `POST /study/{session_id}/actions`.
///
/// Either a named action (`{"action": "correct"}`) or a raw key input
/// (`{"input": "toggle"}`).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum ActionRequest {
    Action { action: StudyAction },
    Input { input: StudyInput },
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    /// False when the action was not allowed in the current state.
    pub applied: bool,
    #[serde(flatten)]
    pub study: StudySnapshot,
}

#[derive(Debug, Serialize)]
pub struct FinishResponse {
    pub deck_id: i64,
}

/// `POST /decks/{deck_id}/study`
pub async fn start_study(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(deck_id): ApiPath<i64>,
) -> Result<(StatusCode, Json<StudySnapshot>), ApiError> {
    let owned = state
        .db
        .decks()
        .authorize(deck_id, &user.id)
        .await
        .during(Operation::StartStudy)?;

    let cards = state
        .db
        .cards()
        .list_for_deck(&owned)
        .await
        .during(Operation::StartStudy)?;

    let session = StudySession::new(cards.iter().map(StudyCard::from).collect())?;
    let snapshot = state
        .sessions
        .start(&user.id, deck_id, &owned.deck().title, session);

    tracing::info!(deck_id, card_count = cards.len(), session_id = %snapshot.session_id, "Study session started");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// `GET /study/{session_id}`
pub async fn get_study(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(session_id): ApiPath<Uuid>,
) -> Result<Json<StudySnapshot>, ApiError> {
    state
        .sessions
        .view(session_id, &user.id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(SESSION_NOT_FOUND))
}

/// `POST /study/{session_id}/actions`
///
/// Disallowed actions are not errors; they come back with `applied: false`
/// and an unchanged view.
pub async fn apply_action(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(session_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ActionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (transition, study) = state
        .sessions
        .apply(session_id, &user.id, |session| match request {
            ActionRequest::Action { action } => session.apply(action),
            ActionRequest::Input { input } => session.handle_input(input),
        })
        .ok_or_else(|| ApiError::not_found(SESSION_NOT_FOUND))?;

    tracing::debug!(%session_id, ?request, applied = transition.is_applied(), "Study action");
    Ok(Json(ActionResponse {
        applied: transition.is_applied(),
        study,
    }))
}

/// `DELETE /study/{session_id}`
///
/// Discards the session and tells the client which deck to return to.
pub async fn finish_study(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(session_id): ApiPath<Uuid>,
) -> Result<Json<FinishResponse>, ApiError> {
    let deck_id = state
        .sessions
        .finish(session_id, &user.id)
        .ok_or_else(|| ApiError::not_found(SESSION_NOT_FOUND))?;

    Ok(Json(FinishResponse { deck_id }))
}
