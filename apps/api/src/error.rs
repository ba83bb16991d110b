//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Flashdeck                              │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<Json<T>, ApiError>                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  No/bad token? ─────────── AuthUser rejection ───────────┐              │
//! │         │                                                │              │
//! │         ▼                                                ▼              │
//! │  Not owned? ────────────── DbError::NotFound ─────── ApiError ──► JSON  │
//! │         │                                                ▲              │
//! │         ▼                                                │              │
//! │  Bad input? ────────────── FieldErrors ──────────────────┤              │
//! │         │                                                │              │
//! │         ▼                                                │              │
//! │  Generator failed? ─────── AiError ──────────────────────┘              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Success ──────────────────────────────────────────────────────► JSON   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "Please correct the highlighted fields.",
//!   "errors": { "title": ["title is required"] }
//! }
//! ```

use axum::extract::path::ErrorKind;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use flashdeck_ai::AiError;
use flashdeck_core::{CoreError, FieldErrors};
use flashdeck_db::DbError;

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Per-field messages, present for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing, malformed or expired token (401)
    Unauthorized,

    /// Resource absent or owned by someone else (404)
    NotFoundOrForbidden,

    /// Input validation failed (422)
    ValidationError,

    /// Billing entitlement missing (403)
    FeatureRequired,

    /// Store or infrastructure failure (500)
    Unexpected,

    /// The text-generation service failed (502)
    GenerationFailed,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFoundOrForbidden => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::FeatureRequired => StatusCode::FORBIDDEN,
            ErrorCode::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::GenerationFailed => StatusCode::BAD_GATEWAY,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            errors: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFoundOrForbidden, message)
    }

    /// Creates a validation error carrying per-field messages.
    pub fn validation(errors: FieldErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: "Please correct the highlighted fields.".to_string(),
            errors: Some(errors),
        }
    }

    /// Creates a validation error that isn't tied to one field.
    pub fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError {
            code: ErrorCode::ValidationError,
            errors: Some(FieldErrors::form(message.clone())),
            message,
        }
    }

    /// Creates a validation error for a request body that didn't deserialize.
    ///
    /// `detail` is the deserializer's message, optionally prefixed with the
    /// offending field path (`front: invalid type: ...`). When a field can be
    /// read from it the message is filed under that field, otherwise under
    /// `_form`.
    pub fn malformed_body(detail: &str) -> Self {
        let detail = strip_position(detail);
        let mut errors = FieldErrors::new();
        match split_field_path(detail) {
            Some((field, message)) => errors.push(field, message),
            None => errors.push(FieldErrors::FORM, format!("Invalid request body: {detail}")),
        }

        ApiError {
            code: ErrorCode::ValidationError,
            message: "Please correct the highlighted fields.".to_string(),
            errors: Some(errors),
        }
    }

    pub fn feature_required(feature: &str) -> Self {
        ApiError::new(
            ErrorCode::FeatureRequired,
            format!("Your plan does not include the '{feature}' feature."),
        )
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unexpected, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

// =============================================================================
// Operation Context
// =============================================================================

/// What a handler was doing when the store failed.
///
/// Picks the message the user sees; the underlying error only goes to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListDecks,
    ViewDeck,
    CreateDeck,
    UpdateDeck,
    DeleteDeck,
    AddCard,
    UpdateCard,
    DeleteCard,
    ReorderCards,
    ClearCards,
    GenerateCards,
    StartStudy,
}

impl Operation {
    fn not_found_message(self) -> &'static str {
        match self {
            Operation::ListDecks | Operation::ViewDeck | Operation::StartStudy => {
                "Deck not found or you don't have permission to view this deck."
            }
            Operation::CreateDeck | Operation::UpdateDeck => {
                "Deck not found or you don't have permission to edit this deck."
            }
            Operation::DeleteDeck => {
                "Deck not found or you don't have permission to delete this deck."
            }
            Operation::AddCard | Operation::GenerateCards => {
                "Deck not found or you don't have permission to add cards to this deck."
            }
            Operation::UpdateCard | Operation::ReorderCards => {
                "Card not found or you don't have permission to edit this card."
            }
            Operation::DeleteCard | Operation::ClearCards => {
                "Card not found or you don't have permission to delete this card."
            }
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Operation::ListDecks => "Failed to load decks. Please try again.",
            Operation::ViewDeck => "Failed to load deck. Please try again.",
            Operation::CreateDeck => "Failed to create deck. Please try again.",
            Operation::UpdateDeck => "Failed to update deck. Please try again.",
            Operation::DeleteDeck => "Failed to delete deck. Please try again.",
            Operation::AddCard => "Failed to create card. Please try again.",
            Operation::UpdateCard => "Failed to update card. Please try again.",
            Operation::DeleteCard => "Failed to delete card. Please try again.",
            Operation::ReorderCards => "Failed to reorder cards. Please try again.",
            Operation::ClearCards => "Failed to delete cards. Please try again.",
            Operation::GenerateCards => "Failed to save generated cards. Please try again.",
            Operation::StartStudy => "Failed to start study session. Please try again.",
        }
    }

    /// Maps a store error to what the client sees.
    pub fn fail(self, err: DbError) -> ApiError {
        match err {
            DbError::NotFound { .. } => ApiError::not_found(self.not_found_message()),
            DbError::PoolExhausted => {
                tracing::warn!(operation = ?self, "Database pool exhausted");
                ApiError::unexpected(self.failure_message())
            }
            other => {
                tracing::error!(operation = ?self, error = %other, "Database operation failed");
                ApiError::unexpected(self.failure_message())
            }
        }
    }
}

/// Attaches an [`Operation`] to a store result.
pub trait DbResultExt<T> {
    fn during(self, operation: Operation) -> Result<T, ApiError>;
}

impl<T> DbResultExt<T> for Result<T, DbError> {
    fn during(self, operation: Operation) -> Result<T, ApiError> {
        self.map_err(|err| operation.fail(err))
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::validation(errors)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyDeck => {
                ApiError::invalid("Add at least one card to this deck before studying.")
            }
            CoreError::Validation(errors) => ApiError::validation(errors),
        }
    }
}

/// Converts database errors without operation context.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::not_found(format!(
                "{entity} not found or you don't have permission to access it."
            )),
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::unexpected("Something went wrong. Please try again.")
            }
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match &err {
            AiError::NotConfigured => tracing::warn!("Generation requested but no API key is set"),
            AiError::Request(_) | AiError::Status { .. } if err.is_retryable() => {
                tracing::warn!(error = %err, "Generation failed, retryable")
            }
            _ => tracing::error!(error = %err, "Generation failed"),
        }
        ApiError::new(ErrorCode::GenerationFailed, err.to_string())
    }
}

/// Body extraction failures from [`crate::extract::ApiJson`].
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let text = err.body_text();
                let detail = text.split_once(": ").map_or(text.as_str(), |(_, rest)| rest);
                ApiError::malformed_body(detail)
            }
            JsonRejection::JsonSyntaxError(_) => ApiError::invalid("Request body is not valid JSON."),
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::invalid("Expected a request with `Content-Type: application/json`.")
            }
            other => {
                tracing::debug!(error = %other.body_text(), "Request body rejected");
                ApiError::invalid("Could not read the request body.")
            }
        }
    }
}

/// Path parameter failures from [`crate::extract::ApiPath`].
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                let key = match err.kind() {
                    ErrorKind::ParseErrorAtKey { key, .. }
                    | ErrorKind::DeserializeError { key, .. }
                    | ErrorKind::InvalidUtf8InPathParam { key } => Some(key.clone()),
                    _ => None,
                };
                let message = format!("Invalid path parameter: {}", err.body_text());
                let mut errors = FieldErrors::new();
                errors.push(key.unwrap_or_else(|| FieldErrors::FORM.to_string()), message.clone());
                ApiError {
                    code: ErrorCode::ValidationError,
                    message,
                    errors: Some(errors),
                }
            }
            other => {
                tracing::error!(error = %other.body_text(), "Route is missing its path parameters");
                ApiError::unexpected("Something went wrong. Please try again.")
            }
        }
    }
}

/// Drops serde_json's trailing ` at line L column C`.
fn strip_position(detail: &str) -> &str {
    match detail.rfind(" at line ") {
        Some(idx) if detail[idx..].contains(" column ") => &detail[..idx],
        _ => detail,
    }
}

/// Splits `cards[2].front: message` into (`cards`, `message`).
///
/// Only the top-level field is kept since that's what the client keys its
/// form errors on.
fn split_field_path(detail: &str) -> Option<(String, String)> {
    let (path, message) = detail.split_once(": ")?;
    if path.is_empty() || path == "." || path.contains(char::is_whitespace) {
        return None;
    }
    let field = path.split(['.', '[']).next().filter(|f| !f.is_empty())?;
    Some((field.to_string(), message.to_string()))
}
