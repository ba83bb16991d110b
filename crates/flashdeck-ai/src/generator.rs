//! # Generator Seam
//!
//! The API layer only knows this trait. Production wires in
//! [`ChatCompletionsGenerator`](crate::ChatCompletionsGenerator); tests wire
//! in a canned implementation.

use futures_util::future::BoxFuture;

use flashdeck_core::GeneratedCard;

use crate::error::AiResult;

/// What to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Deck title.
    pub topic: String,
    /// Deck description, used as extra guidance.
    pub description: Option<String>,
    /// Maximum number of cards wanted.
    pub count: u32,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, description: Option<&str>, count: u32) -> Self {
        GenerationRequest {
            topic: topic.into(),
            description: description.map(str::to_string),
            count,
        }
    }
}

/// Produces front/back pairs for a topic.
///
/// Returns boxed futures so the API can hold an `Arc<dyn FlashcardGenerator>`.
///
/// ## Contract
/// - On success, returns between 1 and `request.count` cards
/// - Each card's faces are trimmed, non-empty and within the card length limit
/// - Nothing is persisted; the caller appends the cards to the deck
pub trait FlashcardGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, AiResult<Vec<GeneratedCard>>>;
}
