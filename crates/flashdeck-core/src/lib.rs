//! # flashdeck-core: Pure Business Logic for Flashdeck
//!
//! This crate is the **heart** of Flashdeck. It contains the domain types,
//! the input validation rules and the study session state machine, all as
//! pure code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Flashdeck Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Dashboard ──► Deck Page ──► Study Session                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum handlers)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ flashdeck-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌──────────────┐              │   │
//! │  │   │   types   │  │ validation │  │    study     │              │   │
//! │  │   │   Deck    │  │ DeckInput  │  │ StudySession │              │   │
//! │  │   │   Card    │  │ CardInput  │  │ retry queue  │              │   │
//! │  │   └───────────┘  └────────────┘  └──────────────┘              │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                flashdeck-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, ownership capability         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Deck, Card, GeneratedCard, ...)
//! - [`validation`] - Field rules and validated drafts
//! - [`study`] - The study session engine
//! - [`error`] - Domain error types and per-field error maps
//!
//! ## Example Usage
//!
//! ```rust
//! use flashdeck_core::study::{StudySession, Transition};
//! use flashdeck_core::StudyCard;
//!
//! let cards = vec![
//!     StudyCard::new(1, "Dog", "Anjing"),
//!     StudyCard::new(2, "Cat", "Kucing"),
//! ];
//! let mut session = StudySession::new(cards).unwrap();
//!
//! assert_eq!(session.reveal(), Transition::Applied);
//! assert_eq!(session.mark_incorrect(), Transition::Applied);
//!
//! // "Dog" was re-queued behind the original deck
//! assert_eq!(session.queue_len(), 3);
//! assert_eq!(session.position(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod study;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FieldErrors, ValidationError};
pub use study::{StudyAction, StudyInput, StudySession, StudyView, Transition};
pub use types::*;
pub use validation::{CardDraft, CardInput, DeckDraft, DeckInput};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a deck title, in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum length of a deck description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Maximum length of either face of a card, in characters.
pub const MAX_CARD_TEXT_LEN: usize = 1000;

/// Number of cards requested from the generator when the caller doesn't say.
pub const DEFAULT_GENERATION_COUNT: u32 = 20;

/// Upper bound on a single generation request.
pub const MAX_GENERATION_COUNT: u32 = 50;

/// Billing entitlement that unlocks AI flashcard generation.
///
/// Carried in the identity token's `features` claim.
pub const AI_GENERATION_FEATURE: &str = "ai_flashcard_generation";
