//! # Domain Types
//!
//! Core domain types used throughout Flashdeck.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐          ┌─────────────────┐                      │
//! │  │      Deck       │ 1      * │      Card       │                      │
//! │  │  ─────────────  │─────────►│  ─────────────  │                      │
//! │  │  id (i64)       │          │  id (i64)       │                      │
//! │  │  user_id        │          │  deck_id (FK)   │                      │
//! │  │  title          │          │  front / back   │                      │
//! │  │  description?   │          │  order          │                      │
//! │  └─────────────────┘          └────────┬────────┘                      │
//! │                                        │ snapshot at session start      │
//! │  ┌─────────────────┐          ┌────────▼────────┐                      │
//! │  │  DeckSummary    │          │   StudyCard     │                      │
//! │  │  Deck + count   │          │  id/front/back  │                      │
//! │  └─────────────────┘          └─────────────────┘                      │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │  GeneratedCard  │  front/back pair returned by the AI generator     │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! A deck belongs to exactly one user (`user_id`, the identity provider's
//! subject). Cards carry no owner of their own; ownership always flows
//! through the deck.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Deck
// =============================================================================

/// A named collection of cards owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Deck {
    /// Database identity.
    pub id: i64,

    /// Identity-provider subject of the owner.
    pub user_id: String,

    /// Display title (1..=255 characters).
    pub title: String,

    /// Optional description. Also used as the topic hint for AI generation.
    pub description: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Deck {
    /// Returns true if the deck has a non-blank description.
    ///
    /// AI generation is only offered for decks that describe their topic.
    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false)
    }
}

// =============================================================================
// Deck Summary
// =============================================================================

/// A deck plus the number of cards in it, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DeckSummary {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Number of cards currently in the deck.
    pub card_count: i64,
}

// =============================================================================
// Card
// =============================================================================

/// A front/back text pair belonging to one deck.
///
/// `order` is the position within the deck. Cards are listed by
/// `order`, then by `id` to break ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Card {
    pub id: i64,
    pub deck_id: i64,
    pub front: String,
    pub back: String,
    /// Stored as `sort_order` because ORDER is an SQL keyword.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "sort_order"))]
    pub order: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Read-only snapshot of this card for a study session.
    pub fn to_study_card(&self) -> StudyCard {
        StudyCard {
            id: self.id,
            front: self.front.clone(),
            back: self.back.clone(),
        }
    }
}

// =============================================================================
// Study Card
// =============================================================================

/// The immutable card record handed to a study session.
///
/// Uses the snapshot pattern: edits made to the deck while a session is
/// running do not affect the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StudyCard {
    pub id: i64,
    pub front: String,
    pub back: String,
}

impl StudyCard {
    /// Convenience constructor, mostly for tests and seeding.
    pub fn new(id: i64, front: impl Into<String>, back: impl Into<String>) -> Self {
        StudyCard {
            id,
            front: front.into(),
            back: back.into(),
        }
    }
}

impl From<&Card> for StudyCard {
    fn from(card: &Card) -> Self {
        card.to_study_card()
    }
}

// =============================================================================
// Generated Card
// =============================================================================

/// A front/back pair produced by the AI generator, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeneratedCard {
    pub front: String,
    pub back: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
