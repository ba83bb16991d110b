//! # Repository Module
//!
//! Database repository implementations for Flashdeck.
//!
//! ## Ownership Capability
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Check, Then Writes                               │
//! │                                                                         │
//! │  handler                                                               │
//! │     │  db.decks().authorize(deck_id, user_id)                          │
//! │     ▼                                                                   │
//! │  DeckRepository ── SELECT ... WHERE id = ? AND user_id = ?             │
//! │     │                                                                   │
//! │     ├── no row ──► DbError::NotFound  (absent OR someone else's)       │
//! │     │                                                                   │
//! │     └── row ─────► OwnedDeck  ◄── only constructible in this crate     │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  CardRepository::create(&OwnedDeck, ...)                               │
//! │  CardRepository::reorder(&OwnedDeck, ...)                              │
//! │  DeckRepository::update(&OwnedDeck, ...)                               │
//! │                                                                         │
//! │  A write without an ownership check does not compile.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`DeckRepository`](deck::DeckRepository) - Deck CRUD and dashboard listing
//! - [`CardRepository`](card::CardRepository) - Card CRUD, bulk insert, reordering

pub mod card;
pub mod deck;

use flashdeck_core::Deck;

/// Proof that the acting user owns a deck.
///
/// Minted by [`DeckRepository::authorize`](deck::DeckRepository::authorize)
/// and [`CardRepository::authorize`](card::CardRepository::authorize).
/// The field is private, so code outside this crate can only pass one along.
#[derive(Debug, Clone)]
pub struct OwnedDeck {
    deck: Deck,
}

impl OwnedDeck {
    pub(crate) fn new(deck: Deck) -> Self {
        OwnedDeck { deck }
    }

    /// Id of the owned deck.
    pub fn id(&self) -> i64 {
        self.deck.id
    }

    /// Id of the owner (the acting user).
    pub fn user_id(&self) -> &str {
        &self.deck.user_id
    }

    /// The deck as it was when ownership was checked.
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn into_deck(self) -> Deck {
        self.deck
    }
}

// =============================================================================
// Shared test fixtures
// =============================================================================
