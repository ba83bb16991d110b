//! # flashdeck-db: Database Layer for Flashdeck
//!
//! This crate provides database access for Flashdeck.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Flashdeck Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (PUT /cards/{card_id})                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   flashdeck-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (deck.rs)    │    │  (embedded)  │  │   │
//! │  │   │               │    │  (card.rs)    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│               │    │ 001_init.sql │  │   │
//! │  │   │               │    │  OwnedDeck ◄──┼─── ownership     │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     ./flashdeck.db                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Deck and card repositories, ownership capability
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flashdeck_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./flashdeck.db")).await?;
//!
//! // Every card write starts with an ownership check
//! let deck = db.decks().authorize(deck_id, &user_id).await?;
//! let card = db.cards().create(&deck, &draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::card::{CardRepository, OwnedCard};
pub use repository::deck::DeckRepository;
pub use repository::OwnedDeck;
