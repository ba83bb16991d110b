//! # Deck Repository
//!
//! Database operations for decks.
//!
//! ## Key Operations
//! - Dashboard listing with card counts
//! - Ownership check ([`DeckRepository::authorize`])
//! - Create / update / delete (delete cascades to cards)

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::OwnedDeck;
use flashdeck_core::{Deck, DeckDraft, DeckSummary};

const DECK_COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";

/// Repository for deck database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = DeckRepository::new(pool);
///
/// let decks = repo.list_for_user("user_123").await?;
/// let owned = repo.authorize(42, "user_123").await?;
/// repo.delete(owned).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DeckRepository {
    pool: SqlitePool,
}

impl DeckRepository {
    /// Creates a new DeckRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DeckRepository { pool }
    }

    /// Lists a user's decks, newest first, each with its card count.
    ///
    /// Decks without cards are included with `card_count = 0`.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<DeckSummary>> {
        let decks = sqlx::query_as::<_, DeckSummary>(
            r#"
            SELECT
                d.id,
                d.user_id,
                d.title,
                d.description,
                d.created_at,
                d.updated_at,
                COUNT(c.id) AS card_count
            FROM decks d
            LEFT JOIN cards c ON c.deck_id = d.id
            WHERE d.user_id = ?1
            GROUP BY d.id
            ORDER BY d.created_at DESC, d.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(user_id = %user_id, count = decks.len(), "Listed decks");
        Ok(decks)
    }

    /// Checks that `user_id` owns deck `deck_id`.
    ///
    /// ## Returns
    /// * `Ok(OwnedDeck)` - The caller owns the deck
    /// * `Err(DbError::NotFound)` - No such deck, or someone else's
    pub async fn authorize(&self, deck_id: i64, user_id: &str) -> DbResult<OwnedDeck> {
        let deck = sqlx::query_as::<_, Deck>(&format!(
            "SELECT {DECK_COLUMNS} FROM decks WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(deck_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match deck {
            Some(deck) => Ok(OwnedDeck::new(deck)),
            None => {
                debug!(deck_id, user_id = %user_id, "Deck ownership check failed");
                Err(DbError::not_found("Deck", deck_id))
            }
        }
    }

    /// Inserts a new deck owned by `user_id`.
    pub async fn create(&self, user_id: &str, draft: &DeckDraft) -> DbResult<Deck> {
        debug!(user_id = %user_id, title = %draft.title(), "Creating deck");

        let now = Utc::now();

        let deck = sqlx::query_as::<_, Deck>(&format!(
            r#"
            INSERT INTO decks (user_id, title, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING {DECK_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(draft.title())
        .bind(draft.description())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Replaces the title and description of an owned deck.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - The deck was deleted after the check
    pub async fn update(&self, owned: &OwnedDeck, draft: &DeckDraft) -> DbResult<Deck> {
        debug!(deck_id = owned.id(), "Updating deck");

        let now = Utc::now();

        let deck = sqlx::query_as::<_, Deck>(&format!(
            r#"
            UPDATE decks
            SET title = ?1, description = ?2, updated_at = ?3
            WHERE id = ?4 AND user_id = ?5
            RETURNING {DECK_COLUMNS}
            "#
        ))
        .bind(draft.title())
        .bind(draft.description())
        .bind(now)
        .bind(owned.id())
        .bind(owned.user_id())
        .fetch_optional(&self.pool)
        .await?;

        deck.ok_or_else(|| DbError::not_found("Deck", owned.id()))
    }

    /// Deletes an owned deck. Its cards go with it.
    ///
    /// Takes the capability by value: there is nothing left to own afterwards.
    pub async fn delete(&self, owned: OwnedDeck) -> DbResult<()> {
        debug!(deck_id = owned.id(), "Deleting deck");

        let result = sqlx::query("DELETE FROM decks WHERE id = ?1 AND user_id = ?2")
            .bind(owned.id())
            .bind(owned.user_id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Deck", owned.id()));
        }

        Ok(())
    }

    /// Counts a user's decks.
    pub async fn count_for_user(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM decks WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
