//! # Card Repository
//!
//! Database operations for cards. Every method takes an ownership proof
//! ([`OwnedDeck`] or [`OwnedCard`]) instead of a raw deck id.
//!
//! ## Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Card Order Within a Deck                             │
//! │                                                                         │
//! │  sort_order:   0        1        2         ← store order (ASC, id ASC) │
//! │              ┌──────┐ ┌──────┐ ┌──────┐                                │
//! │              │Hello │ │ Bye  │ │Thanks│                                │
//! │              └──────┘ └──────┘ └──────┘                                │
//! │                                                                         │
//! │  create()       → MAX(sort_order) + 1 = 3                              │
//! │  create_many()  → 3, 4, 5, ... in one transaction                      │
//! │  reorder([c,a]) → c = 0, a = 1 (ids outside the deck ignored)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::OwnedDeck;
use flashdeck_core::{Card, CardDraft, Deck};

const CARD_COLUMNS: &str = "id, deck_id, front, back, sort_order, created_at, updated_at";

/// Order value for the next card appended to deck `?1`; `0` for an empty deck.
const NEXT_ORDER_SQL: &str = "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM cards WHERE deck_id = ?1";

/// Proof that the acting user owns a card, through its deck.
#[derive(Debug, Clone)]
pub struct OwnedCard {
    card: Card,
    deck: OwnedDeck,
}

impl OwnedCard {
    pub fn id(&self) -> i64 {
        self.card.id
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    /// Ownership of the card's deck.
    pub fn deck(&self) -> &OwnedDeck {
        &self.deck
    }
}

/// A card joined with its deck, as read by [`CardRepository::authorize`].
#[derive(Debug, sqlx::FromRow)]
struct OwnedCardRow {
    id: i64,
    deck_id: i64,
    front: String,
    back: String,
    sort_order: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deck_user_id: String,
    deck_title: String,
    deck_description: Option<String>,
    deck_created_at: DateTime<Utc>,
    deck_updated_at: DateTime<Utc>,
}

impl From<OwnedCardRow> for OwnedCard {
    fn from(row: OwnedCardRow) -> Self {
        let deck = Deck {
            id: row.deck_id,
            user_id: row.deck_user_id,
            title: row.deck_title,
            description: row.deck_description,
            created_at: row.deck_created_at,
            updated_at: row.deck_updated_at,
        };

        OwnedCard {
            card: Card {
                id: row.id,
                deck_id: row.deck_id,
                front: row.front,
                back: row.back,
                order: row.sort_order,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            deck: OwnedDeck::new(deck),
        }
    }
}

/// Repository for card database operations.
#[derive(Debug, Clone)]
pub struct CardRepository {
    pool: SqlitePool,
}

impl CardRepository {
    /// Creates a new CardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CardRepository { pool }
    }

    /// Lists a deck's cards in store order.
    pub async fn list_for_deck(&self, deck: &OwnedDeck) -> DbResult<Vec<Card>> {
        let cards = sqlx::query_as::<_, Card>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE deck_id = ?1 ORDER BY sort_order ASC, id ASC"
        ))
        .bind(deck.id())
        .fetch_all(&self.pool)
        .await?;

        debug!(deck_id = deck.id(), card_count = cards.len(), "Listed cards");
        Ok(cards)
    }

    /// Checks that `user_id` owns the deck card `card_id` belongs to.
    ///
    /// Card and deck come back from one joined query, so the ownership
    /// check happens exactly once.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No such card, or in someone else's deck
    pub async fn authorize(&self, card_id: i64, user_id: &str) -> DbResult<OwnedCard> {
        let row = sqlx::query_as::<_, OwnedCardRow>(
            r#"
            SELECT c.id, c.deck_id, c.front, c.back, c.sort_order, c.created_at, c.updated_at,
                   d.user_id AS deck_user_id,
                   d.title AS deck_title,
                   d.description AS deck_description,
                   d.created_at AS deck_created_at,
                   d.updated_at AS deck_updated_at
            FROM cards c
            INNER JOIN decks d ON d.id = c.deck_id
            WHERE c.id = ?1 AND d.user_id = ?2
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(OwnedCard::from(row)),
            None => {
                debug!(card_id, user_id = %user_id, "Card ownership check failed");
                Err(DbError::not_found("Card", card_id))
            }
        }
    }

    /// Returns the order value the next appended card should get.
    ///
    /// `0` for an empty deck.
    pub async fn next_order(&self, deck: &OwnedDeck) -> DbResult<i64> {
        let next: i64 = sqlx::query_scalar(NEXT_ORDER_SQL)
            .bind(deck.id())
            .fetch_one(&self.pool)
            .await?;

        Ok(next)
    }

    /// Appends one card to the end of a deck.
    pub async fn create(&self, deck: &OwnedDeck, draft: &CardDraft) -> DbResult<Card> {
        debug!(deck_id = deck.id(), "Creating card");

        let now = Utc::now();

        // Order computed in the same statement so concurrent appends can't collide
        let card = sqlx::query_as::<_, Card>(&format!(
            r#"
            INSERT INTO cards (deck_id, front, back, sort_order, created_at, updated_at)
            VALUES (
                ?1, ?2, ?3,
                ({NEXT_ORDER_SQL}),
                ?4, ?4
            )
            RETURNING {CARD_COLUMNS}
            "#
        ))
        .bind(deck.id())
        .bind(draft.front())
        .bind(draft.back())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(card)
    }

    /// Appends several cards in one transaction, continuing the deck's order.
    ///
    /// Either every card is written or none is.
    pub async fn create_many(&self, deck: &OwnedDeck, drafts: &[CardDraft]) -> DbResult<Vec<Card>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let start: i64 = sqlx::query_scalar(NEXT_ORDER_SQL)
            .bind(deck.id())
            .fetch_one(&mut *tx)
            .await?;

        let insert = format!(
            r#"
            INSERT INTO cards (deck_id, front, back, sort_order, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING {CARD_COLUMNS}
            "#
        );

        let mut cards = Vec::with_capacity(drafts.len());
        for (offset, draft) in drafts.iter().enumerate() {
            let card = sqlx::query_as::<_, Card>(&insert)
                .bind(deck.id())
                .bind(draft.front())
                .bind(draft.back())
                .bind(start + offset as i64)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;
            cards.push(card);
        }

        tx.commit().await?;

        info!(deck_id = deck.id(), card_count = cards.len(), "Inserted cards");
        Ok(cards)
    }

    /// Replaces both faces of an owned card. Its order is kept.
    pub async fn update(&self, owned: &OwnedCard, draft: &CardDraft) -> DbResult<Card> {
        debug!(card_id = owned.id(), "Updating card");

        let now = Utc::now();

        let card = sqlx::query_as::<_, Card>(&format!(
            r#"
            UPDATE cards
            SET front = ?1, back = ?2, updated_at = ?3
            WHERE id = ?4 AND deck_id = ?5
            RETURNING {CARD_COLUMNS}
            "#
        ))
        .bind(draft.front())
        .bind(draft.back())
        .bind(now)
        .bind(owned.id())
        .bind(owned.deck().id())
        .fetch_optional(&self.pool)
        .await?;

        card.ok_or_else(|| DbError::not_found("Card", owned.id()))
    }

    /// Deletes an owned card.
    pub async fn delete(&self, owned: OwnedCard) -> DbResult<()> {
        debug!(card_id = owned.id(), "Deleting card");

        let result = sqlx::query("DELETE FROM cards WHERE id = ?1 AND deck_id = ?2")
            .bind(owned.id())
            .bind(owned.deck().id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Card", owned.id()));
        }

        Ok(())
    }

    /// Rewrites the order of a deck's cards to follow `card_ids`.
    ///
    /// Ids that don't belong to the deck are skipped. Cards not listed keep
    /// their old order value. Runs in one transaction.
    ///
    /// ## Returns
    /// Number of cards whose order was written.
    pub async fn reorder(&self, deck: &OwnedDeck, card_ids: &[i64]) -> DbResult<u64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;

        for (index, card_id) in card_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE cards SET sort_order = ?1, updated_at = ?2 WHERE id = ?3 AND deck_id = ?4",
            )
            .bind(index as i64)
            .bind(now)
            .bind(card_id)
            .bind(deck.id())
            .execute(&mut *tx)
            .await?;

            updated += result.rows_affected();
        }

        tx.commit().await?;

        debug!(deck_id = deck.id(), requested = card_ids.len(), updated, "Reordered cards");
        Ok(updated)
    }

    /// Removes every card from a deck, keeping the deck.
    ///
    /// ## Returns
    /// Number of cards deleted.
    pub async fn delete_all(&self, deck: &OwnedDeck) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cards WHERE deck_id = ?1")
            .bind(deck.id())
            .execute(&self.pool)
            .await?;

        info!(deck_id = deck.id(), deleted = result.rows_affected(), "Cleared deck");
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::repository::test_support::{card_draft, db, deck_draft};
    use crate::{Database, OwnedDeck};

    async fn owned_deck(db: &Database, user: &str) -> OwnedDeck {
        let deck = db.decks().create(user, &deck_draft("Spanish")).await.unwrap();
        db.decks().authorize(deck.id, user).await.unwrap()
    }

    fn fronts(cards: &[flashdeck_core::Card]) -> Vec<&str> {
        cards.iter().map(|c| c.front.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_appends_order() {
        let db = db().await;
        let deck = owned_deck(&db, "alice").await;

        assert_eq!(db.cards().next_order(&deck).await.unwrap(), 0);

        let a = db.cards().create(&deck, &card_draft("Hello", "Hola")).await.unwrap();
        let b = db.cards().create(&deck, &card_draft("Bye", "Adiós")).await.unwrap();

        assert_eq!(a.order, 0);
        assert_eq!(b.order, 1);
        assert_eq!(db.cards().next_order(&deck).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_many_continues_sequence() {
        let db = db().await;
        let deck = owned_deck(&db, "alice").await;
        db.cards().create(&deck, &card_draft("Hello", "Hola")).await.unwrap();

        let drafts = vec![card_draft("Dog", "Perro"), card_draft("Cat", "Gato")];
        let cards = db.cards().create_many(&deck, &drafts).await.unwrap();

        assert_eq!(cards.iter().map(|c| c.order).collect::<Vec<_>>(), vec![1, 2]);

        let listed = db.cards().list_for_deck(&deck).await.unwrap();
        assert_eq!(fronts(&listed), vec!["Hello", "Dog", "Cat"]);
    }

    #[tokio::test]
    async fn test_create_many_empty_is_noop() {
        let db = db().await;
        let deck = owned_deck(&db, "alice").await;

        assert!(db.cards().create_many(&deck, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_order() {
        let db = db().await;
        let deck = owned_deck(&db, "alice").await;
        db.cards().create(&deck, &card_draft("Hello", "Hola")).await.unwrap();
        let card = db.cards().create(&deck, &card_draft("Bye", "Adios")).await.unwrap();

        let owned = db.cards().authorize(card.id, "alice").await.unwrap();
        let updated = db.cards().update(&owned, &card_draft("Goodbye", "Adiós")).await.unwrap();

        assert_eq!(updated.front, "Goodbye");
        assert_eq!(updated.back, "Adiós");
        assert_eq!(updated.order, card.order);
    }

    #[tokio::test]
    async fn test_authorize_carries_owning_deck() {
        let db = db().await;
        let deck = owned_deck(&db, "alice").await;
        let card = db.cards().create(&deck, &card_draft("Hello", "Hola")).await.unwrap();

        let owned = db.cards().authorize(card.id, "alice").await.unwrap();

        assert_eq!(owned.card(), &card);
        assert_eq!(owned.deck().id(), deck.id());
        assert_eq!(owned.deck().user_id(), "alice");
        assert_eq!(owned.deck().deck(), deck.deck());
    }

    #[tokio::test]
    async fn test_other_user_cannot_touch_card() {
        let db = db().await;
        let deck = owned_deck(&db, "alice").await;
        let card = db.cards().create(&deck, &card_draft("Hello", "Hola")).await.unwrap();

        let err = db.cards().authorize(card.id, "bob").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let deck = owned_deck(&db, "alice").await;
        let card = db.cards().create(&deck, &card_draft("Hello", "Hola")).await.unwrap();

        let owned = db.cards().authorize(card.id, "alice").await.unwrap();
        db.cards().delete(owned).await.unwrap();

        assert!(db.cards().list_for_deck(&deck).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_ignores_foreign_ids() {
        let db = db().await;
        let deck = owned_deck(&db, "alice").await;
        let other = owned_deck(&db, "bob").await;

        let a = db.cards().create(&deck, &card_draft("A", "a")).await.unwrap();
        let b = db.cards().create(&deck, &card_draft("B", "b")).await.unwrap();
        let c = db.cards().create(&deck, &card_draft("C", "c")).await.unwrap();
        let foreign = db.cards().create(&other, &card_draft("X", "x")).await.unwrap();

        let updated = db
            .cards()
            .reorder(&deck, &[c.id, foreign.id, a.id, b.id])
            .await
            .unwrap();
        assert_eq!(updated, 3);

        let listed = db.cards().list_for_deck(&deck).await.unwrap();
        assert_eq!(fronts(&listed), vec!["C", "A", "B"]);

        // Bob's card is untouched
        let bobs = db.cards().list_for_deck(&other).await.unwrap();
        assert_eq!(bobs[0].order, 0);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let db = db().await;
        let deck = owned_deck(&db, "alice").await;
        db.cards().create(&deck, &card_draft("A", "a")).await.unwrap();
        db.cards().create(&deck, &card_draft("B", "b")).await.unwrap();

        assert_eq!(db.cards().delete_all(&deck).await.unwrap(), 2);
        assert!(db.cards().list_for_deck(&deck).await.unwrap().is_empty());
        assert!(db.decks().authorize(deck.id(), "alice").await.is_ok());
    }
}
