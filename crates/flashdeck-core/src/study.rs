//! # Study Session Engine
//!
//! Drives one user's review loop over a deck: flip a card, judge it, move
//! on. Cards judged incorrect during the first pass come back once at the
//! end of the session.
//!
//! ## Queue Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Study Queue                                     │
//! │                                                                         │
//! │   original cards (store order)          retry tail (FIFO)              │
//! │   ┌─────┬─────┬─────┐                   ┌─────┐                        │
//! │   │  A  │  B  │  C  │ ───────────────►  │  B  │                        │
//! │   └─────┴─────┴─────┘                   └─────┘                        │
//! │      0     1     2                         3     ◄── position           │
//! │                                                                         │
//! │   B judged incorrect on the first pass ──► appended once to the tail   │
//! │   B judged incorrect again in the tail ──► nothing (at most twice)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Card State Machine
//! ```text
//!   ┌──────────┐  reveal / flip   ┌──────────┐  correct / incorrect  ┌──────────┐
//!   │  hidden  │ ───────────────► │ revealed │ ────────────────────► │ answered │
//!   └──────────┘                  └──────────┘                       └────┬─────┘
//!        ▲   next (skip allowed)       │ next / flip: REJECTED            │
//!        │                            ▼                                  │
//!        └──────────────────── advance / retreat ◄───────────────────────┘
//! ```
//!
//! Every operation returns a [`Transition`]. An `Ignored` operation leaves
//! the session exactly as it was.
//!
//! The engine has no I/O and no clock. A UI that wants a pause between the
//! judgment and the next card calls [`StudySession::record_correct`] and
//! later [`StudySession::advance`]; headless callers use
//! [`StudySession::mark_correct`], which does both at once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::StudyCard;

// =============================================================================
// Transitions and Inputs
// =============================================================================

/// Outcome of a session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// State changed.
    Applied,
    /// Guard failed or nothing to do; state untouched.
    Ignored,
}

impl Transition {
    #[inline]
    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

/// Device-independent navigation signals (arrow keys, space bar, buttons).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StudyInput {
    Previous,
    Next,
    Toggle,
}

/// Every action a client can send to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StudyAction {
    Reveal,
    Hide,
    Flip,
    Correct,
    Incorrect,
    Next,
    Previous,
    Reset,
}

// =============================================================================
// Study Session
// =============================================================================

/// In-memory state of one study session.
///
/// The study queue is never stored; it is always `original ++ retry_queue`,
/// so the two can't drift apart.
#[derive(Debug, Clone)]
pub struct StudySession {
    original: Vec<StudyCard>,
    retry_queue: Vec<StudyCard>,
    position: usize,
    revealed: bool,
    answered: bool,
    studied: BTreeSet<i64>,
}

impl StudySession {
    /// Starts a session over `cards`, in the order given.
    ///
    /// ## Errors
    /// [`CoreError::EmptyDeck`] if `cards` is empty.
    pub fn new(cards: Vec<StudyCard>) -> CoreResult<Self> {
        if cards.is_empty() {
            return Err(CoreError::EmptyDeck);
        }

        Ok(StudySession {
            original: cards,
            retry_queue: Vec::new(),
            position: 0,
            revealed: false,
            answered: false,
            studied: BTreeSet::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Face operations
    // -------------------------------------------------------------------------

    /// Shows the back of the current card.
    pub fn reveal(&mut self) -> Transition {
        if self.revealed {
            return Transition::Ignored;
        }
        self.revealed = true;
        Transition::Applied
    }

    /// Hides the back again. Refused while a revealed card awaits judgment.
    pub fn hide(&mut self) -> Transition {
        if !self.revealed || self.awaiting_judgment() {
            return Transition::Ignored;
        }
        self.revealed = false;
        Transition::Applied
    }

    /// Toggles the face. Refused while a revealed card awaits judgment.
    pub fn flip(&mut self) -> Transition {
        if self.awaiting_judgment() {
            return Transition::Ignored;
        }
        self.revealed = !self.revealed;
        Transition::Applied
    }

    // -------------------------------------------------------------------------
    // Judgments
    // -------------------------------------------------------------------------

    /// Records a correct answer without moving on.
    pub fn record_correct(&mut self) -> Transition {
        if !self.awaiting_judgment() {
            return Transition::Ignored;
        }

        let id = self.current_card().id;
        self.studied.insert(id);
        self.answered = true;
        Transition::Applied
    }

    /// Records an incorrect answer without moving on.
    ///
    /// The card joins the retry tail if it hasn't already. A deck of one card
    /// has nothing to retry behind, so it never re-queues.
    pub fn record_incorrect(&mut self) -> Transition {
        if !self.awaiting_judgment() {
            return Transition::Ignored;
        }

        let card = self.current_card().clone();
        let is_original = self.original.iter().any(|c| c.id == card.id);
        let already_queued = self.retry_queue.iter().any(|c| c.id == card.id);

        if is_original && !already_queued && self.original.len() > 1 {
            self.retry_queue.push(card);
        }

        self.answered = true;
        Transition::Applied
    }

    /// Records a correct answer, then advances.
    pub fn mark_correct(&mut self) -> Transition {
        let judged = self.record_correct();
        if judged.is_applied() {
            self.advance();
        }
        judged
    }

    /// Records an incorrect answer, then advances.
    pub fn mark_incorrect(&mut self) -> Transition {
        let judged = self.record_incorrect();
        if judged.is_applied() {
            self.advance();
        }
        judged
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Moves to the next card.
    ///
    /// Ignored on the last card, and while a revealed card awaits judgment.
    /// An unrevealed card may be skipped.
    pub fn advance(&mut self) -> Transition {
        if self.awaiting_judgment() || self.is_last_card() {
            return Transition::Ignored;
        }
        self.position += 1;
        self.clear_card_state();
        Transition::Applied
    }

    /// Moves back one card. Allowed any time except on the first card.
    pub fn retreat(&mut self) -> Transition {
        if self.position == 0 {
            return Transition::Ignored;
        }
        self.position -= 1;
        self.clear_card_state();
        Transition::Applied
    }

    /// Restarts the session from scratch, discarding judgments and retries.
    pub fn reset(&mut self) -> Transition {
        self.retry_queue.clear();
        self.studied.clear();
        self.position = 0;
        self.clear_card_state();
        Transition::Applied
    }

    /// Applies a device-independent navigation signal.
    pub fn handle_input(&mut self, input: StudyInput) -> Transition {
        match input {
            StudyInput::Previous => self.retreat(),
            StudyInput::Next => self.advance(),
            StudyInput::Toggle => self.flip(),
        }
    }

    /// Applies a client action. Judgments advance immediately.
    pub fn apply(&mut self, action: StudyAction) -> Transition {
        match action {
            StudyAction::Reveal => self.reveal(),
            StudyAction::Hide => self.hide(),
            StudyAction::Flip => self.handle_input(StudyInput::Toggle),
            StudyAction::Correct => self.mark_correct(),
            StudyAction::Incorrect => self.mark_incorrect(),
            StudyAction::Next => self.handle_input(StudyInput::Next),
            StudyAction::Previous => self.handle_input(StudyInput::Previous),
            StudyAction::Reset => self.reset(),
        }
    }

    // -------------------------------------------------------------------------
    // Derived values
    // -------------------------------------------------------------------------

    /// The card at the current position.
    pub fn current_card(&self) -> &StudyCard {
        self.card_at(self.position)
    }

    /// Cards in visiting order: the original deck followed by the retry tail.
    pub fn study_queue(&self) -> impl Iterator<Item = &StudyCard> {
        self.original.iter().chain(self.retry_queue.iter())
    }

    pub fn queue_len(&self) -> usize {
        self.original.len() + self.retry_queue.len()
    }

    pub fn original_len(&self) -> usize {
        self.original.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn retry_queue(&self) -> &[StudyCard] {
        &self.retry_queue
    }

    /// Ids of cards judged correct at least once.
    pub fn studied(&self) -> &BTreeSet<i64> {
        &self.studied
    }

    pub fn is_last_card(&self) -> bool {
        self.position + 1 == self.queue_len()
    }

    /// On the last card and it has been judged.
    pub fn is_complete(&self) -> bool {
        self.is_last_card() && self.answered
    }

    /// Original cards not yet judged correct.
    pub fn remaining_count(&self) -> usize {
        self.original.len().saturating_sub(self.studied.len())
    }

    /// `round((position + 1) / queue_len * 100)`.
    pub fn progress_percent(&self) -> u8 {
        let pct = (self.position + 1) as f64 / self.queue_len() as f64 * 100.0;
        pct.round() as u8
    }

    /// True once the session has moved past the original deck into retries.
    pub fn is_reviewing_retries(&self) -> bool {
        !self.retry_queue.is_empty() && self.position >= self.original.len()
    }

    /// Serializable view of the session for clients.
    pub fn snapshot(&self) -> StudyView {
        let card = self.current_card();
        let awaiting = self.awaiting_judgment();

        StudyView {
            card_id: card.id,
            front: card.front.clone(),
            back: self.revealed.then(|| card.back.clone()),
            position: self.position,
            total: self.queue_len(),
            original_count: self.original.len(),
            revealed: self.revealed,
            answered: self.answered,
            current_studied: self.studied.contains(&card.id),
            studied_count: self.studied.len(),
            remaining_count: self.remaining_count(),
            retry_count: self.retry_queue.len(),
            progress_percent: self.progress_percent(),
            reviewing_retries: self.is_reviewing_retries(),
            is_last_card: self.is_last_card(),
            is_complete: self.is_complete(),
            can_go_previous: self.position > 0,
            can_go_next: !self.is_last_card() && !awaiting,
            can_judge: awaiting,
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn awaiting_judgment(&self) -> bool {
        self.revealed && !self.answered
    }

    fn clear_card_state(&mut self) {
        self.revealed = false;
        self.answered = false;
    }

    fn card_at(&self, index: usize) -> &StudyCard {
        match index.checked_sub(self.original.len()) {
            None => &self.original[index],
            Some(tail) => &self.retry_queue[tail],
        }
    }
}

// =============================================================================
// Study View
// =============================================================================

/// What a client renders for the current card.
///
/// `back` is only present while the card is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StudyView {
    pub card_id: i64,
    pub front: String,
    pub back: Option<String>,
    /// Zero-based index into the study queue.
    pub position: usize,
    /// Length of the study queue, retries included.
    pub total: usize,
    pub original_count: usize,
    pub revealed: bool,
    pub answered: bool,
    /// The current card has been judged correct at some point.
    pub current_studied: bool,
    pub studied_count: usize,
    pub remaining_count: usize,
    pub retry_count: usize,
    pub progress_percent: u8,
    pub reviewing_retries: bool,
    pub is_last_card: bool,
    pub is_complete: bool,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub can_judge: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
