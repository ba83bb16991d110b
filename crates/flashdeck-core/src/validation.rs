//! # Validation Module
//!
//! Input validation for decks, cards and generation requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend form                                                │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: field rules → DeckDraft / CardDraft                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints (ON DELETE CASCADE)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Drafts
//! Repositories accept only [`DeckDraft`] and [`CardDraft`]. Their fields are
//! private and the only way to build one is through `validate()`, so an
//! unvalidated title or card face cannot reach the database.
//!
//! ## Usage
//! ```rust
//! use flashdeck_core::validation::DeckInput;
//!
//! let input = DeckInput {
//!     title: "  Spanish  ".to_string(),
//!     description: Some("   ".to_string()),
//! };
//! let draft = input.validate().unwrap();
//!
//! assert_eq!(draft.title(), "Spanish");
//! assert_eq!(draft.description(), None);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{FieldErrors, ValidationError};
use crate::types::GeneratedCard;
use crate::{
    DEFAULT_GENERATION_COUNT, MAX_CARD_TEXT_LEN, MAX_DESCRIPTION_LEN, MAX_GENERATION_COUNT,
    MAX_TITLE_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required text field and enforces its maximum length.
///
/// Length is counted in characters, not bytes, so "Adiós" is 5 long.
///
/// ## Example
/// ```rust
/// use flashdeck_core::validation::validate_required_text;
///
/// assert_eq!(validate_required_text("front", " Hola ", 10).unwrap(), "Hola");
/// assert!(validate_required_text("front", "   ", 10).is_err());
/// ```
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Trims an optional text field. Blank input is treated as absent.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(None),
    };

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(Some(value.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a database id taken from a path or body.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<i64> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(id)
}

/// Validates the number of cards requested from the AI generator.
///
/// ## Rules
/// - Absent means [`DEFAULT_GENERATION_COUNT`]
/// - Must be between 1 and [`MAX_GENERATION_COUNT`]
///
/// ## Example
/// ```rust
/// use flashdeck_core::validation::validate_generation_count;
///
/// assert_eq!(validate_generation_count(None).unwrap(), 20);
/// assert_eq!(validate_generation_count(Some(5)).unwrap(), 5);
/// assert!(validate_generation_count(Some(0)).is_err());
/// ```
pub fn validate_generation_count(count: Option<u32>) -> ValidationResult<u32> {
    let count = count.unwrap_or(DEFAULT_GENERATION_COUNT);

    if count == 0 || count > MAX_GENERATION_COUNT {
        return Err(ValidationError::OutOfRange {
            field: "count".to_string(),
            min: 1,
            max: MAX_GENERATION_COUNT as i64,
        });
    }

    Ok(count)
}

/// Validates every id in a reorder request.
///
/// All failures are reported under the single `card_ids` field.
pub fn validate_card_ids(ids: &[i64]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for &id in ids {
        if id <= 0 {
            errors.push("card_ids", format!("{id} is not a valid card id"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Deck Input
// =============================================================================

/// Raw deck fields as submitted by the create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeckInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl DeckInput {
    /// Validates every field, reporting all failures at once.
    pub fn validate(&self) -> Result<DeckDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = errors.check(validate_required_text("title", &self.title, MAX_TITLE_LEN));
        let description = errors.check(validate_optional_text(
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_LEN,
        ));

        match (title, description) {
            (Some(title), Some(description)) => Ok(DeckDraft { title, description }),
            _ => Err(errors),
        }
    }
}

/// A validated deck, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckDraft {
    title: String,
    description: Option<String>,
}

impl DeckDraft {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

// =============================================================================
// Card Input
// =============================================================================

/// Raw card fields as submitted by the add/edit card form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CardInput {
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
}

impl CardInput {
    /// Validates both faces, reporting all failures at once.
    pub fn validate(&self) -> Result<CardDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let front = errors.check(validate_required_text("front", &self.front, MAX_CARD_TEXT_LEN));
        let back = errors.check(validate_required_text("back", &self.back, MAX_CARD_TEXT_LEN));

        match (front, back) {
            (Some(front), Some(back)) => Ok(CardDraft { front, back }),
            _ => Err(errors),
        }
    }
}

impl From<GeneratedCard> for CardInput {
    fn from(card: GeneratedCard) -> Self {
        CardInput {
            front: card.front,
            back: card.back,
        }
    }
}

/// A validated card, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDraft {
    front: String,
    back: String,
}

impl CardDraft {
    pub fn front(&self) -> &str {
        &self.front
    }

    pub fn back(&self) -> &str {
        &self.back
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(
            validate_required_text("title", "  Spanish ", MAX_TITLE_LEN).unwrap(),
            "Spanish"
        );
    }

    #[test]
    fn test_required_text_counts_characters() {
        // 255 two-byte characters fit, 256 do not
        let ok = "é".repeat(255);
        let too_long = "é".repeat(256);

        assert!(validate_required_text("title", &ok, MAX_TITLE_LEN).is_ok());
        assert_eq!(
            validate_required_text("title", &too_long, MAX_TITLE_LEN),
            Err(ValidationError::TooLong {
                field: "title".to_string(),
                max: 255
            })
        );
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(validate_optional_text("description", Some("  "), 10), Ok(None));
        assert_eq!(validate_optional_text("description", None, 10), Ok(None));
        assert_eq!(
            validate_optional_text("description", Some(" x "), 10),
            Ok(Some("x".to_string()))
        );
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id("deck_id", 3), Ok(3));
        assert!(validate_id("deck_id", 0).is_err());
        assert!(validate_id("deck_id", -1).is_err());
    }

    #[test]
    fn test_generation_count_bounds() {
        assert_eq!(validate_generation_count(None), Ok(DEFAULT_GENERATION_COUNT));
        assert_eq!(validate_generation_count(Some(50)), Ok(50));
        assert!(validate_generation_count(Some(51)).is_err());
        assert!(validate_generation_count(Some(0)).is_err());
    }

    #[test]
    fn test_card_ids() {
        assert!(validate_card_ids(&[1, 2, 3]).is_ok());

        let errors = validate_card_ids(&[1, 0, -4]).unwrap_err();
        assert_eq!(errors.get("card_ids").map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_deck_input_reports_all_fields() {
        let input = DeckInput {
            title: "".to_string(),
            description: Some("x".repeat(MAX_DESCRIPTION_LEN + 1)),
        };

        let errors = input.validate().unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["description", "title"]
        );
    }

    #[test]
    fn test_deck_input_valid() {
        let input = DeckInput {
            title: "Spanish".to_string(),
            description: Some("Basic vocabulary".to_string()),
        };

        let draft = input.validate().unwrap();
        assert_eq!(draft.title(), "Spanish");
        assert_eq!(draft.description(), Some("Basic vocabulary"));
    }

    #[test]
    fn test_card_input_requires_both_faces() {
        let input = CardInput {
            front: " ".to_string(),
            back: "".to_string(),
        };

        let errors = input.validate().unwrap_err();
        assert!(errors.get("front").is_some());
        assert!(errors.get("back").is_some());
    }

    #[test]
    fn test_generated_card_validates_like_input() {
        let generated = GeneratedCard {
            front: " Dog ".to_string(),
            back: "Perro".to_string(),
        };

        let draft = CardInput::from(generated).validate().unwrap();
        assert_eq!(draft.front(), "Dog");
        assert_eq!(draft.back(), "Perro");
    }
}
