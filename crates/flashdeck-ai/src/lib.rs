//! # flashdeck-ai: AI Flashcard Generation
//!
//! Drafts flashcards for a deck topic by asking an external text-generation
//! service. The service is treated as an opaque function:
//!
//! ```text
//! generate(topic, count) ──► [ { front, back }, ... ]   or   AiError
//! ```
//!
//! ## Module Organization
//!
//! - [`generator`] - The [`FlashcardGenerator`] trait and its request type
//! - [`client`] - [`ChatCompletionsGenerator`], the HTTP implementation
//! - [`config`] - [`AiConfig`] (API key, model, endpoint, timeout)
//! - [`error`] - [`AiError`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use flashdeck_ai::{AiConfig, ChatCompletionsGenerator, FlashcardGenerator, GenerationRequest};
//!
//! let config = AiConfig::default().api_key("sk-...");
//! let generator: Arc<dyn FlashcardGenerator> = Arc::new(ChatCompletionsGenerator::new(config)?);
//!
//! let request = GenerationRequest::new("Spanish Basics", Some("Everyday words"), 20);
//! let cards = generator.generate(&request).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod generator;

pub use client::ChatCompletionsGenerator;
pub use config::AiConfig;
pub use error::{AiError, AiResult};
pub use generator::{FlashcardGenerator, GenerationRequest};
