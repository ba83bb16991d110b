//! # Chat Completions Client
//!
//! [`FlashcardGenerator`] backed by an OpenAI-compatible
//! `/chat/completions` endpoint in JSON mode.
//!
//! ## Exchange
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST {base_url}/chat/completions                                      │
//! │  Authorization: Bearer <api_key>                                       │
//! │  {                                                                     │
//! │    "model": "gpt-4o-mini",                                             │
//! │    "response_format": { "type": "json_object" },                       │
//! │    "messages": [ system: rules, user: topic + description + count ]    │
//! │  }                                                                     │
//! │                         │                                               │
//! │                         ▼                                               │
//! │  choices[0].message.content = "{\"cards\":[{\"front\":..,\"back\":..}]}" │
//! │                         │                                               │
//! │                         ▼                                               │
//! │  trim ─► drop blank / too long / duplicate fronts ─► truncate to count │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use flashdeck_core::{GeneratedCard, MAX_CARD_TEXT_LEN};

use crate::config::AiConfig;
use crate::error::{AiError, AiResult};
use crate::generator::{FlashcardGenerator, GenerationRequest};

const SYSTEM_PROMPT: &str = "You write vocabulary flashcards. \
Reply with a JSON object of the form {\"cards\": [{\"front\": \"...\", \"back\": \"...\"}]}. \
The front is a word or short phrase, the back is its translation or a concise definition. \
Every front must be unique. Do not number the cards and do not add any other keys.";

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CardsPayload {
    cards: Vec<RawCard>,
}

#[derive(Debug, Deserialize)]
struct RawCard {
    #[serde(default)]
    front: String,
    #[serde(default)]
    back: String,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorFields>,
}

#[derive(Debug, Deserialize)]
struct ErrorFields {
    message: Option<String>,
}

// =============================================================================
// Client
// =============================================================================

/// HTTP generator for OpenAI-compatible services.
#[derive(Debug, Clone)]
pub struct ChatCompletionsGenerator {
    http: Client,
    config: AiConfig,
}

impl ChatCompletionsGenerator {
    /// Builds the HTTP client. Succeeds without an API key; requests then
    /// fail with [`AiError::NotConfigured`].
    pub fn new(config: AiConfig) -> AiResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(ChatCompletionsGenerator { http, config })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    async fn request_cards(&self, request: &GenerationRequest) -> AiResult<Vec<GeneratedCard>> {
        let api_key = self.config.api_key.as_deref().ok_or(AiError::NotConfigured)?;

        info!(
            topic = %request.topic,
            count = request.count,
            model = %self.config.model,
            "Requesting flashcards"
        );

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(request),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());

            warn!(status = status.as_u16(), message = %message, "Generation request rejected");
            return Err(AiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AiError::MalformedResponse("no message content".to_string()))?;

        let cards = parse_cards(&content, request.count as usize)?;
        info!(topic = %request.topic, card_count = cards.len(), "Flashcards generated");
        Ok(cards)
    }
}

impl FlashcardGenerator for ChatCompletionsGenerator {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, AiResult<Vec<GeneratedCard>>> {
        self.request_cards(request).boxed()
    }
}

// =============================================================================
// Prompt and response handling
// =============================================================================

fn user_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "Create {} flashcards for a deck titled \"{}\".",
        request.count, request.topic
    );

    if let Some(description) = request.description.as_deref().map(str::trim) {
        if !description.is_empty() {
            prompt.push_str(&format!(" Deck description: {description}"));
        }
    }

    prompt
}

/// Pulls `error.message` out of an error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.error)
        .and_then(|fields| fields.message)
        .filter(|message| !message.trim().is_empty())
}

/// Parses the model's JSON answer into at most `limit` clean cards.
fn parse_cards(content: &str, limit: usize) -> AiResult<Vec<GeneratedCard>> {
    let payload: CardsPayload = serde_json::from_str(content)?;
    let returned = payload.cards.len();

    let mut seen = HashSet::new();
    let cards: Vec<GeneratedCard> = payload
        .cards
        .into_iter()
        .filter_map(|raw| {
            let front = raw.front.trim();
            let back = raw.back.trim();

            let usable = !front.is_empty()
                && !back.is_empty()
                && front.chars().count() <= MAX_CARD_TEXT_LEN
                && back.chars().count() <= MAX_CARD_TEXT_LEN;

            if usable && seen.insert(front.to_lowercase()) {
                Some(GeneratedCard {
                    front: front.to_string(),
                    back: back.to_string(),
                })
            } else {
                None
            }
        })
        .take(limit)
        .collect();

    if cards.is_empty() {
        return Err(AiError::EmptyResult);
    }

    debug!(returned, kept = cards.len(), "Parsed generated cards");
    Ok(cards)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn test_parse_cards_cleans_entries() {
        let content = json!({
            "cards": [
                { "front": " Dog ", "back": " Perro " },
                { "front": "", "back": "nothing" },
                { "front": "dog", "back": "duplicate" },
                { "front": "Cat", "back": "x".repeat(MAX_CARD_TEXT_LEN + 1) },
                { "front": "Bird", "back": "Pájaro" }
            ]
        })
        .to_string();

        let cards = parse_cards(&content, 20).unwrap();
        assert_eq!(
            cards,
            vec![
                GeneratedCard {
                    front: "Dog".into(),
                    back: "Perro".into()
                },
                GeneratedCard {
                    front: "Bird".into(),
                    back: "Pájaro".into()
                },
            ]
        );
    }

    #[test]
    fn test_parse_cards_truncates() {
        let cards: Vec<Value> = (0..30)
            .map(|i| json!({ "front": format!("word {i}"), "back": format!("palabra {i}") }))
            .collect();
        let content = json!({ "cards": cards }).to_string();

        assert_eq!(parse_cards(&content, 20).unwrap().len(), 20);
    }

    #[test]
    fn test_parse_cards_rejects_bad_payloads() {
        assert!(matches!(
            parse_cards("not json", 5),
            Err(AiError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_cards(r#"{"cards": []}"#, 5),
            Err(AiError::EmptyResult)
        ));
        assert!(matches!(
            parse_cards(r#"{"items": []}"#, 5),
            Err(AiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Invalid key"}}"#).as_deref(),
            Some("Invalid key")
        );
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_user_prompt_includes_description() {
        let request = GenerationRequest::new("Spanish", Some(" Food words "), 20);
        let prompt = user_prompt(&request);

        assert!(prompt.contains("Create 20 flashcards"));
        assert!(prompt.contains("\"Spanish\""));
        assert!(prompt.contains("Deck description: Food words"));

        let bare = user_prompt(&GenerationRequest::new("Spanish", None, 5));
        assert!(!bare.contains("description"));
    }

    #[tokio::test]
    async fn test_not_configured_without_key() {
        let generator = ChatCompletionsGenerator::new(AiConfig::default()).unwrap();
        let request = GenerationRequest::new("Spanish", None, 5);

        assert!(matches!(
            generator.generate(&request).await,
            Err(AiError::NotConfigured)
        ));
    }

    /// Serves `router` on an ephemeral port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    #[tokio::test]
    async fn test_generate_round_trip() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer sk-test")
                );
                assert_eq!(body["response_format"]["type"], "json_object");
                assert_eq!(body["model"], "test-model");

                let content = json!({
                    "cards": [
                        { "front": "Hello", "back": "Hola" },
                        { "front": "Goodbye", "back": "Adiós" }
                    ]
                })
                .to_string();
                Json(json!({ "choices": [ { "message": { "content": content } } ] }))
            }),
        );
        let base_url = serve(router).await;

        let config = AiConfig::default()
            .api_key("sk-test")
            .model("test-model")
            .base_url(base_url);
        let generator = ChatCompletionsGenerator::new(config).unwrap();

        let cards = generator
            .generate(&GenerationRequest::new("Spanish", None, 20))
            .await
            .unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].back, "Adiós");
    }

    #[tokio::test]
    async fn test_generate_maps_error_status() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": { "message": "Incorrect API key provided" } })),
                )
            }),
        );
        let base_url = serve(router).await;

        let config = AiConfig::default().api_key("sk-wrong").base_url(base_url);
        let generator = ChatCompletionsGenerator::new(config).unwrap();

        let err = generator
            .generate(&GenerationRequest::new("Spanish", None, 20))
            .await
            .unwrap_err();

        match err {
            AiError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
