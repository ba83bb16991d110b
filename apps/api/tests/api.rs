//! HTTP tests driving the router in-process.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use flashdeck_ai::{AiError, AiResult, FlashcardGenerator, GenerationRequest};
use flashdeck_api::{build_router, ApiConfig, AppState, JwtVerifier};
use flashdeck_core::{GeneratedCard, AI_GENERATION_FEATURE};
use flashdeck_db::{Database, DbConfig};

// =============================================================================
// Harness
// =============================================================================

/// Returns canned cards and counts how often it was asked.
struct StubGenerator {
    cards: Vec<GeneratedCard>,
    calls: AtomicUsize,
}

impl StubGenerator {
    fn new(pairs: &[(&str, &str)]) -> Self {
        StubGenerator {
            cards: pairs
                .iter()
                .map(|(front, back)| GeneratedCard {
                    front: front.to_string(),
                    back: back.to_string(),
                })
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl FlashcardGenerator for StubGenerator {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, AiResult<Vec<GeneratedCard>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let cards: Vec<GeneratedCard> = self
            .cards
            .iter()
            .take(request.count as usize)
            .cloned()
            .collect();

        async move {
            if cards.is_empty() {
                Err(AiError::EmptyResult)
            } else {
                Ok(cards)
            }
        }
        .boxed()
    }
}

struct TestApp {
    router: Router,
    jwt: JwtVerifier,
    generator: Arc<StubGenerator>,
}

const SECRET: &str = "test-secret";

impl TestApp {
    async fn new() -> Self {
        Self::with_generator(StubGenerator::new(&[
            ("Hello", "Hola"),
            ("Goodbye", "Adiós"),
            ("Thank you", "Gracias"),
        ]))
        .await
    }

    async fn with_generator(generator: StubGenerator) -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ApiConfig {
            jwt_secret: SECRET.to_string(),
            ..ApiConfig::default()
        };
        let generator = Arc::new(generator);
        let state = AppState::new(db, config, generator.clone());

        TestApp {
            router: build_router(state),
            jwt: JwtVerifier::new(SECRET),
            generator,
        }
    }

    fn token(&self, user_id: &str) -> String {
        self.jwt.issue(user_id, &[], Duration::hours(1)).unwrap()
    }

    fn premium_token(&self, user_id: &str) -> String {
        self.jwt
            .issue(user_id, &[AI_GENERATION_FEATURE], Duration::hours(1))
            .unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create_deck(&self, token: &str, title: &str, description: Option<&str>) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/decks",
                Some(token),
                Some(json!({ "title": title, "description": description })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn add_card(&self, token: &str, deck_id: i64, front: &str, back: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                &format!("/decks/{deck_id}/cards"),
                Some(token),
                Some(json!({ "front": front, "back": back })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    async fn action(&self, token: &str, session_id: &str, body: Value) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                &format!("/study/{session_id}/actions"),
                Some(token),
                Some(body),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }
}

// =============================================================================
// Health & Auth
// =============================================================================

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_missing_or_bad_token_is_401() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/decks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app
        .send(Method::GET, "/decks", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = JwtVerifier::new("other-secret")
        .issue("alice", &[], Duration::hours(1))
        .unwrap();
    let (status, _) = app.send(Method::GET, "/decks", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Decks & Cards
// =============================================================================

#[tokio::test]
async fn test_deck_and_card_lifecycle() {
    let app = TestApp::new().await;
    let alice = app.token("alice");

    let deck_id = app
        .create_deck(&alice, "  Spanish Basics ", Some("Everyday words"))
        .await;

    let first = app.add_card(&alice, deck_id, "Hello", "Hola").await;
    let second = app.add_card(&alice, deck_id, "Goodbye", "Adiós").await;
    assert_eq!(first["order"], 0);
    assert_eq!(second["order"], 1);

    let (status, list) = app.send(Method::GET, "/decks", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["title"], "Spanish Basics");
    assert_eq!(list[0]["card_count"], 2);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/cards/{}", first["id"]),
            Some(&alice),
            Some(json!({ "front": "Hi", "back": "Hola" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, reordered) = app
        .send(
            Method::PUT,
            &format!("/decks/{deck_id}/cards/order"),
            Some(&alice),
            Some(json!({ "card_ids": [second["id"], first["id"]] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reordered[0]["front"], "Goodbye");
    assert_eq!(reordered[1]["front"], "Hi");

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/cards/{}", second["id"]),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, detail) = app
        .send(Method::GET, &format!("/decks/{deck_id}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["cards"].as_array().unwrap().len(), 1);
    assert_eq!(detail["can_generate"], false);

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/decks/{deck_id}/cards"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = app
        .send(Method::DELETE, &format!("/decks/{deck_id}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(Method::GET, &format!("/decks/{deck_id}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_are_per_field() {
    let app = TestApp::new().await;
    let alice = app.token("alice");

    let (status, body) = app
        .send(
            Method::POST,
            "/decks",
            Some(&alice),
            Some(json!({ "title": "   ", "description": "x".repeat(1001) })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["description"].is_array());

    let deck_id = app.create_deck(&alice, "Deck", None).await;
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/cards"),
            Some(&alice),
            Some(json!({ "front": "", "back": "" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["front"].is_array());
    assert!(body["errors"]["back"].is_array());
}

#[tokio::test]
async fn test_wrong_typed_body_is_a_field_error() {
    let app = TestApp::new().await;
    let alice = app.token("alice");
    let deck_id = app.create_deck(&alice, "Deck", None).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/cards"),
            Some(&alice),
            Some(json!({ "front": 5, "back": "x" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["front"][0]
        .as_str()
        .unwrap()
        .contains("invalid type"));

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/decks/{deck_id}/cards/order"),
            Some(&alice),
            Some(json!({ "card_ids": "all" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["card_ids"].is_array());
}

#[tokio::test]
async fn test_unknown_study_action_is_json_error() {
    let app = TestApp::new().await;
    let alice = app.token("alice");
    let deck_id = app.create_deck(&alice, "Deck", None).await;
    app.add_card(&alice, deck_id, "Hello", "Hola").await;

    let (_, started) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/study"),
            Some(&alice),
            None,
        )
        .await;
    let sid = started["session_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/study/{sid}/actions"),
            Some(&alice),
            Some(json!({ "action": "skip" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["_form"].is_array());

    // The session is untouched
    let (status, view) = app
        .send(Method::GET, &format!("/study/{sid}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["position"], 0);
}

#[tokio::test]
async fn test_malformed_path_params_are_json_errors() {
    let app = TestApp::new().await;
    let alice = app.token("alice");

    for uri in ["/study/not-a-uuid", "/decks/abc"] {
        let (status, body) = app.send(Method::GET, uri, Some(&alice), None).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(body["code"], "VALIDATION_ERROR", "{uri}");
        assert!(body["errors"].is_object(), "{uri}");
    }
}

#[tokio::test]
async fn test_other_users_cannot_touch_deck() {
    let app = TestApp::new().await;
    let alice = app.token("alice");
    let bob = app.token("bob");

    let deck_id = app.create_deck(&alice, "Private", Some("mine")).await;
    let card = app.add_card(&alice, deck_id, "Q", "A").await;
    let card_uri = format!("/cards/{}", card["id"]);
    let deck_uri = format!("/decks/{deck_id}");

    let attempts = [
        (Method::GET, deck_uri.clone(), None),
        (Method::PUT, deck_uri.clone(), Some(json!({ "title": "Mine now" }))),
        (Method::DELETE, deck_uri.clone(), None),
        (
            Method::POST,
            format!("{deck_uri}/cards"),
            Some(json!({ "front": "x", "back": "y" })),
        ),
        (Method::DELETE, format!("{deck_uri}/cards"), None),
        (Method::POST, format!("{deck_uri}/study"), None),
        (
            Method::PUT,
            card_uri.clone(),
            Some(json!({ "front": "x", "back": "y" })),
        ),
        (Method::DELETE, card_uri.clone(), None),
    ];

    for (method, uri, body) in attempts {
        let (status, json) = app.send(method.clone(), &uri, Some(&bob), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(json["code"], "NOT_FOUND_OR_FORBIDDEN");
    }

    let (_, list) = app.send(Method::GET, "/decks", Some(&bob), None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, detail) = app.send(Method::GET, &deck_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Private");
    assert_eq!(detail["cards"][0]["front"], "Q");
}

#[tokio::test]
async fn test_foreign_deck_reported_before_validation() {
    let app = TestApp::new().await;
    let alice = app.token("alice");
    let bob = app.token("bob");
    let deck_id = app.create_deck(&alice, "Private", None).await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/decks/{deck_id}"),
            Some(&bob),
            Some(json!({ "title": "" })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "Deck not found or you don't have permission to edit this deck."
    );
}

// =============================================================================
// Generation
// =============================================================================

#[tokio::test]
async fn test_generation_requires_entitlement() {
    let app = TestApp::new().await;
    let alice = app.token("alice");
    let deck_id = app.create_deck(&alice, "Spanish", Some("Greetings")).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/generate"),
            Some(&alice),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FEATURE_REQUIRED");
    assert_eq!(app.generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generation_requires_description() {
    let app = TestApp::new().await;
    let alice = app.premium_token("alice");
    let deck_id = app.create_deck(&alice, "Spanish", None).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/generate"),
            Some(&alice),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["description"].is_array());
    assert_eq!(app.generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generation_appends_after_existing_cards() {
    let app = TestApp::new().await;
    let alice = app.premium_token("alice");
    let deck_id = app.create_deck(&alice, "Spanish", Some("Greetings")).await;
    app.add_card(&alice, deck_id, "Yes", "Sí").await;

    let (_, detail) = app
        .send(Method::GET, &format!("/decks/{deck_id}"), Some(&alice), None)
        .await;
    assert_eq!(detail["can_generate"], true);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/generate"),
            Some(&alice),
            Some(json!({ "count": 2 })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["total_generated"], 2);
    assert_eq!(body["cards"][0]["front"], "Hello");
    assert_eq!(body["cards"][0]["order"], 1);
    assert_eq!(body["cards"][1]["order"], 2);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/generate"),
            Some(&alice),
            Some(json!({ "count": 51 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_generation_failure_is_502() {
    let app = TestApp::with_generator(StubGenerator::new(&[])).await;
    let alice = app.premium_token("alice");
    let deck_id = app.create_deck(&alice, "Spanish", Some("Greetings")).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/generate"),
            Some(&alice),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "GENERATION_FAILED");

    let (_, detail) = app
        .send(Method::GET, &format!("/decks/{deck_id}"), Some(&alice), None)
        .await;
    assert!(detail["cards"].as_array().unwrap().is_empty());
}

// =============================================================================
// Study
// =============================================================================

#[tokio::test]
async fn test_study_empty_deck_is_rejected() {
    let app = TestApp::new().await;
    let alice = app.token("alice");
    let deck_id = app.create_deck(&alice, "Empty", None).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/study"),
            Some(&alice),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_full_study_flow() {
    let app = TestApp::new().await;
    let alice = app.token("alice");
    let deck_id = app.create_deck(&alice, "Spanish", None).await;
    app.add_card(&alice, deck_id, "Hello", "Hola").await;
    app.add_card(&alice, deck_id, "Goodbye", "Adiós").await;

    let (status, started) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/study"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(started["deck_title"], "Spanish");
    assert_eq!(started["front"], "Hello");
    assert_eq!(started["back"], Value::Null);
    assert_eq!(started["total"], 2);
    let sid = started["session_id"].as_str().unwrap().to_string();

    // Judging an unrevealed card is refused
    let body = app.action(&alice, &sid, json!({ "action": "correct" })).await;
    assert_eq!(body["applied"], false);
    assert_eq!(body["position"], 0);

    let body = app.action(&alice, &sid, json!({ "action": "reveal" })).await;
    assert_eq!(body["back"], "Hola");
    assert_eq!(body["can_judge"], true);

    let body = app.action(&alice, &sid, json!({ "action": "incorrect" })).await;
    assert_eq!(body["applied"], true);
    assert_eq!(body["front"], "Goodbye");
    assert_eq!(body["total"], 3);
    assert_eq!(body["retry_count"], 1);

    let body = app.action(&alice, &sid, json!({ "input": "toggle" })).await;
    assert_eq!(body["revealed"], true);

    let body = app.action(&alice, &sid, json!({ "action": "correct" })).await;
    assert_eq!(body["front"], "Hello");
    assert_eq!(body["reviewing_retries"], true);
    assert_eq!(body["studied_count"], 1);

    app.action(&alice, &sid, json!({ "action": "reveal" })).await;
    let body = app.action(&alice, &sid, json!({ "action": "correct" })).await;
    assert_eq!(body["is_complete"], true);
    assert_eq!(body["remaining_count"], 0);
    assert_eq!(body["progress_percent"], 100);

    // Someone else can't see or end the session
    let bob = app.token("bob");
    let (status, _) = app
        .send(Method::GET, &format!("/study/{sid}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(Method::DELETE, &format!("/study/{sid}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deck_id"], deck_id);

    let (status, _) = app
        .send(Method::GET, &format!("/study/{sid}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_study_session_is_a_snapshot() {
    let app = TestApp::new().await;
    let alice = app.token("alice");
    let deck_id = app.create_deck(&alice, "Spanish", None).await;
    let card = app.add_card(&alice, deck_id, "Hello", "Hola").await;

    let (_, started) = app
        .send(
            Method::POST,
            &format!("/decks/{deck_id}/study"),
            Some(&alice),
            None,
        )
        .await;
    let sid = started["session_id"].as_str().unwrap().to_string();

    app.send(
        Method::PUT,
        &format!("/cards/{}", card["id"]),
        Some(&alice),
        Some(json!({ "front": "Hi", "back": "Hola" })),
    )
    .await;

    let (status, view) = app
        .send(Method::GET, &format!("/study/{sid}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["front"], "Hello");
}
