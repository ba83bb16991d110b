//! # Seed Data Generator
//!
//! Creates a sample vocabulary deck for local development.
//!
//! ## Usage
//! ```bash
//! # Seed ./flashdeck_dev.db for the default sample user
//! cargo run -p flashdeck-db --bin seed
//!
//! # Seed for a specific user (the `sub` of your dev token)
//! cargo run -p flashdeck-db --bin seed -- --user user_2abc
//!
//! # Specify database path
//! cargo run -p flashdeck-db --bin seed -- --db ./data/flashdeck.db
//! ```

use std::env;

use flashdeck_core::{CardInput, DeckInput};
use flashdeck_db::{Database, DbConfig};

const SAMPLE_TITLE: &str = "Sample Vocabulary Deck";
const SAMPLE_DESCRIPTION: &str = "A sample deck for testing purposes";
const SAMPLE_USER: &str = "sample_user_id";

/// Front/back pairs of the sample deck, in study order.
const SAMPLE_CARDS: &[(&str, &str)] = &[
    ("Hello", "Hola"),
    ("Goodbye", "Adiós"),
    ("Thank you", "Gracias"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./flashdeck_dev.db");
    let mut user_id = String::from(SAMPLE_USER);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    user_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Flashdeck Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./flashdeck_dev.db)");
                println!("  -u, --user <ID>    Owner of the sample deck (default: {SAMPLE_USER})");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Flashdeck Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("User:     {}", user_id);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.decks().count_for_user(&user_id).await?;
    if existing > 0 {
        println!("⚠ User already has {} decks", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let deck_draft = DeckInput {
        title: SAMPLE_TITLE.to_string(),
        description: Some(SAMPLE_DESCRIPTION.to_string()),
    }
    .validate()?;

    let deck = db.decks().create(&user_id, &deck_draft).await?;
    let owned = db.decks().authorize(deck.id, &user_id).await?;

    let mut card_drafts = Vec::with_capacity(SAMPLE_CARDS.len());
    for (front, back) in SAMPLE_CARDS {
        let draft = CardInput {
            front: front.to_string(),
            back: back.to_string(),
        }
        .validate()?;
        card_drafts.push(draft);
    }

    let cards = db.cards().create_many(&owned, &card_drafts).await?;

    println!();
    println!("✓ Created deck #{} \"{}\"", deck.id, deck.title);
    for card in &cards {
        println!("  {:>2}. {} → {}", card.order, card.front, card.back);
    }

    db.close().await;
    println!();
    println!("Done.");

    Ok(())
}
