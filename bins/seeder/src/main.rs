//! Database seeder for money book development and testing.
//!
//! Seeds a handful of entries for a fixed demo owner and prints a bearer
//! token for that owner, so the API can be tried right away.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;
use uuid::Uuid;

use moneybook_core::ledger::{CreateEntryInput, EntryKind, LedgerService};
use moneybook_db::LedgerEntryRepository;
use moneybook_shared::{AppConfig, JwtConfig, JwtService, types::OwnerId};

/// Demo owner ID (consistent for all seeds)
const DEMO_OWNER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

/// Demo entries in chronological order: (amount in cents, kind, description).
const DEMO_ENTRIES: &[(i64, EntryKind, &str)] = &[
    (250_000, EntryKind::Income, "Monthly salary"),
    (82_000, EntryKind::Expense, "Rent"),
    (4_550, EntryKind::Expense, "Groceries"),
    (1_299, EntryKind::Expense, "Streaming subscription"),
    (15_000, EntryKind::Income, "Freelance invoice"),
    (3_275, EntryKind::Expense, "Dinner with friends"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    anyhow::ensure!(
        !config.database.url.is_empty(),
        "set DATABASE_URL or MONEYBOOK__DATABASE__URL"
    );

    println!("Connecting to database...");
    let db = moneybook_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let ledger = LedgerService::new(Arc::new(LedgerEntryRepository::new(db)));
    let owner_id = OwnerId::from_uuid(DEMO_OWNER_ID);

    println!("Seeding demo entries...");
    seed_entries(&ledger, owner_id).await?;

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));
    let token = jwt_service
        .generate_access_token(DEMO_OWNER_ID)
        .context("Failed to sign demo token")?;

    println!("Seeding complete!");
    println!();
    println!("Demo owner: {owner_id}");
    println!(
        "Bearer token (valid {} minutes):",
        jwt_service.access_token_expires_in() / 60
    );
    println!("{token}");

    Ok(())
}

/// Seeds demo entries unless the owner already has some.
async fn seed_entries(
    ledger: &LedgerService<LedgerEntryRepository>,
    owner_id: OwnerId,
) -> anyhow::Result<()> {
    if !ledger.list(owner_id).await?.is_empty() {
        println!("  Demo entries already exist, skipping...");
        return Ok(());
    }

    for &(cents, kind, description) in DEMO_ENTRIES {
        let entry = ledger
            .create(
                owner_id,
                CreateEntryInput {
                    amount: Decimal::new(cents, 2),
                    kind,
                    description: description.to_string(),
                },
            )
            .await?;
        println!(
            "  {:<24} {:>8} {:>10}  total {}",
            entry.description, entry.kind, entry.amount, entry.running_total
        );
    }

    Ok(())
}
