//! Shared test utilities for Zovatu.
//!
//! This module provides common helper functions for setting up test databases
//! and building listings with sensible defaults.

use crate::{
    cli::AppContext,
    config::settings::AppConfig,
    core::{
        auth::{CredentialSource, LOGGED_IN_USER_KEY},
        draft::{CustomField, ProductDraft},
        draft_store::DraftStore,
        storage,
        validation::DraftInput,
    },
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a draft store backed by a fresh in-memory database.
pub async fn setup_test_store() -> Result<DraftStore> {
    Ok(DraftStore::new(setup_test_db().await?))
}

/// Creates a command context with default settings and a fresh database.
///
/// Credentials are looked up in a directory that does not exist; tests needing a
/// logged-in user call [`log_in`].
pub async fn setup_test_context() -> Result<AppContext> {
    Ok(AppContext::new(
        setup_test_store().await?,
        AppConfig::default(),
        CredentialSource::Directory("nonexistent-users".into()),
    ))
}

/// Marks `tester` as logged in without going through the credential source.
pub async fn log_in(ctx: &AppContext) -> Result<()> {
    storage::set_item(ctx.db(), LOGGED_IN_USER_KEY, "tester").await
}

/// Routes `tracing` output through the test harness so it shows up on failure.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Fixed creation time used by [`sample_draft`].
#[allow(clippy::unwrap_used)]
pub fn sample_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 5, 10, 0, 0).unwrap()
}

/// Form input for a valid listing.
///
/// # Defaults
/// * name: "Cotton Shirt", code: "CS-01"
/// * price: "1000", offer: "750"
/// * two images, one custom field, no size
pub fn sample_input() -> DraftInput {
    DraftInput {
        name: "Cotton Shirt".to_string(),
        code: "CS-01".to_string(),
        price: "1000".to_string(),
        offer: "750".to_string(),
        brand: "Zovatu".to_string(),
        category: "Clothing".to_string(),
        desc: "Soft cotton".to_string(),
        wa: "8801712345678".to_string(),
        images: vec![
            "https://example.com/front.jpg".to_string(),
            "https://example.com/back.jpg".to_string(),
        ],
        custom_fields: vec![CustomField {
            key: "Warranty".to_string(),
            value: "6 Months".to_string(),
        }],
        ..DraftInput::default()
    }
}

/// The saved draft [`sample_input`] validates to, with the given id.
pub fn sample_draft(id: i64) -> ProductDraft {
    ProductDraft {
        id,
        timestamp: Some(sample_timestamp()),
        name: "Cotton Shirt".to_string(),
        code: "CS-01".to_string(),
        price: 1000.0,
        offer: Some(750.0),
        unit: None,
        qty: None,
        brand: Some("Zovatu".to_string()),
        size: None,
        color: None,
        delivery: None,
        status: None,
        category: Some("Clothing".to_string()),
        desc: Some("Soft cotton".to_string()),
        video: None,
        wa: "8801712345678".to_string(),
        images: vec![
            "https://example.com/front.jpg".to_string(),
            "https://example.com/back.jpg".to_string(),
        ],
        custom_fields: vec![CustomField {
            key: "Warranty".to_string(),
            value: "6 Months".to_string(),
        }],
        verified: false,
        extra: serde_json::Map::new(),
    }
}
