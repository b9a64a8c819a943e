//! Shop preferences - Currency symbol and WhatsApp message language.
//!
//! Both are stored as plain strings. When nothing has been saved yet the defaults
//! from `config.toml` apply.

use crate::{
    config::settings::AppConfig,
    core::{order_link::WhatsappLanguage, storage},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

/// Storage key for the currency symbol.
pub const CURRENCY_KEY: &str = "selectedCurrency";
/// Storage key for the WhatsApp message language.
pub const WHATSAPP_LANGUAGE_KEY: &str = "whatsappLanguage";

/// Currency symbol prefixed to every rendered price.
pub async fn currency(db: &DatabaseConnection, config: &AppConfig) -> Result<String> {
    Ok(storage::get_item(db, CURRENCY_KEY)
        .await?
        .filter(|symbol| !symbol.trim().is_empty())
        .unwrap_or_else(|| config.currency.clone()))
}

/// Saves the currency symbol.
///
/// # Errors
/// Returns `Error::Validation` if `symbol` is blank.
pub async fn set_currency(db: &DatabaseConnection, symbol: &str) -> Result<()> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(Error::validation("Currency symbol"));
    }
    storage::set_item(db, CURRENCY_KEY, symbol).await?;
    info!("Currency set to '{}'", symbol);
    Ok(())
}

/// Language used for WhatsApp order messages.
///
/// An unreadable stored value falls back to the configured default.
pub async fn whatsapp_language(
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<WhatsappLanguage> {
    let Some(stored) = storage::get_item(db, WHATSAPP_LANGUAGE_KEY).await? else {
        return Ok(config.whatsapp_language);
    };
    Ok(stored.parse().unwrap_or_else(|_| {
        warn!("Ignoring unknown stored WhatsApp language '{}'", stored);
        config.whatsapp_language
    }))
}

/// Saves the WhatsApp message language.
pub async fn set_whatsapp_language(
    db: &DatabaseConnection,
    language: WhatsappLanguage,
) -> Result<()> {
    storage::set_item(db, WHATSAPP_LANGUAGE_KEY, language.code()).await?;
    info!("WhatsApp language set to '{}'", language);
    Ok(())
}
