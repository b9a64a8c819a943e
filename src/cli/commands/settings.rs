//! Settings commands - currency symbol and WhatsApp message language.

use crate::{
    cli::AppContext,
    core::{order_link::WhatsappLanguage, preferences},
    errors::Result,
};
use clap::Subcommand;

/// Settings subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsCommand {
    /// Show the current currency and WhatsApp language
    Show,
    /// Set the currency symbol prefixed to prices (e.g. ৳, $, €)
    Currency {
        /// New currency symbol
        symbol: String,
    },
    /// Set the language of WhatsApp order messages (en or bn)
    Language {
        /// `en` or `bn`
        language: WhatsappLanguage,
    },
}

/// Runs a settings subcommand.
pub async fn run(ctx: &AppContext, command: SettingsCommand) -> Result<String> {
    let db = ctx.db();
    match command {
        SettingsCommand::Show => {
            let currency = preferences::currency(db, &ctx.config).await?;
            let language = preferences::whatsapp_language(db, &ctx.config).await?;
            Ok(format!("Currency: {currency}\nWhatsApp language: {language}"))
        }
        SettingsCommand::Currency { symbol } => {
            preferences::set_currency(db, &symbol).await?;
            Ok(format!("✅ Currency set to {}", symbol.trim()))
        }
        SettingsCommand::Language { language } => {
            preferences::set_whatsapp_language(db, language).await?;
            Ok(format!("✅ WhatsApp language set to {language}"))
        }
    }
}
