//! WhatsApp order links.
//!
//! A listing's "Order Now" button opens `wa.me` with a pre-filled message naming the
//! product, its price and code. The message text depends on the configured language.

use crate::{core::draft::ProductDraft, errors::Error};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Language of the pre-filled order message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhatsappLanguage {
    /// English
    En,
    /// Bangla
    #[default]
    Bn,
}

impl WhatsappLanguage {
    /// Storage / config code for the language.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Bn => "bn",
        }
    }
}

impl fmt::Display for WhatsappLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for WhatsappLanguage {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "bn" => Ok(Self::Bn),
            other => Err(Error::validation(format!(
                "WhatsApp language 'en' or 'bn' (got '{other}')"
            ))),
        }
    }
}

/// Builds the plain-text order message.
#[must_use]
pub fn order_message(draft: &ProductDraft, currency: &str, language: WhatsappLanguage) -> String {
    let price = draft.effective_price();
    let (intro, product, price_label, code, category, delivery) = match language {
        WhatsappLanguage::En => (
            "I want to order a product",
            "Product",
            "Price",
            "Code",
            "Category",
            "Delivery",
        ),
        WhatsappLanguage::Bn => (
            "আমি একটি পণ্য অর্ডার করতে চাই",
            "প্রোডাক্ট",
            "মূল্য",
            "কোড",
            "ক্যাটাগরি",
            "ডেলিভারি",
        ),
    };

    let mut message = format!(
        "{intro}\n{product}: {}\n{price_label}: {currency}{price}\n{code}: {}",
        draft.name, draft.code
    );
    if let Some(value) = &draft.category {
        message.push_str(&format!("\n{category}: {value}"));
    }
    if let Some(value) = &draft.delivery {
        message.push_str(&format!("\n{delivery}: {value}"));
    }
    message
}

/// Percent-encodes `text` the way `encodeURIComponent` does.
///
/// `urlencoding` also escapes `!'()*`, which `wa.me` links have always carried verbatim.
#[must_use]
pub fn encode_uri_component(text: &str) -> String {
    urlencoding::encode(text)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

/// Full `wa.me` link with the encoded order message.
#[must_use]
pub fn order_url(draft: &ProductDraft, currency: &str, language: WhatsappLanguage) -> String {
    format!(
        "https://wa.me/{}?text={}",
        draft.wa,
        encode_uri_component(&order_message(draft, currency, language))
    )
}
