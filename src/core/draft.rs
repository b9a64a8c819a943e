//! Product draft model - The single record type persisted by the draft store.
//!
//! Drafts are serialized with camelCase field names so exported files keep the shape
//! shop owners already have on disk. Deserialization is lenient about how numbers were
//! written: older exports stored `id`, `price` and `offer` as strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A `{key, value}` pair shown as an extra row in the listing (e.g. "Warranty: 6 Months").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    /// Row title
    pub key: String,
    /// Row value
    pub value: String,
}

/// A saved, possibly re-edited product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    /// Creation time in milliseconds since the epoch, unique within the store
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    /// When the draft was created or last regenerated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Product name
    #[serde(default)]
    pub name: String,
    /// Shop-specific product code
    #[serde(default)]
    pub code: String,
    /// Regular price, always positive
    #[serde(deserialize_with = "lenient::number")]
    pub price: f64,
    /// Discounted price, strictly below `price` when present
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub offer: Option<f64>,
    /// Unit of sale (e.g. pcs, kg)
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<String>,
    /// Quantity available or per pack
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub qty: Option<String>,
    /// Brand or company
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub brand: Option<String>,
    /// Size option(s)
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<String>,
    /// Color option(s)
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
    /// Delivery time
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery: Option<String>,
    /// Stock status (e.g. In Stock)
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    /// Product category
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    /// Free-text description
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub desc: Option<String>,
    /// Video link; only YouTube links are embedded
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub video: Option<String>,
    /// WhatsApp number orders are sent to (`8801XXXXXXXXX`)
    #[serde(default)]
    pub wa: String,
    /// Image URLs, the first one is the main image
    #[serde(default)]
    pub images: Vec<String>,
    /// Extra rows rendered under the standard attributes
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    /// Set by an admin once the listing has been reviewed
    #[serde(default)]
    pub verified: bool,
    /// Fields this version does not know about, kept so imports round-trip
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProductDraft {
    /// Discount in whole percent, `0` when there is no offer price.
    #[must_use]
    pub fn discount_percent(&self) -> i64 {
        match self.active_offer() {
            #[allow(clippy::cast_possible_truncation)]
            Some(offer) if self.price > 0.0 => {
                ((self.price - offer) / self.price * 100.0).round() as i64
            }
            _ => 0,
        }
    }

    /// The offer price, if there is a real one. A zero offer means "no offer".
    #[must_use]
    pub fn active_offer(&self) -> Option<f64> {
        self.offer.filter(|offer| *offer > 0.0)
    }

    /// The price a customer actually pays.
    #[must_use]
    pub fn effective_price(&self) -> f64 {
        self.active_offer().unwrap_or(self.price)
    }

    /// The main (first) image, if any.
    #[must_use]
    pub fn main_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Lowercased text the admin search matches against.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        [
            Some(self.name.as_str()),
            Some(self.code.as_str()),
            self.brand.as_deref(),
            self.category.as_deref(),
            self.desc.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }
}

/// Deserializers that accept both the typed and the string-typed spelling of a value.
mod lenient {
    use serde::{Deserialize, Deserializer, de::Error as _};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub(super) fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Int(value) => Ok(value),
            #[allow(clippy::cast_possible_truncation)]
            NumberOrText::Float(value) if value.fract() == 0.0 => Ok(value as i64),
            NumberOrText::Float(value) => Err(D::Error::custom(format!("invalid id {value}"))),
            NumberOrText::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid id '{text}'"))),
        }
    }

    fn finite<E: serde::de::Error>(text: &str) -> Result<f64, E> {
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| E::custom(format!("invalid number '{text}'")))
    }

    pub(super) fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match NumberOrText::deserialize(deserializer)? {
            #[allow(clippy::cast_precision_loss)]
            NumberOrText::Int(value) => Ok(value as f64),
            NumberOrText::Float(value) => Ok(value),
            NumberOrText::Text(text) => finite(&text),
        }
    }

    pub(super) fn optional_number<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(None),
            #[allow(clippy::cast_precision_loss)]
            Some(NumberOrText::Int(value)) => Ok(Some(value as f64)),
            Some(NumberOrText::Float(value)) => Ok(Some(value)),
            Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(NumberOrText::Text(text)) => finite(&text).map(Some),
        }
    }

    pub(super) fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()))
    }
}
