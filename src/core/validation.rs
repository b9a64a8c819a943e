//! Form validation - Turns raw listing input into a typed [`ProductDraft`].
//!
//! Input arrives as untyped text (command line flags or a saved form). It is checked
//! once here; everything downstream works with a `ProductDraft` that already holds the
//! invariants: required fields present, positive price, well-formed WhatsApp number,
//! absolute image URLs and an offer price below the regular price.

use crate::{
    core::draft::{CustomField, ProductDraft},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Maximum number of image links per listing.
pub const MAX_IMAGES: usize = 5;
/// Maximum number of custom `{key, value}` rows per listing.
pub const MAX_CUSTOM_FIELDS: usize = 10;

#[allow(clippy::expect_used)]
static WHATSAPP_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^8801[0-9]{9}$").expect("valid WhatsApp number pattern"));

/// Raw, unvalidated listing input as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftInput {
    /// Product name
    pub name: String,
    /// Product code
    pub code: String,
    /// Regular price as typed
    pub price: String,
    /// Offer price as typed; empty or `0` means no offer
    pub offer: String,
    /// Unit of sale
    pub unit: String,
    /// Quantity
    pub qty: String,
    /// Brand or company
    pub brand: String,
    /// Size option(s)
    pub size: String,
    /// Color option(s)
    pub color: String,
    /// Delivery time
    pub delivery: String,
    /// Stock status
    pub status: String,
    /// Product category
    pub category: String,
    /// Description
    pub desc: String,
    /// Video link
    pub video: String,
    /// WhatsApp number
    pub wa: String,
    /// Image links in display order
    pub images: Vec<String>,
    /// Extra `{key, value}` rows
    pub custom_fields: Vec<CustomField>,
}

impl From<&ProductDraft> for DraftInput {
    fn from(draft: &ProductDraft) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            name: draft.name.clone(),
            code: draft.code.clone(),
            price: draft.price.to_string(),
            offer: draft.offer.map(|offer| offer.to_string()).unwrap_or_default(),
            unit: text(&draft.unit),
            qty: text(&draft.qty),
            brand: text(&draft.brand),
            size: text(&draft.size),
            color: text(&draft.color),
            delivery: text(&draft.delivery),
            status: text(&draft.status),
            category: text(&draft.category),
            desc: text(&draft.desc),
            video: text(&draft.video),
            wa: draft.wa.clone(),
            images: draft.images.clone(),
            custom_fields: draft.custom_fields.clone(),
        }
    }
}

/// Checks the invariants every stored draft holds, whatever its origin.
///
/// `validate` already guarantees these for drafts built from form input; drafts read
/// from an import file or built in code go through this before reaching the store.
///
/// # Errors
/// Returns `Error::InvalidPrice` for a price that is not a positive number, otherwise
/// `Error::Validation` listing every other problem found.
pub fn check_draft(draft: &ProductDraft) -> Result<()> {
    if !draft.price.is_finite() || draft.price <= 0.0 {
        return Err(Error::InvalidPrice { price: draft.price });
    }

    let mut problems = Vec::new();
    if draft
        .offer
        .is_some_and(|offer| !offer.is_finite() || offer < 0.0 || offer >= draft.price)
    {
        problems.push("Offer price must be less than the main price".to_string());
    }
    if draft.images.is_empty() {
        problems.push("First Image Link".to_string());
    }
    if !is_valid_whatsapp_number(&draft.wa) {
        problems.push("WhatsApp number in correct format (8801XXXXXXXXX)".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation { problems })
    }
}

/// Returns true when `wa` is a Bangladeshi mobile number in international form.
#[must_use]
pub fn is_valid_whatsapp_number(wa: &str) -> bool {
    WHATSAPP_NUMBER.is_match(wa)
}

/// Returns true when `url` parses as an absolute URL.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url).is_ok()
}

fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Validates `input` and builds the draft that will be rendered and saved.
///
/// Every problem is reported at once. Missing required fields are checked first; the
/// format checks only run once all required fields are present, so the user is not
/// told a missing number is also malformed.
///
/// # Errors
/// Returns `Error::Validation` listing every problem found.
pub fn validate(input: &DraftInput, id: i64, now: DateTime<Utc>) -> Result<ProductDraft> {
    let name = input.name.trim();
    let code = input.code.trim();
    let wa = input.wa.trim();
    let price = input
        .price
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0);
    let images: Vec<String> = input
        .images
        .iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect();

    let mut missing = Vec::new();
    if name.is_empty() {
        missing.push("Product Name".to_string());
    }
    if code.is_empty() {
        missing.push("Product Code".to_string());
    }
    if price.is_none() {
        missing.push("Valid Price".to_string());
    }
    if input.images.first().is_none_or(|url| url.trim().is_empty()) {
        missing.push("First Image Link".to_string());
    }
    if wa.is_empty() {
        missing.push("WhatsApp Number".to_string());
    }
    let Some(price) = price else {
        return Err(Error::Validation { problems: missing });
    };
    if !missing.is_empty() {
        return Err(Error::Validation { problems: missing });
    }

    let mut problems = Vec::new();
    if !is_valid_whatsapp_number(wa) {
        problems.push("WhatsApp number in correct format (8801XXXXXXXXX)".to_string());
    }
    for (index, url) in images.iter().enumerate() {
        if !is_valid_url(url) {
            problems.push(format!("Image {} link is not valid", index + 1));
        }
    }
    if images.len() > MAX_IMAGES {
        problems.push(format!("Maximum {MAX_IMAGES} images can be added"));
    }

    let offer = match optional(&input.offer).map(|text| text.parse::<f64>()) {
        None => None,
        Some(Ok(0.0)) => None,
        Some(Ok(offer)) if offer.is_finite() && offer > 0.0 && offer < price => Some(offer),
        Some(Ok(offer)) if offer < 0.0 => {
            problems.push("Offer price must be a positive number".to_string());
            None
        }
        Some(_) => {
            problems.push("Offer price must be less than the main price".to_string());
            None
        }
    };

    let custom_fields: Vec<CustomField> = input
        .custom_fields
        .iter()
        .map(|field| CustomField {
            key: field.key.trim().to_string(),
            value: field.value.trim().to_string(),
        })
        .filter(|field| !field.key.is_empty() && !field.value.is_empty())
        .collect();
    if custom_fields.len() > MAX_CUSTOM_FIELDS {
        problems.push(format!(
            "Maximum {MAX_CUSTOM_FIELDS} custom fields can be added"
        ));
    }

    if !problems.is_empty() {
        return Err(Error::Validation { problems });
    }

    Ok(ProductDraft {
        id,
        timestamp: Some(now),
        name: name.to_string(),
        code: code.to_string(),
        price,
        offer,
        unit: optional(&input.unit),
        qty: optional(&input.qty),
        brand: optional(&input.brand),
        size: optional(&input.size),
        color: optional(&input.color),
        delivery: optional(&input.delivery),
        status: optional(&input.status),
        category: optional(&input.category),
        desc: optional(&input.desc),
        video: optional(&input.video),
        wa: wa.to_string(),
        images,
        custom_fields,
        verified: false,
        extra: serde_json::Map::new(),
    })
}
