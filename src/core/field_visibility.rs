//! Field visibility - Which optional form fields are shown.
//!
//! A pure presentation toggle: hiding a field does not remove its data from drafts that
//! already have it, and the renderer never consults it.

use crate::{
    core::storage,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage key for the visibility map.
pub const FIELD_VISIBILITY_KEY: &str = "fieldVisibility";

/// Fields every listing must have; they are always shown.
pub const MANDATORY_FIELDS: [(&str, &str); 5] = [
    ("name", "Product Name"),
    ("code", "Product Code"),
    ("price", "Price"),
    ("wa", "WhatsApp Number"),
    ("images", "Image Link"),
];

/// Fields the shop owner may hide from the form.
pub const OPTIONAL_FIELDS: [(&str, &str); 12] = [
    ("offer", "Offer Price (Optional)"),
    ("unit", "Unit (e.g., pcs, kg)"),
    ("qty", "Quantity (Qty)"),
    ("brand", "Brand / Company"),
    ("size", "Size Option"),
    ("color", "Color Option"),
    ("delivery", "Delivery Time"),
    ("status", "Status"),
    ("category", "Category"),
    ("desc", "Product Description"),
    ("video", "Video Link (YouTube)"),
    ("customFields", "Custom Info"),
];

/// Map from optional field name to whether it is shown. Missing entries are shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldVisibility(BTreeMap<String, bool>);

impl FieldVisibility {
    /// Loads the saved map; unreadable data counts as "everything visible".
    pub async fn load(db: &DatabaseConnection) -> Result<Self> {
        storage::get_json(db, FIELD_VISIBILITY_KEY).await
    }

    /// Persists the map.
    pub async fn save(&self, db: &DatabaseConnection) -> Result<()> {
        storage::set_json(db, FIELD_VISIBILITY_KEY, self).await
    }

    /// Whether `field` should be shown on the form.
    #[must_use]
    pub fn is_visible(&self, field: &str) -> bool {
        self.0.get(field).copied().unwrap_or(true)
    }

    /// Shows or hides an optional field.
    ///
    /// # Errors
    /// Returns `Error::Validation` for mandatory or unknown fields.
    pub fn set(&mut self, field: &str, visible: bool) -> Result<()> {
        if MANDATORY_FIELDS.iter().any(|(key, _)| *key == field) {
            return Err(Error::validation(format!(
                "'{field}' is mandatory and cannot be hidden"
            )));
        }
        if !OPTIONAL_FIELDS.iter().any(|(key, _)| *key == field) {
            return Err(Error::validation(format!("'{field}' is not a known field")));
        }
        self.0.insert(field.to_string(), visible);
        Ok(())
    }

    /// Optional fields paired with their label and current visibility, in form order.
    #[must_use]
    pub fn optional_fields(&self) -> Vec<(&'static str, &'static str, bool)> {
        OPTIONAL_FIELDS
            .iter()
            .map(|(key, label)| (*key, *label, self.is_visible(key)))
            .collect()
    }
}
