//! Storage entry entity - Key-value rows backing the local store.
//!
//! Each row holds one JSON (or plain string) value under a unique key, the same way
//! browser local storage would. The whole draft collection lives in a single row.
//! `version` is bumped on every write so concurrent writers can detect each other.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Storage entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_entries")]
pub struct Model {
    /// Storage key (e.g., `"drafts"`, `"selectedCurrency"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Stored value, serialized as text
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// Write counter used for optimistic concurrency, starts at 1
    pub version: i64,
    /// When this entry was last written
    pub updated_at: DateTime,
}

/// Storage entries have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
