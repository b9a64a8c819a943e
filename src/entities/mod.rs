//! Entity module - Contains the SeaORM entity definitions for the database.
//! The local store is a single key-value table; everything else is JSON inside it.

/// Key-value rows backing the local store.
pub mod storage_entry;

pub use storage_entry::{
    Column as StorageEntryColumn, Entity as StorageEntry, Model as StorageEntryModel,
};
