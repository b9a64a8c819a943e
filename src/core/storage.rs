//! Key-value storage - The local store every other component persists through.
//!
//! Values are plain text, usually JSON. Each entry carries a version counter that is
//! bumped on every write; [`compare_and_set`] only writes when the caller saw the
//! latest version, which lets independent processes share one database without
//! silently overwriting each other.

use crate::{
    entities::{StorageEntry, storage_entry},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*, sea_query::Expr};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace, warn};

/// How many times a read-modify-write is retried after losing a race.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Retrieves the full entry (value and version) stored under `key`.
pub async fn get_entry(db: &DatabaseConnection, key: &str) -> Result<Option<storage_entry::Model>> {
    StorageEntry::find_by_id(key.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the raw value stored under `key`.
pub async fn get_item(db: &DatabaseConnection, key: &str) -> Result<Option<String>> {
    Ok(get_entry(db, key).await?.map(|entry| entry.value))
}

/// Retrieves every entry, ordered by key.
pub async fn all_entries(db: &DatabaseConnection) -> Result<Vec<storage_entry::Model>> {
    StorageEntry::find()
        .order_by_asc(storage_entry::Column::Key)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Writes `value` under `key` only if the entry is still at `expected_version`.
///
/// `expected_version` is `None` when the caller saw no entry at all; the write then
/// only succeeds if nobody created the entry in the meantime.
///
/// # Returns
/// * `Ok(true)` - The value was written and the version bumped
/// * `Ok(false)` - Another writer got there first; nothing was written
#[instrument(skip(db, value))]
pub async fn compare_and_set(
    db: &DatabaseConnection,
    key: &str,
    expected_version: Option<i64>,
    value: &str,
) -> Result<bool> {
    let now = chrono::Utc::now().naive_utc();

    let Some(version) = expected_version else {
        let entry = storage_entry::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            version: Set(1),
            updated_at: Set(now),
        };
        return match StorageEntry::insert(entry).exec_without_returning(db).await {
            Ok(_) => Ok(true),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!("Entry '{}' was created concurrently", key);
                Ok(false)
            }
            Err(err) => Err(err.into()),
        };
    };

    let result = StorageEntry::update_many()
        .col_expr(storage_entry::Column::Value, Expr::value(value.to_string()))
        .col_expr(storage_entry::Column::Version, Expr::value(version + 1))
        .col_expr(storage_entry::Column::UpdatedAt, Expr::value(now))
        .filter(storage_entry::Column::Key.eq(key))
        .filter(storage_entry::Column::Version.eq(version))
        .exec(db)
        .await?;

    trace!(rows = result.rows_affected, "compare_and_set on '{}'", key);
    Ok(result.rows_affected == 1)
}

/// Unconditionally stores `value` under `key`, retrying if another writer interleaves.
///
/// # Errors
/// Returns `Error::Conflict` if the entry changed on every attempt.
pub async fn set_item(db: &DatabaseConnection, key: &str, value: &str) -> Result<()> {
    for _ in 0..MAX_WRITE_ATTEMPTS {
        let version = get_entry(db, key).await?.map(|entry| entry.version);
        if compare_and_set(db, key, version, value).await? {
            return Ok(());
        }
    }
    Err(Error::Conflict {
        key: key.to_string(),
    })
}

/// Removes the entry stored under `key`. Returns whether an entry existed.
pub async fn remove_item(db: &DatabaseConnection, key: &str) -> Result<bool> {
    let result = StorageEntry::delete_by_id(key.to_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Reads a JSON value, falling back to `T::default()` when it is missing or malformed.
///
/// Malformed data is logged but never surfaced; the caller simply sees the default.
pub async fn get_json<T>(db: &DatabaseConnection, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    Ok(get_item(db, key)
        .await?
        .map(|raw| parse_or_default(key, &raw))
        .unwrap_or_default())
}

/// Serializes `value` as JSON and stores it under `key`.
pub async fn set_json<T: Serialize>(db: &DatabaseConnection, key: &str, value: &T) -> Result<()> {
    set_item(db, key, &serde_json::to_string(value)?).await
}

/// Parses `raw`, substituting the default for malformed data.
pub(crate) fn parse_or_default<T>(key: &str, raw: &str) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!("Ignoring malformed value stored under '{}': {}", key, err);
        T::default()
    })
}
