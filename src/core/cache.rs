//! Cache housekeeping for the local store.
//!
//! Besides drafts and preferences, the store accumulates scratch entries (previews,
//! search and validation caches, temp data). This module recognises those by key,
//! reports how much space they take and removes them. Protected keys are never
//! removed even when their names look like cache keys.

use crate::{core::storage, errors::Result};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument};

/// Names of known scratch entries.
const CACHE_KEYS: [&str; 20] = [
    "tempProductData",
    "formValidationCache",
    "searchCache",
    "imagePreviewCache",
    "sessionTempData",
    "browserCache",
    "formAutoSave",
    "tempSettings",
    "previewCache",
    "exportTempData",
    "importTempData",
    "validationErrors",
    "tempUserPreferences",
    "scrollPositions",
    "modalStates",
    "tooltipCache",
    "animationStates",
    "tempThemeData",
    "debugLogs",
    "performanceMetrics",
];

/// Entries that hold user data and must survive a cache clear.
const PROTECTED_KEYS: [&str; 15] = [
    "drafts",
    "selectedCurrency",
    "whatsappLanguage",
    "fieldVisibility",
    "savedProducts",
    "userSettings",
    "currency",
    "whatsappLang",
    "language",
    "loggedInUser",
    "adminSettings",
    "productDrafts",
    "customFields",
    "shopSettings",
    "userPreferences",
];

/// Cache share above which an automatic cleanup runs.
const CLEANUP_PERCENTAGE: u64 = 30;
/// Number of cache entries above which an automatic cleanup runs.
const CLEANUP_ITEMS: usize = 50;

/// Whether `key` names a disposable cache entry.
#[must_use]
pub fn is_cache_key(key: &str) -> bool {
    CACHE_KEYS.iter().any(|cache_key| key.contains(cache_key))
        || key.starts_with("temp_")
        || key.starts_with("cache_")
        || key.contains("_temp")
        || key.contains("_cache")
}

/// Whether `key` must never be cleared.
#[must_use]
pub fn is_protected_key(key: &str) -> bool {
    PROTECTED_KEYS.contains(&key)
}

/// Storage usage broken down into cache and total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Bytes used by cache entries (key plus value)
    pub cache_bytes: u64,
    /// Number of cache entries
    pub cache_items: usize,
    /// Bytes used by every entry
    pub total_bytes: u64,
    /// Number of entries in the store
    pub total_items: usize,
    /// Cache share of the total, rounded to a whole percent
    pub cache_percentage: u64,
}

impl CacheStats {
    /// Whether an automatic cleanup is warranted.
    #[must_use]
    pub const fn needs_cleanup(&self) -> bool {
        self.cache_percentage > CLEANUP_PERCENTAGE || self.cache_items > CLEANUP_ITEMS
    }
}

/// What a cleanup removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearReport {
    /// Number of entries removed
    pub cleared_items: usize,
    /// Bytes freed (key plus value)
    pub cleared_bytes: u64,
}

fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

/// Measures current storage usage.
pub async fn stats(db: &DatabaseConnection) -> Result<CacheStats> {
    let mut stats = CacheStats::default();
    for entry in storage::all_entries(db).await? {
        let size = entry_size(&entry.key, &entry.value);
        stats.total_bytes += size;
        stats.total_items += 1;
        if is_cache_key(&entry.key) {
            stats.cache_bytes += size;
            stats.cache_items += 1;
        }
    }
    if stats.total_bytes > 0 {
        stats.cache_percentage =
            (stats.cache_bytes * 100 + stats.total_bytes / 2) / stats.total_bytes;
    }
    Ok(stats)
}

/// Removes every unprotected cache entry.
#[instrument(skip(db))]
pub async fn clear(db: &DatabaseConnection) -> Result<ClearReport> {
    let mut report = ClearReport::default();
    for entry in storage::all_entries(db).await? {
        if !is_cache_key(&entry.key) || is_protected_key(&entry.key) {
            continue;
        }
        if storage::remove_item(db, &entry.key).await? {
            debug!("Removed cache entry '{}'", entry.key);
            report.cleared_items += 1;
            report.cleared_bytes += entry_size(&entry.key, &entry.value);
        }
    }
    info!(
        "Successfully cleared {} cache items ({})",
        report.cleared_items,
        format_bytes(report.cleared_bytes)
    );
    Ok(report)
}

/// Clears the cache only when [`CacheStats::needs_cleanup`] says so.
///
/// # Returns
/// `Some(report)` if a cleanup ran, `None` if none was needed.
pub async fn auto_cleanup(db: &DatabaseConnection) -> Result<Option<ClearReport>> {
    if stats(db).await?.needs_cleanup() {
        clear(db).await.map(Some)
    } else {
        debug!("No cache cleanup needed");
        Ok(None)
    }
}

/// Human readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
