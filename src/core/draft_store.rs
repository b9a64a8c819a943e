//! Draft store - The collection of saved product drafts.
//!
//! All drafts live as one JSON array under the `drafts` storage key. Every mutation is a
//! read-modify-write of that whole array, guarded by the entry's version: if another
//! writer saved in between, the mutation is re-applied on top of their data instead of
//! overwriting it. A stored array that no longer parses is treated as empty.

use crate::{
    core::{draft::ProductDraft, storage, validation::check_draft},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::cmp::Reverse;
use tracing::{debug, info, instrument, warn};

/// Storage key holding the draft collection.
pub const DRAFTS_KEY: &str = "drafts";

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DraftStatistics {
    /// Number of drafts in the store
    pub total: usize,
    /// Drafts an admin has marked as reviewed
    pub verified: usize,
    /// Drafts still awaiting review
    pub pending: usize,
}

/// Handle to the persisted draft collection.
///
/// Cheap to clone; all clones share the same database connection.
#[derive(Debug, Clone)]
pub struct DraftStore {
    db: DatabaseConnection,
}

impl DraftStore {
    /// Creates a store backed by `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns every draft in insertion order.
    pub async fn list(&self) -> Result<Vec<ProductDraft>> {
        Ok(self.load().await?.1)
    }

    /// Finds the draft with `id`.
    pub async fn find(&self, id: i64) -> Result<Option<ProductDraft>> {
        Ok(self.list().await?.into_iter().find(|draft| draft.id == id))
    }

    /// Replaces the draft with the same id, or appends it if the id is new.
    ///
    /// Fields the stored draft carried that this version does not model are kept.
    ///
    /// # Errors
    /// Returns `Error::InvalidPrice` if the draft's price is not a positive number and
    /// `Error::Validation` if it breaks another stored-draft invariant.
    #[instrument(skip(self, draft), fields(id = draft.id))]
    pub async fn upsert(&self, draft: ProductDraft) -> Result<ProductDraft> {
        check_draft(&draft)?;

        self.mutate(|drafts| {
            let mut draft = draft.clone();
            if let Some(existing) = drafts.iter_mut().find(|existing| existing.id == draft.id) {
                for (field, value) in &existing.extra {
                    draft
                        .extra
                        .entry(field.clone())
                        .or_insert_with(|| value.clone());
                }
                *existing = draft.clone();
                debug!("Updated draft {}", draft.id);
            } else {
                drafts.push(draft.clone());
                debug!("Added draft {}", draft.id);
            }
            Ok(draft)
        })
        .await
    }

    /// Removes the draft with `id`. Returns whether a draft was removed.
    ///
    /// Removing an id that is not in the store is a no-op.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64) -> Result<bool> {
        self.mutate(|drafts| {
            let before = drafts.len();
            drafts.retain(|draft| draft.id != id);
            Ok(drafts.len() != before)
        })
        .await
    }

    /// Flips the verified flag of the draft with `id` and returns the new value.
    ///
    /// # Errors
    /// Returns `Error::DraftNotFound` if no draft has this id.
    #[instrument(skip(self))]
    pub async fn toggle_verified(&self, id: i64) -> Result<bool> {
        self.mutate(|drafts| {
            let draft = drafts
                .iter_mut()
                .find(|draft| draft.id == id)
                .ok_or(Error::DraftNotFound { id })?;
            draft.verified = !draft.verified;
            Ok(draft.verified)
        })
        .await
    }

    /// Case-insensitive search over name, code, brand, category and description.
    ///
    /// Results are ordered newest first; drafts without a timestamp sort last.
    pub async fn search(&self, term: &str) -> Result<Vec<ProductDraft>> {
        let term = term.trim().to_lowercase();
        let mut matches: Vec<ProductDraft> = self
            .list()
            .await?
            .into_iter()
            .filter(|draft| draft.searchable_text().contains(&term))
            .collect();
        matches.sort_by_key(|draft| Reverse(draft.timestamp));
        Ok(matches)
    }

    /// Totals for the admin dashboard.
    pub async fn statistics(&self) -> Result<DraftStatistics> {
        let drafts = self.list().await?;
        let verified = drafts.iter().filter(|draft| draft.verified).count();
        Ok(DraftStatistics {
            total: drafts.len(),
            verified,
            pending: drafts.len() - verified,
        })
    }

    /// Serializes every draft as a pretty-printed JSON array.
    pub async fn export_all(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list().await?)?)
    }

    /// Merges drafts from an exported JSON array.
    ///
    /// Drafts whose id is already present are skipped, as are repeated ids within the
    /// document, members that are not drafts at all and drafts that break a stored-draft
    /// invariant (see [`check_draft`]). Drafts without a timestamp get the current time.
    ///
    /// # Returns
    /// The number of drafts added.
    ///
    /// # Errors
    /// Returns `Error::ImportFormat` if the document is not a JSON array.
    #[instrument(skip(self, document))]
    pub async fn import_many(&self, document: &str) -> Result<usize> {
        let value: Value = serde_json::from_str(document).map_err(|err| Error::ImportFormat {
            message: err.to_string(),
        })?;
        let Value::Array(members) = value else {
            return Err(Error::ImportFormat {
                message: "Invalid file format".to_string(),
            });
        };

        let candidates: Vec<ProductDraft> = members
            .into_iter()
            .enumerate()
            .filter_map(|(index, member)| {
                let draft: ProductDraft = serde_json::from_value(member)
                    .inspect_err(|err| warn!("Skipping import entry {}: {}", index, err))
                    .ok()?;
                check_draft(&draft)
                    .inspect_err(|err| warn!("Skipping import entry {}: {}", index, err))
                    .ok()?;
                Some(draft)
            })
            .collect();

        let imported = self
            .mutate(|drafts| {
                let now = Utc::now();
                let mut imported = 0;
                for candidate in &candidates {
                    if drafts.iter().any(|draft| draft.id == candidate.id) {
                        continue;
                    }
                    let mut draft = candidate.clone();
                    draft.timestamp.get_or_insert(now);
                    drafts.push(draft);
                    imported += 1;
                }
                Ok(imported)
            })
            .await?;

        info!("Imported {} drafts", imported);
        Ok(imported)
    }

    /// Loads the current collection together with the version it was read at.
    ///
    /// Members are decoded one by one; a member that no longer decodes is dropped
    /// with a warning instead of taking the rest of the collection with it.
    async fn load(&self) -> Result<(Option<i64>, Vec<ProductDraft>)> {
        let Some(entry) = storage::get_entry(&self.db, DRAFTS_KEY).await? else {
            return Ok((None, Vec::new()));
        };
        let members: Vec<Value> = storage::parse_or_default(DRAFTS_KEY, &entry.value);
        let drafts = members
            .into_iter()
            .enumerate()
            .filter_map(|(index, member)| {
                serde_json::from_value(member)
                    .inspect_err(|err| warn!("Dropping unreadable stored draft {}: {}", index, err))
                    .ok()
            })
            .collect();
        Ok((Some(entry.version), drafts))
    }

    /// Applies `change` to a fresh copy of the collection and writes it back.
    ///
    /// Nothing is written when `change` leaves the collection as it was. If another
    /// writer saved in between, `change` is applied again to their version.
    async fn mutate<T, F>(&self, mut change: F) -> Result<T>
    where
        F: FnMut(&mut Vec<ProductDraft>) -> Result<T>,
    {
        for attempt in 1..=storage::MAX_WRITE_ATTEMPTS {
            let (version, original) = self.load().await?;
            let mut drafts = original.clone();
            let outcome = change(&mut drafts)?;

            if drafts == original {
                return Ok(outcome);
            }
            let serialized = serde_json::to_string(&drafts)?;
            if storage::compare_and_set(&self.db, DRAFTS_KEY, version, &serialized).await? {
                return Ok(outcome);
            }
            warn!(
                "Drafts changed while saving (attempt {}/{}), retrying",
                attempt,
                storage::MAX_WRITE_ATTEMPTS
            );
        }
        Err(Error::Conflict {
            key: DRAFTS_KEY.to_string(),
        })
    }
}

/// File name used for draft exports, e.g. `zovatu-products-2024-05-01.json`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("zovatu-products-{}.json", date.format("%Y-%m-%d"))
}
