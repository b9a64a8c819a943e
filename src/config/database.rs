//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`. Tables
//! are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. Creation is
//! idempotent: an existing database file is opened as-is.

use crate::entities::StorageEntry;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::debug;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/zovatu.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable.
///
/// Falls back to a local `SQLite` file under `data/` if not set.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Creates the parent directory of a file-backed `SQLite` URL if it does not exist yet.
pub async fn ensure_database_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        debug!("Ensuring database directory {:?} exists", parent);
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    ensure_database_dir(database_url).await?;
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary tables from the entity definitions, skipping existing ones.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut storage_table = schema.create_table_from_entity(StorageEntry);
    storage_table.if_not_exists();

    db.execute(builder.build(&storage_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StorageEntryModel;
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<StorageEntryModel> = StorageEntry::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_file_database_directory_is_created() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("zovatu.sqlite");
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let db = create_connection(&url).await?;
        create_tables(&db).await?;
        assert!(path.exists());
        Ok(())
    }
}
