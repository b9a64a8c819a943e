//! Account login against per-user credential documents.
//!
//! Each user has a small JSON document, `<username>.json`, either in a local directory
//! or under a base URL. It holds a SHA-256 hash of `username:password` and whether the
//! account is premium. Only premium accounts may log in. The logged-in user is kept in
//! the local store until logout.

use crate::{
    core::storage,
    errors::{Error, Result},
};
use regex::Regex;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::LazyLock,
};
use tracing::{debug, info, instrument, warn};

/// Storage key for the logged-in username.
pub const LOGGED_IN_USER_KEY: &str = "loggedInUser";
/// Storage key for the draft currently opened for editing.
pub const EDIT_DRAFT_ID_KEY: &str = "editDraftId";
/// Storage key for the input of the last successful generate.
pub const LAST_GENERATED_KEY: &str = "lastGeneratedData";

#[allow(clippy::expect_used)]
static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid username pattern"));

/// Contents of a user's credential document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Lowercase hex SHA-256 of `username:password`
    pub password_hash: String,
    /// Only premium accounts may log in
    #[serde(default)]
    pub is_premium: bool,
}

/// Where credential documents are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A local directory containing `<username>.json` files
    Directory(PathBuf),
    /// A base URL serving `<base>/<username>.json`
    Remote(String),
}

impl CredentialSource {
    /// Interprets `location` as a URL when it starts with `http(s)://`, otherwise as a path.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Remote(location.trim_end_matches('/').to_string())
        } else {
            Self::Directory(PathBuf::from(location))
        }
    }

    /// Fetches and parses the credential document for `username`.
    ///
    /// # Errors
    /// Returns `Error::UserNotFound` if no document exists, `Error::Network` if a remote
    /// source could not be reached, or `Error::Json` if the document is malformed.
    #[instrument(skip(self))]
    pub async fn fetch(&self, username: &str) -> Result<UserRecord> {
        let not_found = || Error::UserNotFound {
            username: username.to_string(),
        };

        match self {
            Self::Directory(dir) => {
                let path = dir.join(format!("{username}.json"));
                debug!("Reading credentials from {:?}", path);
                let contents = tokio::fs::read_to_string(&path).await.map_err(|err| {
                    if err.kind() == ErrorKind::NotFound {
                        not_found()
                    } else {
                        Error::Io(err)
                    }
                })?;
                Ok(serde_json::from_str(&contents)?)
            }
            Self::Remote(base) => {
                let url = format!("{base}/{username}.json");
                debug!("Fetching credentials from {}", url);
                let response = reqwest::get(&url).await?;
                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(not_found());
                }
                let response = response.error_for_status()?;
                Ok(response.json().await?)
            }
        }
    }
}

/// Hash stored in credential documents for `username` / `password`.
#[must_use]
pub fn hash_password(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares two byte strings without short-circuiting on the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Checks `username` / `password` against the credential source and records the login.
///
/// # Errors
/// Returns `Error::Validation` for blank or malformed input, `Error::UserNotFound` if the
/// user has no credential document, and `Error::InvalidCredentials` if the password is
/// wrong or the account is not premium.
#[instrument(skip(db, source, password))]
pub async fn login(
    db: &DatabaseConnection,
    source: &CredentialSource,
    username: &str,
    password: &str,
) -> Result<()> {
    let username = username.trim();
    let password = password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::validation("Username and password are required"));
    }
    if !USERNAME.is_match(username) {
        return Err(Error::validation(
            "Username may only contain letters, digits, '.', '_' and '-'",
        ));
    }

    let record = source.fetch(username).await?;
    let expected = record.password_hash.trim().to_ascii_lowercase();
    let actual = hash_password(username, password);
    if !constant_time_eq(expected.as_bytes(), actual.as_bytes()) || !record.is_premium {
        warn!("Rejected login for '{}'", username);
        return Err(Error::InvalidCredentials);
    }

    storage::set_item(db, LOGGED_IN_USER_KEY, username).await?;
    info!("Login successful for '{}'", username);
    Ok(())
}

/// Forgets the logged-in user and any half-finished editing state.
pub async fn logout(db: &DatabaseConnection) -> Result<()> {
    for key in [LOGGED_IN_USER_KEY, EDIT_DRAFT_ID_KEY, LAST_GENERATED_KEY] {
        storage::remove_item(db, key).await?;
    }
    info!("Logout successful");
    Ok(())
}

/// The logged-in username, if any.
pub async fn current_user(db: &DatabaseConnection) -> Result<Option<String>> {
    storage::get_item(db, LOGGED_IN_USER_KEY).await
}

/// The logged-in username.
///
/// # Errors
/// Returns `Error::NotLoggedIn` if nobody is logged in.
pub async fn require_login(db: &DatabaseConnection) -> Result<String> {
    current_user(db).await?.ok_or(Error::NotLoggedIn)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use tempfile::TempDir;

    fn write_user(dir: &TempDir, username: &str, password: &str, is_premium: bool) {
        let record = UserRecord {
            password_hash: hash_password(username, password),
            is_premium,
        };
        std::fs::write(
            dir.path().join(format!("{username}.json")),
            serde_json::to_string(&record).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_hash_password_is_stable_and_salted_by_username() {
        let hash = hash_password("rahim", "secret");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_password("rahim", "secret"));
        assert_ne!(hash, hash_password("karim", "secret"));
    }

    #[test]
    fn test_credential_source_parse() {
        assert_eq!(
            CredentialSource::parse("https://shop.example.com/users/"),
            CredentialSource::Remote("https://shop.example.com/users".to_string())
        );
        assert_eq!(
            CredentialSource::parse("users"),
            CredentialSource::Directory(PathBuf::from("users"))
        );
    }

    #[tokio::test]
    async fn test_login_and_logout() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = TempDir::new()?;
        write_user(&dir, "rahim", "secret", true);
        let source = CredentialSource::Directory(dir.path().to_path_buf());

        assert!(matches!(require_login(&db).await, Err(Error::NotLoggedIn)));

        login(&db, &source, " rahim ", "secret").await?;
        assert_eq!(require_login(&db).await?, "rahim");

        storage::set_item(&db, LAST_GENERATED_KEY, "{}").await?;
        logout(&db).await?;
        assert_eq!(current_user(&db).await?, None);
        assert_eq!(storage::get_item(&db, LAST_GENERATED_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_rejections() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = TempDir::new()?;
        write_user(&dir, "rahim", "secret", true);
        write_user(&dir, "karim", "secret", false);
        let source = CredentialSource::Directory(dir.path().to_path_buf());

        assert!(matches!(
            login(&db, &source, "rahim", "wrong").await,
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            login(&db, &source, "karim", "secret").await,
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            login(&db, &source, "nobody", "secret").await,
            Err(Error::UserNotFound { .. })
        ));
        assert!(matches!(
            login(&db, &source, "../etc/passwd", "secret").await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            login(&db, &source, "", "").await,
            Err(Error::Validation { .. })
        ));
        assert_eq!(current_user(&db).await?, None);
        Ok(())
    }
}
