//! Unified error type for the listing generator.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation problems are
//! collected into a single variant so the CLI can report all of them at once.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more input fields were missing or malformed.
    #[error("Please provide valid input: {}", problems.join(", "))]
    Validation {
        /// Human readable description of each problem found
        problems: Vec<String>,
    },

    /// Price was zero, negative or not a finite number.
    #[error("Invalid price: {price}")]
    InvalidPrice {
        /// The rejected price
        price: f64,
    },

    /// No draft with the requested id exists in the store.
    #[error("Product not found: {id}")]
    DraftNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// A storage entry kept changing underneath a read-modify-write.
    #[error("Storage entry '{key}' was modified concurrently, please retry")]
    Conflict {
        /// Storage key that could not be updated
        key: String,
    },

    /// No credential document exists for the user.
    #[error("User not found: {username}")]
    UserNotFound {
        /// The username that was looked up
        username: String,
    },

    /// Password did not match or the account is not premium.
    #[error("Invalid credentials or user is not premium")]
    InvalidCredentials,

    /// An operation that needs a logged-in user was attempted without one.
    #[error("You are not logged in")]
    NotLoggedIn,

    /// Fetching a remote document failed.
    #[error("Network error: {message}")]
    Network {
        /// Transport level failure description
        message: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading configuration
        message: String,
    },

    /// An import document did not have the expected shape.
    #[error("Error importing file: {message}")]
    ImportFormat {
        /// Why the document was rejected
        message: String,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Network {
            message: value.to_string(),
        }
    }
}

impl Error {
    /// Builds a validation error from a single problem description.
    pub fn validation(problem: impl Into<String>) -> Self {
        Self::Validation {
            problems: vec![problem.into()],
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
