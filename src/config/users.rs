//! Credential source configuration.
//!
//! Credential documents normally live where `config.toml` says, but deployments can
//! point somewhere else with the `ZOVATU_USERS` environment variable (loaded from
//! `.env` like everything else).

use crate::config::settings::AppConfig;
use crate::core::auth::CredentialSource;

/// Environment variable overriding `users_source` from config.toml.
pub const USERS_SOURCE_VAR: &str = "ZOVATU_USERS";

/// Resolves where credential documents are read from.
///
/// # Returns
///
/// The source named by `ZOVATU_USERS` if it is set and non-empty, otherwise the one
/// from the application settings.
#[must_use]
pub fn credential_source(config: &AppConfig) -> CredentialSource {
    resolve_credential_source(config, std::env::var(USERS_SOURCE_VAR).ok())
}

/// Picks `override_location` when it is non-blank, otherwise `users_source` from config.
#[must_use]
pub fn resolve_credential_source(
    config: &AppConfig,
    override_location: Option<String>,
) -> CredentialSource {
    let location = override_location
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.users_source.clone());
    CredentialSource::parse(&location)
}
