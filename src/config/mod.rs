/// Database configuration and connection management
pub mod database;

/// Application settings loading from config.toml
pub mod settings;

/// Credential source configuration from environment variables
pub mod users;
