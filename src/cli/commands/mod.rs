//! Command implementations organized by category.

/// Login, logout and credential helpers
pub mod account;

/// Cache housekeeping commands
pub mod cache;

/// Draft administration commands
pub mod drafts;

/// Optional form field visibility commands
pub mod fields;

/// The listing generator
pub mod generate;

/// Currency and WhatsApp language commands
pub mod settings;
