//! Core business logic - framework-agnostic draft, rendering and account operations.
//!
//! Nothing in here knows about the command line; the `cli` layer formats the
//! structured results these modules return.

/// Account login and session state
pub mod auth;
/// Cache housekeeping for the local store
pub mod cache;
/// Product draft model
pub mod draft;
/// Persisted draft collection
pub mod draft_store;
/// Optional form field visibility
pub mod field_visibility;
/// WhatsApp order links
pub mod order_link;
/// Currency and WhatsApp language preferences
pub mod preferences;
/// HTML listing renderer
pub mod render;
/// Versioned key-value storage
pub mod storage;
/// Form input validation
pub mod validation;
