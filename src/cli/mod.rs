//! CLI layer - Command-line interface and command handlers
//!
//! This module provides the terminal interface for Zovatu: argument parsing with
//! `clap`, the shared command context, and dispatch to the command handlers. Handlers
//! return the text to show the user; `main` prints it.

/// Command implementations (account, generate, drafts, settings, fields, cache)
pub mod commands;

use crate::{
    config::settings::AppConfig,
    core::{auth::CredentialSource, draft_store::DraftStore},
    errors::Result,
};
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use tracing::instrument;

pub use commands::{
    cache::CacheCommand, drafts::DraftsCommand, fields::FieldsCommand, generate::GenerateArgs,
    settings::SettingsCommand,
};

/// Product listing generator for small online shops
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with a premium account
    Login {
        /// Account name, matching `<username>.json` in the credential source
        #[arg(short, long)]
        username: String,
        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and forget any half-finished edit
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Print the credential hash for a new user document
    HashPassword {
        /// Account name the hash is salted with
        #[arg(short, long)]
        username: String,
        /// Password to hash
        #[arg(short, long)]
        password: String,
    },
    /// Validate a listing, render its HTML and save it as a draft
    Generate(GenerateArgs),
    /// Manage saved drafts
    Drafts {
        /// Subcommand to run
        #[command(subcommand)]
        command: DraftsCommand,
    },
    /// Currency and WhatsApp language
    Settings {
        /// Subcommand to run
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Show or hide optional form fields
    Fields {
        /// Subcommand to run
        #[command(subcommand)]
        command: FieldsCommand,
    },
    /// Inspect or clear cached scratch data
    Cache {
        /// Subcommand to run
        #[command(subcommand)]
        command: CacheCommand,
    },
}

/// Shared data available to all commands.
/// This structure holds the draft store (and through it the database connection)
/// together with the loaded settings.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Draft store for all listing operations
    pub store: DraftStore,
    /// Settings from config.toml
    pub config: AppConfig,
    /// Where credential documents are read from
    pub users: CredentialSource,
}

impl AppContext {
    /// Creates a new `AppContext` instance.
    #[must_use]
    pub const fn new(store: DraftStore, config: AppConfig, users: CredentialSource) -> Self {
        Self {
            store,
            config,
            users,
        }
    }

    /// The underlying database connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        self.store.connection()
    }
}

/// Runs one parsed command and returns the text to print.
#[instrument(skip(ctx))]
pub async fn run(ctx: &AppContext, command: Commands) -> Result<String> {
    use crate::cli::commands::{account, cache, drafts, fields, generate, settings};

    match command {
        Commands::Login { username, password } => {
            account::login(ctx, &username, &password).await
        }
        Commands::Logout => account::logout(ctx).await,
        Commands::Whoami => account::whoami(ctx).await,
        Commands::HashPassword { username, password } => {
            Ok(account::hash_password(&username, &password))
        }
        Commands::Generate(args) => generate::generate(ctx, args).await,
        Commands::Drafts { command } => drafts::run(ctx, command).await,
        Commands::Settings { command } => settings::run(ctx, command).await,
        Commands::Fields { command } => fields::run(ctx, command).await,
        Commands::Cache { command } => cache::run(ctx, command).await,
    }
}
