//! Draft administration commands - list, inspect, verify, delete, export and import.
//!
//! Every command here requires a logged-in user.

use crate::{
    cli::{AppContext, commands::generate::forget_pending_edit},
    core::{
        auth,
        draft::ProductDraft,
        draft_store::export_file_name,
        order_link::order_url,
        preferences,
        render::{format_price, render},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use clap::Subcommand;
use std::path::PathBuf;
use tracing::info;

/// Draft administration subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DraftsCommand {
    /// List drafts with review statistics
    List {
        /// Only show drafts whose name, code, brand, category or description match
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a draft's saved fields and order link
    Show {
        /// Draft id
        id: i64,
    },
    /// Print (or write) the HTML of a saved draft
    Render {
        /// Draft id
        id: i64,
        /// Write the HTML to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Toggle a draft's verified mark
    Verify {
        /// Draft id
        id: i64,
    },
    /// Delete a draft
    Delete {
        /// Draft id
        id: i64,
    },
    /// Export every draft to `zovatu-products-<date>.json`
    Export {
        /// Directory the export file is written to
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Merge drafts from an exported file, skipping ids already present
    Import {
        /// Exported JSON file to read
        file: PathBuf,
    },
}

/// Runs a drafts subcommand.
pub async fn run(ctx: &AppContext, command: DraftsCommand) -> Result<String> {
    auth::require_login(ctx.db()).await?;

    match command {
        DraftsCommand::List { search } => list(ctx, search.as_deref()).await,
        DraftsCommand::Show { id } => show(ctx, id).await,
        DraftsCommand::Render { id, output } => render_saved(ctx, id, output).await,
        DraftsCommand::Verify { id } => {
            let verified = ctx.store.toggle_verified(id).await?;
            Ok(if verified {
                format!("✅ Draft {id} marked as verified.")
            } else {
                format!("Draft {id} marked as pending.")
            })
        }
        DraftsCommand::Delete { id } => {
            if ctx.store.remove(id).await? {
                forget_pending_edit(ctx, id).await?;
                Ok(format!("✅ Draft {id} deleted."))
            } else {
                Ok(format!("No draft with id {id}; nothing deleted."))
            }
        }
        DraftsCommand::Export { dir } => export(ctx, dir).await,
        DraftsCommand::Import { file } => {
            let document = tokio::fs::read_to_string(&file).await?;
            let count = ctx.store.import_many(&document).await?;
            Ok(format!("✅ Imported {count} drafts from {}.", file.display()))
        }
    }
}

async fn find(ctx: &AppContext, id: i64) -> Result<ProductDraft> {
    ctx.store.find(id).await?.ok_or(Error::DraftNotFound { id })
}

async fn list(ctx: &AppContext, search: Option<&str>) -> Result<String> {
    let stats = ctx.store.statistics().await?;
    let drafts = ctx.store.search(search.unwrap_or_default()).await?;
    let currency = preferences::currency(ctx.db(), &ctx.config).await?;

    let header = format!(
        "Total: {}  Verified: {}  Pending: {}",
        stats.total, stats.verified, stats.pending
    );
    if drafts.is_empty() {
        return Ok(format!("{header}\nNo drafts found."));
    }

    let rows: Vec<String> = drafts
        .iter()
        .map(|draft| {
            let mark = if draft.verified { "✅" } else { "⏳" };
            format!(
                "{mark} {} | {} ({}) | {currency}{}",
                draft.id,
                draft.name,
                draft.code,
                format_price(draft.effective_price())
            )
        })
        .collect();
    Ok(format!("{header}\n{}", rows.join("\n")))
}

async fn show(ctx: &AppContext, id: i64) -> Result<String> {
    let draft = find(ctx, id).await?;
    let currency = preferences::currency(ctx.db(), &ctx.config).await?;
    let language = preferences::whatsapp_language(ctx.db(), &ctx.config).await?;

    Ok(format!(
        "{}\n\nOrder link: {}",
        serde_json::to_string_pretty(&draft)?,
        order_url(&draft, &currency, language)
    ))
}

async fn render_saved(ctx: &AppContext, id: i64, output: Option<PathBuf>) -> Result<String> {
    let draft = find(ctx, id).await?;
    let currency = preferences::currency(ctx.db(), &ctx.config).await?;
    let language = preferences::whatsapp_language(ctx.db(), &ctx.config).await?;
    let html = render(&draft, &currency, language);

    match output {
        Some(path) => {
            tokio::fs::write(&path, &html).await?;
            Ok(format!("✅ HTML for draft {id} written to {}", path.display()))
        }
        None => Ok(html),
    }
}

async fn export(ctx: &AppContext, dir: PathBuf) -> Result<String> {
    let document = ctx.store.export_all().await?;
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(export_file_name(Utc::now().date_naive()));
    tokio::fs::write(&path, document).await?;
    info!("Exported drafts to {:?}", path);
    Ok(format!("✅ Drafts exported to {}", path.display()))
}
