//! Cache commands - storage usage and scratch-data cleanup.

use crate::{
    cli::AppContext,
    core::cache::{self, format_bytes},
    errors::Result,
};
use clap::Subcommand;

/// Cache subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCommand {
    /// Show how much of the store is cache
    Stats,
    /// Remove every cache entry (drafts and settings are kept)
    Clear,
    /// Clear the cache only if it has grown too large
    Auto,
}

/// Runs a cache subcommand.
pub async fn run(ctx: &AppContext, command: CacheCommand) -> Result<String> {
    let db = ctx.db();
    match command {
        CacheCommand::Stats => {
            let stats = cache::stats(db).await?;
            Ok(format!(
                "Cache: {} in {} items ({}% of {} in {} items){}",
                format_bytes(stats.cache_bytes),
                stats.cache_items,
                stats.cache_percentage,
                format_bytes(stats.total_bytes),
                stats.total_items,
                if stats.needs_cleanup() {
                    "\nCleanup recommended: run `zovatu cache clear`."
                } else {
                    ""
                }
            ))
        }
        CacheCommand::Clear => {
            let report = cache::clear(db).await?;
            Ok(format!(
                "✅ Cleared {} cache items ({}).",
                report.cleared_items,
                format_bytes(report.cleared_bytes)
            ))
        }
        CacheCommand::Auto => Ok(match cache::auto_cleanup(db).await? {
            Some(report) => format!(
                "✅ Cleared {} cache items ({}).",
                report.cleared_items,
                format_bytes(report.cleared_bytes)
            ),
            None => "No cleanup needed.".to_string(),
        }),
    }
}
