//! Field visibility commands - which optional inputs the form offers.

use crate::{cli::AppContext, core::field_visibility::FieldVisibility, errors::Result};
use clap::Subcommand;

/// Field visibility subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FieldsCommand {
    /// List optional fields and whether each is shown
    Show,
    /// Hide an optional field
    Hide {
        /// Field name, e.g. `video` or `customFields`
        field: String,
    },
    /// Show a hidden optional field again
    ShowField {
        /// Field name, e.g. `video` or `customFields`
        field: String,
    },
}

/// Runs a fields subcommand.
pub async fn run(ctx: &AppContext, command: FieldsCommand) -> Result<String> {
    let db = ctx.db();
    let mut visibility = FieldVisibility::load(db).await?;

    match command {
        FieldsCommand::Show => Ok(visibility
            .optional_fields()
            .into_iter()
            .map(|(key, label, shown)| {
                let mark = if shown { "👁" } else { "🚫" };
                format!("{mark} {key:<13} {label}")
            })
            .collect::<Vec<_>>()
            .join("\n")),
        FieldsCommand::Hide { field } => {
            visibility.set(&field, false)?;
            visibility.save(db).await?;
            Ok(format!("✅ '{field}' hidden."))
        }
        FieldsCommand::ShowField { field } => {
            visibility.set(&field, true)?;
            visibility.save(db).await?;
            Ok(format!("✅ '{field}' shown."))
        }
    }
}
