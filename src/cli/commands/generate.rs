//! The listing generator - `generate`.
//!
//! Turns form input given as flags into a validated draft, renders its HTML and saves
//! it. Re-editing a saved draft (`--edit <id>`) starts from that draft's values, so only
//! the flags that change something need to be passed. An edit that fails validation
//! stays pending and is resumed by the next `generate` until it succeeds or `--new` is
//! given.

use crate::{
    cli::AppContext,
    core::{
        auth::{self, EDIT_DRAFT_ID_KEY, LAST_GENERATED_KEY},
        draft::{CustomField, ProductDraft},
        preferences,
        render::render,
        storage,
        validation::{DraftInput, validate},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Listing fields, one flag per form input.
#[derive(Args, Debug, Clone, Default)]
pub struct ListingFlags {
    /// Product name
    #[arg(long)]
    pub name: Option<String>,
    /// Shop-specific product code
    #[arg(long)]
    pub code: Option<String>,
    /// Regular price
    #[arg(long)]
    pub price: Option<String>,
    /// Discounted price, below the regular price
    #[arg(long)]
    pub offer: Option<String>,
    /// Unit of sale (e.g. pcs, kg)
    #[arg(long)]
    pub unit: Option<String>,
    /// Quantity
    #[arg(long)]
    pub qty: Option<String>,
    /// Brand or company
    #[arg(long)]
    pub brand: Option<String>,
    /// Size option(s)
    #[arg(long)]
    pub size: Option<String>,
    /// Color option(s)
    #[arg(long)]
    pub color: Option<String>,
    /// Delivery time
    #[arg(long)]
    pub delivery: Option<String>,
    /// Stock status
    #[arg(long)]
    pub status: Option<String>,
    /// Product category
    #[arg(long)]
    pub category: Option<String>,
    /// Product description
    #[arg(long)]
    pub desc: Option<String>,
    /// YouTube link to embed
    #[arg(long)]
    pub video: Option<String>,
    /// WhatsApp number orders go to (8801XXXXXXXXX)
    #[arg(long)]
    pub wa: Option<String>,
    /// Image link; repeat for up to five images, the first is the main image
    #[arg(long = "image")]
    pub images: Vec<String>,
    /// Extra row as `key=value`; repeat for up to ten rows
    #[arg(long = "field", value_parser = parse_custom_field)]
    pub fields: Vec<CustomField>,
    /// Remove all custom rows
    #[arg(long, conflicts_with = "fields")]
    pub no_fields: bool,
}

impl ListingFlags {
    /// Applies the flags on top of `base`.
    ///
    /// A flag that was not given keeps the value from `base`; a flag given with an
    /// empty value clears it. Image and custom field lists replace the base lists
    /// when given; `--no-fields` clears the custom fields.
    #[must_use]
    pub fn apply_to(self, base: DraftInput) -> DraftInput {
        DraftInput {
            name: self.name.unwrap_or(base.name),
            code: self.code.unwrap_or(base.code),
            price: self.price.unwrap_or(base.price),
            offer: self.offer.unwrap_or(base.offer),
            unit: self.unit.unwrap_or(base.unit),
            qty: self.qty.unwrap_or(base.qty),
            brand: self.brand.unwrap_or(base.brand),
            size: self.size.unwrap_or(base.size),
            color: self.color.unwrap_or(base.color),
            delivery: self.delivery.unwrap_or(base.delivery),
            status: self.status.unwrap_or(base.status),
            category: self.category.unwrap_or(base.category),
            desc: self.desc.unwrap_or(base.desc),
            video: self.video.unwrap_or(base.video),
            wa: self.wa.unwrap_or(base.wa),
            images: if self.images.is_empty() {
                base.images
            } else {
                self.images
            },
            custom_fields: if self.no_fields {
                Vec::new()
            } else if self.fields.is_empty() {
                base.custom_fields
            } else {
                self.fields
            },
        }
    }

    /// Converts the flags into form input; absent flags become empty fields.
    #[must_use]
    pub fn into_input(self) -> DraftInput {
        self.apply_to(DraftInput::default())
    }
}

/// Arguments of the `generate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Listing field values
    #[command(flatten)]
    pub input: ListingFlags,
    /// Re-edit the saved draft with this id, keeping its id
    #[arg(long, conflicts_with = "new")]
    pub edit: Option<i64>,
    /// Fill missing fields from the last successful generate
    #[arg(long)]
    pub from_last: bool,
    /// Abandon a pending edit and create a new draft
    #[arg(long)]
    pub new: bool,
    /// Write the HTML to this file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_custom_field(raw: &str) -> std::result::Result<CustomField, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    Ok(CustomField {
        key: key.trim().to_string(),
        value: value.trim().to_string(),
    })
}

/// The draft an earlier, unfinished `generate --edit` left behind.
///
/// A pending id that is unreadable or names a draft that no longer exists is dropped.
async fn pending_edit(ctx: &AppContext) -> Result<Option<ProductDraft>> {
    let Some(raw) = storage::get_item(ctx.db(), EDIT_DRAFT_ID_KEY).await? else {
        return Ok(None);
    };
    let draft = match raw.trim().parse() {
        Ok(id) => ctx.store.find(id).await?,
        Err(_) => None,
    };
    if draft.is_none() {
        warn!("Discarding stale pending edit id '{}'", raw);
        storage::remove_item(ctx.db(), EDIT_DRAFT_ID_KEY).await?;
    }
    Ok(draft)
}

/// Forgets the pending edit if it points at draft `id`.
pub async fn forget_pending_edit(ctx: &AppContext, id: i64) -> Result<()> {
    let pending = storage::get_item(ctx.db(), EDIT_DRAFT_ID_KEY).await?;
    if pending.is_some_and(|raw| raw.trim().parse::<i64>().ok() == Some(id)) {
        debug!("Clearing pending edit of draft {}", id);
        storage::remove_item(ctx.db(), EDIT_DRAFT_ID_KEY).await?;
    }
    Ok(())
}

/// A fresh id based on the current time, bumped past any id already in use.
async fn new_draft_id(ctx: &AppContext, now_millis: i64) -> Result<i64> {
    let taken: Vec<i64> = ctx.store.list().await?.iter().map(|draft| draft.id).collect();
    let mut id = now_millis;
    while taken.contains(&id) {
        id += 1;
    }
    Ok(id)
}

/// Validates, renders and saves a listing.
///
/// # Returns
/// The rendered HTML, or a confirmation naming the file it was written to.
#[instrument(skip(ctx, args), fields(edit = ?args.edit))]
pub async fn generate(ctx: &AppContext, args: GenerateArgs) -> Result<String> {
    let db = ctx.db();
    auth::require_login(db).await?;

    if args.new {
        storage::remove_item(db, EDIT_DRAFT_ID_KEY).await?;
    }
    let editing = match args.edit {
        Some(id) => {
            let draft = ctx
                .store
                .find(id)
                .await?
                .ok_or(Error::DraftNotFound { id })?;
            storage::set_item(db, EDIT_DRAFT_ID_KEY, &id.to_string()).await?;
            Some(draft)
        }
        None if args.new => None,
        None => pending_edit(ctx).await?,
    };
    let edit_id = editing.as_ref().map(|draft| draft.id);

    let input = if let Some(base) = &editing {
        debug!("Editing draft {}", base.id);
        args.input.apply_to(DraftInput::from(base))
    } else if args.from_last {
        let last: DraftInput = storage::get_json(db, LAST_GENERATED_KEY).await?;
        args.input.apply_to(last)
    } else {
        args.input.into_input()
    };

    let now = Utc::now();
    let id = match edit_id {
        Some(id) => id,
        None => new_draft_id(ctx, now.timestamp_millis()).await?,
    };
    let draft = validate(&input, id, now)?;

    let currency = preferences::currency(db, &ctx.config).await?;
    let language = preferences::whatsapp_language(db, &ctx.config).await?;
    let draft = ctx.store.upsert(draft).await?;
    let html = render(&draft, &currency, language);

    storage::set_json(db, LAST_GENERATED_KEY, &input).await?;
    if edit_id.is_some() {
        storage::remove_item(db, EDIT_DRAFT_ID_KEY).await?;
    }
    info!("Generated listing for draft {}", draft.id);

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, &html).await?;
            Ok(format!(
                "✅ Draft {} saved. HTML written to {}",
                draft.id,
                path.display()
            ))
        }
        None => Ok(html),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{init_test_tracing, log_in, sample_input, setup_test_context};

    fn sample_flags() -> ListingFlags {
        let input = sample_input();
        ListingFlags {
            name: Some(input.name),
            code: Some(input.code),
            price: Some(input.price),
            offer: Some(input.offer),
            brand: Some(input.brand),
            category: Some(input.category),
            desc: Some(input.desc),
            wa: Some(input.wa),
            images: input.images,
            fields: input.custom_fields,
            ..ListingFlags::default()
        }
    }

    #[test]
    fn test_parse_custom_field() {
        let field = parse_custom_field("Warranty = 6 Months").unwrap();
        assert_eq!(field.key, "Warranty");
        assert_eq!(field.value, "6 Months");
        assert!(parse_custom_field("no separator").is_err());
    }

    #[tokio::test]
    async fn test_generate_requires_login() -> Result<()> {
        let ctx = setup_test_context().await?;
        let args = GenerateArgs {
            input: sample_flags(),
            ..GenerateArgs::default()
        };
        assert!(matches!(
            generate(&ctx, args).await,
            Err(Error::NotLoggedIn)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_saves_draft_and_returns_html() -> Result<()> {
        init_test_tracing();
        let ctx = setup_test_context().await?;
        log_in(&ctx).await?;

        let html = generate(
            &ctx,
            GenerateArgs {
                input: sample_flags(),
                ..GenerateArgs::default()
            },
        )
        .await?;
        assert!(html.contains("Cotton Shirt"));

        let drafts = ctx.store.list().await?;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].offer, Some(750.0));

        let last: DraftInput = storage::get_json(ctx.db(), LAST_GENERATED_KEY).await?;
        assert_eq!(last, sample_input());
        Ok(())
    }

    #[tokio::test]
    async fn test_validation_failure_saves_nothing() -> Result<()> {
        let ctx = setup_test_context().await?;
        log_in(&ctx).await?;

        let args = GenerateArgs {
            input: ListingFlags {
                wa: Some("017".to_string()),
                ..sample_flags()
            },
            ..GenerateArgs::default()
        };
        assert!(matches!(
            generate(&ctx, args).await,
            Err(Error::Validation { .. })
        ));
        assert!(ctx.store.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_keeps_id_and_unchanged_fields() -> Result<()> {
        let ctx = setup_test_context().await?;
        log_in(&ctx).await?;

        generate(
            &ctx,
            GenerateArgs {
                input: sample_flags(),
                ..GenerateArgs::default()
            },
        )
        .await?;
        let id = ctx.store.list().await?[0].id;
        ctx.store.toggle_verified(id).await?;

        generate(
            &ctx,
            GenerateArgs {
                input: ListingFlags {
                    price: Some("1200".to_string()),
                    ..ListingFlags::default()
                },
                edit: Some(id),
                ..GenerateArgs::default()
            },
        )
        .await?;

        let drafts = ctx.store.list().await?;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, id);
        assert_eq!(drafts[0].price, 1200.0);
        assert_eq!(drafts[0].name, "Cotton Shirt");
        assert!(!drafts[0].verified);
        assert_eq!(storage::get_item(ctx.db(), EDIT_DRAFT_ID_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_edit_stays_pending_until_new() -> Result<()> {
        let ctx = setup_test_context().await?;
        log_in(&ctx).await?;
        generate(
            &ctx,
            GenerateArgs {
                input: sample_flags(),
                ..GenerateArgs::default()
            },
        )
        .await?;
        let id = ctx.store.list().await?[0].id;

        let bad_edit = GenerateArgs {
            input: ListingFlags {
                offer: Some("5000".to_string()),
                ..ListingFlags::default()
            },
            edit: Some(id),
            ..GenerateArgs::default()
        };
        assert!(generate(&ctx, bad_edit).await.is_err());
        assert_eq!(pending_edit(&ctx).await?.map(|draft| draft.id), Some(id));

        // Resumes the pending edit.
        generate(
            &ctx,
            GenerateArgs {
                input: ListingFlags {
                    offer: Some("900".to_string()),
                    ..ListingFlags::default()
                },
                ..GenerateArgs::default()
            },
        )
        .await?;
        assert_eq!(ctx.store.list().await?.len(), 1);
        assert_eq!(ctx.store.find(id).await?.unwrap().offer, Some(900.0));

        // --new starts over.
        generate(
            &ctx,
            GenerateArgs {
                input: sample_flags(),
                new: true,
                ..GenerateArgs::default()
            },
        )
        .await?;
        assert_eq!(ctx.store.list().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_from_last_fills_missing_fields() -> Result<()> {
        let ctx = setup_test_context().await?;
        log_in(&ctx).await?;
        generate(
            &ctx,
            GenerateArgs {
                input: sample_flags(),
                ..GenerateArgs::default()
            },
        )
        .await?;

        generate(
            &ctx,
            GenerateArgs {
                input: ListingFlags {
                    code: Some("CS-02".to_string()),
                    ..ListingFlags::default()
                },
                from_last: true,
                ..GenerateArgs::default()
            },
        )
        .await?;

        let drafts = ctx.store.list().await?;
        assert_eq!(drafts.len(), 2);
        assert_ne!(drafts[0].id, drafts[1].id);
        assert_eq!(drafts[1].code, "CS-02");
        assert_eq!(drafts[1].name, "Cotton Shirt");
        Ok(())
    }

    #[tokio::test]
    async fn test_output_file() -> Result<()> {
        let ctx = setup_test_context().await?;
        log_in(&ctx).await?;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("listing.html");

        let message = generate(
            &ctx,
            GenerateArgs {
                input: sample_flags(),
                output: Some(path.clone()),
                ..GenerateArgs::default()
            },
        )
        .await?;
        assert!(message.starts_with("✅ Draft"));
        assert!(std::fs::read_to_string(&path)?.contains("changeMainImage"));
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_unknown_id_leaves_no_pending_edit() -> Result<()> {
        let ctx = setup_test_context().await?;
        log_in(&ctx).await?;

        let result = generate(
            &ctx,
            GenerateArgs {
                edit: Some(999),
                ..GenerateArgs::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::DraftNotFound { id: 999 })));
        assert_eq!(storage::get_item(ctx.db(), EDIT_DRAFT_ID_KEY).await?, None);

        generate(
            &ctx,
            GenerateArgs {
                input: sample_flags(),
                ..GenerateArgs::default()
            },
        )
        .await?;
        assert_eq!(ctx.store.list().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_dangling_pending_edit_is_dropped() -> Result<()> {
        let ctx = setup_test_context().await?;
        log_in(&ctx).await?;
        storage::set_item(ctx.db(), EDIT_DRAFT_ID_KEY, "999").await?;

        generate(
            &ctx,
            GenerateArgs {
                input: sample_flags(),
                ..GenerateArgs::default()
            },
        )
        .await?;

        let drafts = ctx.store.list().await?;
        assert_eq!(drafts.len(), 1);
        assert_ne!(drafts[0].id, 999);
        assert_eq!(storage::get_item(ctx.db(), EDIT_DRAFT_ID_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_forget_pending_edit_only_matches_its_draft() -> Result<()> {
        let ctx = setup_test_context().await?;
        storage::set_item(ctx.db(), EDIT_DRAFT_ID_KEY, "7").await?;

        forget_pending_edit(&ctx, 8).await?;
        assert_eq!(
            storage::get_item(ctx.db(), EDIT_DRAFT_ID_KEY).await?.as_deref(),
            Some("7")
        );
        forget_pending_edit(&ctx, 7).await?;
        assert_eq!(storage::get_item(ctx.db(), EDIT_DRAFT_ID_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_flag_clears_field_during_edit() -> Result<()> {
        let ctx = setup_test_context().await?;
        log_in(&ctx).await?;
        generate(
            &ctx,
            GenerateArgs {
                input: sample_flags(),
                ..GenerateArgs::default()
            },
        )
        .await?;
        let id = ctx.store.list().await?[0].id;

        generate(
            &ctx,
            GenerateArgs {
                input: ListingFlags {
                    offer: Some(String::new()),
                    brand: Some(String::new()),
                    no_fields: true,
                    ..ListingFlags::default()
                },
                edit: Some(id),
                ..GenerateArgs::default()
            },
        )
        .await?;

        let draft = ctx.store.find(id).await?.unwrap();
        assert_eq!(draft.offer, None);
        assert_eq!(draft.brand, None);
        assert!(draft.custom_fields.is_empty());
        assert_eq!(draft.category.as_deref(), Some("Clothing"));
        Ok(())
    }

    #[test]
    fn test_apply_to_keeps_base_for_absent_flags() {
        let base = sample_input();
        let flags = ListingFlags {
            price: Some("900".to_string()),
            ..ListingFlags::default()
        };
        let merged = flags.apply_to(base.clone());
        assert_eq!(merged.price, "900");
        assert_eq!(merged.name, base.name);
        assert_eq!(merged.images, base.images);
        assert_eq!(merged.custom_fields, base.custom_fields);
    }
}
