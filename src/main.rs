use clap::Parser;
use dotenvy::dotenv;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use zovatu::{
    cli::{self, AppContext, Cli},
    config::{database, settings, users},
    core::{cache, draft_store::DraftStore},
    errors::Result,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    if dotenv().is_err() {
        info!("No .env file loaded");
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Command failed: {:?}", e);
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    // 3. Load application settings
    let config = settings::load_default_config()?;

    // 4. Initialize database
    let database_url = database::get_database_url();
    info!("Connecting to database at {}", database_url);
    let db = database::create_connection(&database_url).await?;
    database::create_tables(&db).await?;

    // 5. Housekeeping before the command runs
    if config.auto_cleanup {
        match cache::auto_cleanup(&db).await {
            Ok(Some(report)) => info!("Auto cleanup removed {} cache items", report.cleared_items),
            Ok(None) => {}
            Err(e) => warn!("Auto cleanup failed: {}", e),
        }
    }

    let users = users::credential_source(&config);
    let ctx = AppContext::new(DraftStore::new(db), config, users);

    // 6. Run the command
    cli::run(&ctx, cli.command).await
}
