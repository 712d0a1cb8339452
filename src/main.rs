//! sqlpeek - an interactive SQLite browser with confirmed writes.

use std::sync::Arc;

use sqlpeek::app::Orchestrator;
use sqlpeek::cli::Cli;
use sqlpeek::config::Config;
use sqlpeek::db::{validate_database_path, DatabaseClient, SqliteClient};
use sqlpeek::error::Result;
use sqlpeek::logging;
use sqlpeek::safety::Classifier;
use sqlpeek::tui::{App, Engine, Tui};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Could not read .env file: {e}");
        }
    }

    let cli = Cli::parse_args();

    if let Err(e) = validate_database_path(&cli.database) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = logging::init_file_logging() {
        eprintln!("Warning: Could not create log file: {e}");
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        eprintln!("{e}");
        std::process::exit(1);
    }
}

/// Loads the config file, falling back to defaults when it is unreadable.
fn load_config(cli: &Cli) -> Config {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());

    let mut config = Config::load_from_file(&config_path).unwrap_or_else(|e| {
        warn!("{e}; using defaults");
        Config::default()
    });
    config.apply_env_overrides();

    if let Some(provider) = &cli.llm {
        config.llm.provider = provider.clone();
    }
    config.safety.strict |= cli.strict;
    config
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli);

    let db = SqliteClient::open(&cli.database).await?;
    info!("Opened {}", cli.database.display());
    let db: Arc<dyn DatabaseClient> = Arc::new(db);

    let classifier = Classifier::new(config.safety.strict);
    let orchestrator = Orchestrator::new(db, classifier);
    let (handle, engine, responses) = Engine::spawn(orchestrator);
    let engine_task = tokio::spawn(engine.run());

    handle.start_translator(config.llm.clone());

    let database_name = cli
        .database
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.database.display().to_string());

    let result = match Tui::new() {
        Ok(mut tui) => tui.run(App::new(database_name), handle, responses).await,
        Err(e) => {
            // Dropping the last handle stops the engine.
            drop(handle);
            Err(e)
        }
    };

    // Wait for the rollback of anything pending and the pool close.
    if let Err(e) = engine_task.await {
        warn!("Engine task failed: {e}");
    }

    result
}
