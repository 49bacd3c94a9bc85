//! ledger-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), makes sure the
//! ledger table exists, and serves the JSON API under `/api`.

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use ledger_api::AppState;
use ledger_store_sqlite::SqliteLedger;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Household ledger server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("LEDGER")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.ledger.db_path = expand_tilde(&server_cfg.ledger.db_path);

  // Create the table up front so a bad path fails at startup.
  let mut ledger = SqliteLedger::new(&server_cfg.ledger).context("invalid ledger config")?;
  ledger
    .open()
    .await
    .with_context(|| format!("failed to open ledger at {:?}", server_cfg.ledger.db_path))?;
  ledger.close().await.context("failed to close ledger")?;

  let address = server_cfg.address();
  let state = AppState::new(server_cfg.ledger).context("invalid ledger config")?;
  let app = Router::new()
    .nest("/api", ledger_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
