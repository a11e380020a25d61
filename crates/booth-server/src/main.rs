//! booth server binary.
//!
//! Reads `booth.toml` (or the path given with `--config`), applies `BOOTH_*`
//! environment overrides, opens the snapshot store and serves the JSON API
//! over HTTP.
//!
//! ```
//! cargo run -p booth-server -- --memory
//! ```

mod crm;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use booth_api::{
  AppState,
  notify::{LogCrm, LogMailer, Notifier, run_worker},
};
use booth_store_json::SnapshotStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  crm::WebhookCrm,
  settings::{ServerConfig, StoragePolicy},
};

#[derive(Parser)]
#[command(author, version, about = "Trade-show booth lead capture server")]
struct Cli {
  /// Path to the TOML configuration file. Missing is fine.
  #[arg(short, long, default_value = "booth.toml")]
  config: PathBuf,

  /// Keep everything in memory, regardless of the configured policy.
  #[arg(long)]
  memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = ServerConfig::load(&cli.config).with_context(|| {
    format!("failed to load configuration from {:?}", cli.config)
  })?;
  if cli.memory {
    cfg.storage.policy = StoragePolicy::Memory;
  }

  // Open the store.
  let store = match cfg.storage.policy {
    StoragePolicy::Memory => {
      tracing::warn!("in-memory storage: records are lost on exit");
      SnapshotStore::open_in_memory()
    }
    StoragePolicy::File => SnapshotStore::open(cfg.storage.path.clone())
      .await
      .with_context(|| format!("failed to open store at {:?}", cfg.storage.path))?,
  };

  // Notification worker.
  let (notifier, rx) = Notifier::channel();
  match &cfg.crm_webhook_url {
    Some(url) => {
      let crm = WebhookCrm::new(url.as_str()).context("failed to build CRM client")?;
      tracing::info!(%url, "crm webhook enabled");
      tokio::spawn(run_worker(rx, LogMailer, crm));
    }
    None => {
      tokio::spawn(run_worker(rx, LogMailer, LogCrm));
    }
  }

  let state = AppState {
    store: Arc::new(store),
    notifier,
    roi: cfg.roi,
  };
  let app = booth_api::api_router(state).layer(TraceLayer::new_for_http());

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
