//! pubsync-server binary.
//!
//! Reads `pubsync.toml` (or the path specified with `--config`), overlaid by
//! `PUBSYNC_*` environment variables, opens the JSON data directory, and
//! serves the publications API under `/api`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use pubsync_ingest::{BrowserSettings, ChromeLauncher, IngestSettings, Ingester};
use pubsync_store_json::JsonStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "pubsync HTTP server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pubsync.toml")]
  config: PathBuf,
}

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
struct ServerConfig {
  host: String,
  port: u16,
}

impl Default for ServerConfig {
  fn default() -> Self { Self { host: "127.0.0.1".into(), port: 3000 } }
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct Settings {
  data_dir: Option<PathBuf>,
  ingest:   IngestSettings,
  browser:  BrowserSettings,
  server:   ServerConfig,
}

impl Settings {
  fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("PUBSYNC")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  fn data_dir(&self) -> PathBuf {
    self.data_dir.clone().unwrap_or_else(|| PathBuf::from("data"))
  }
}

// ─── Main ─────────────────────────────────────────────────────────────────────

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
  let settings = Settings::load(&cli.config)?;

  let data_dir = settings.data_dir();
  tracing::info!(data_dir = %data_dir.display(), "opening data directory");
  let store = JsonStore::open(data_dir);
  let ingester = Ingester::new(
    store,
    ChromeLauncher::new(settings.browser),
    settings.ingest,
  );

  let app = Router::new()
    .nest("/api", pubsync_api::api_router(ingester))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", settings.server.host, settings.server.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
