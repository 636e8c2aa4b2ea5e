//! `pubsync`: run one publication ingestion from the command line.
//!
//! ```text
//! pubsync                  # every subject with a profile URL
//! pubsync --member=m42     # just one subject
//! ```
//!
//! Exits non-zero when the browser cannot be launched or the publications
//! file cannot be written. Per-subject failures are reported in the log
//! output and the run log, not through the exit status.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use pubsync_ingest::{BrowserSettings, ChromeLauncher, IngestSettings, Ingester, RunScope};
use pubsync_store_json::JsonStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pubsync", author, version, about = "Ingest lab publications from scholar profiles")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pubsync.toml")]
  config: PathBuf,

  /// Only ingest the subject with this id.
  #[arg(long, value_name = "ID")]
  member: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct Settings {
  data_dir: Option<PathBuf>,
  ingest:   IngestSettings,
  browser:  BrowserSettings,
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
  let settings = Settings::load(&cli.config)?;
  let data_dir = settings.data_dir.unwrap_or_else(|| PathBuf::from("data"));

  let ingester = Ingester::new(
    JsonStore::open(&data_dir),
    ChromeLauncher::new(settings.browser),
    settings.ingest,
  );
  let report = ingester
    .run(RunScope::from_member(cli.member))
    .await
    .context("ingestion run failed")?;

  if report.results.is_empty() {
    tracing::info!(data_dir = %data_dir.display(), "no subjects were ingested");
  }
  Ok(())
}
