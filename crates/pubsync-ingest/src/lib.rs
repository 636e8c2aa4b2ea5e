//! Publication ingestion for pubsync.
//!
//! A run reads the subject registry, renders each subject's profile in a
//! headless browser (with retries), extracts publications, reconciles them
//! into the stored collection with full-replace semantics and appends a run
//! log entry. Subjects are processed strictly one after another.
//!
//! ```no_run
//! # async fn demo(store: pubsync_store_json::JsonStore) -> Result<(), pubsync_ingest::IngestError> {
//! use pubsync_ingest::{BrowserSettings, ChromeLauncher, IngestSettings, Ingester, RunScope};
//!
//! let launcher = ChromeLauncher::new(BrowserSettings::default());
//! let ingester = Ingester::new(store, launcher, IngestSettings::default());
//! let report = ingester.run(RunScope::All).await?;
//! println!("{}/{} subjects ok", report.succeeded(), report.results.len());
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod error;
pub mod fetch;
pub mod lease;
pub mod reconcile;
pub mod registry;
pub mod retry;
pub mod run;
pub mod scrape;
pub mod settings;

pub use browser::ChromeLauncher;
pub use error::{IngestError, Result};
pub use fetch::{FetchError, FetcherFactory, ProfileFetcher};
pub use run::{Ingester, RunReport, RunScope};
pub use settings::{BrowserSettings, IngestSettings, PersistMode};

/// The production ingester: a headless Chrome per run.
pub type ChromeIngester<S> = Ingester<S, ChromeLauncher>;
