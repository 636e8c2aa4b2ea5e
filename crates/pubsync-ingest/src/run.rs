//! Run orchestration: subjects → scrapes → reconcile → persist → run log.

use std::{fmt, sync::Arc};

use pubsync_core::{
  run_log::RunLogEntry, scrape::ScrapeResult, store::LabStore, timestamp,
};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
  error::{IngestError, Result},
  fetch::FetcherFactory,
  lease::RunLease,
  reconcile::reconcile,
  registry,
  retry::RetryPolicy,
  scrape::scrape_once,
  settings::{IngestSettings, PersistMode},
};

// ─── Scope & report ──────────────────────────────────────────────────────────

/// Which subjects a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunScope {
  All,
  Subject(String),
}

impl RunScope {
  pub fn from_member(member: Option<String>) -> Self {
    member.map_or(Self::All, Self::Subject)
  }
}

impl fmt::Display for RunScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str("all subjects"),
      Self::Subject(id) => write!(f, "subject {id}"),
    }
  }
}

/// What a finished run did.
#[derive(Debug, Default)]
pub struct RunReport {
  /// One entry per processed subject, in registry order.
  pub results:              Vec<ScrapeResult>,
  /// Fresh publications written for successful subjects.
  pub publications_written: usize,
}

impl RunReport {
  pub fn succeeded(&self) -> usize { self.results.iter().filter(|r| r.success).count() }

  pub fn error_count(&self) -> usize { self.results.iter().map(|r| r.errors.len()).sum() }

  fn log_summary(&self) {
    info!(
      succeeded = self.succeeded(),
      total = self.results.len(),
      publications = self.publications_written,
      errors = self.error_count(),
      "ingestion run finished"
    );
    for result in self.results.iter().filter(|r| !r.errors.is_empty()) {
      for e in &result.errors {
        warn!(subject = %result.team_member_id, error = %e, "subject error");
      }
    }
  }
}

/// A subject with a usable profile URL.
struct Target {
  id:  String,
  url: String,
}

// ─── Ingester ────────────────────────────────────────────────────────────────

/// Runs ingestion against a store, one run at a time.
///
/// Cloning is cheap; clones share the store, the fetcher factory and the run
/// lease.
pub struct Ingester<S, F> {
  inner: Arc<Inner<S, F>>,
}

struct Inner<S, F> {
  store:    S,
  fetchers: F,
  settings: IngestSettings,
  lease:    RunLease,
}

impl<S, F> Clone for Ingester<S, F> {
  fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<S, F> Ingester<S, F>
where
  S: LabStore + 'static,
  F: FetcherFactory + 'static,
{
  pub fn new(store: S, fetchers: F, settings: IngestSettings) -> Self {
    Self {
      inner: Arc::new(Inner { store, fetchers, settings, lease: RunLease::new() }),
    }
  }

  pub fn store(&self) -> &S { &self.inner.store }

  pub fn is_running(&self) -> bool { self.inner.lease.is_held() }

  /// Run to completion in the current task.
  pub async fn run(&self, scope: RunScope) -> Result<RunReport> {
    let _lease = self.inner.lease.try_acquire().ok_or(IngestError::RunInProgress)?;
    self.run_leased(scope).await
  }

  /// Take the lease now and run in a background task.
  ///
  /// Fails immediately with [`IngestError::RunInProgress`] when another run
  /// holds the lease.
  pub fn start(&self, scope: RunScope) -> Result<JoinHandle<Result<RunReport>>> {
    let lease = self.inner.lease.try_acquire().ok_or(IngestError::RunInProgress)?;
    let this = self.clone();
    Ok(tokio::spawn(async move {
      let _lease = lease;
      let outcome = this.run_leased(scope).await;
      if let Err(e) = &outcome {
        error!(error = %e, "background ingestion run failed");
      }
      outcome
    }))
  }

  async fn run_leased(&self, scope: RunScope) -> Result<RunReport> {
    let targets = self.resolve(&scope).await;
    if targets.is_empty() {
      info!(%scope, "nothing to ingest");
      return Ok(RunReport::default());
    }

    info!(
      %scope,
      subjects = targets.len(),
      mode = ?self.inner.settings.persist_mode,
      "starting ingestion run"
    );
    let fetcher = self.inner.fetchers.open().await.map_err(IngestError::Launch)?;
    let (results, scraped_written) = self.scrape_all(&fetcher, &targets).await;
    self.inner.fetchers.close(fetcher).await;

    let written = match (self.inner.settings.persist_mode, scraped_written) {
      (PersistMode::Batch, Ok(_)) => self.persist(&results).await,
      (_, written) => written,
    };
    self.log_run(&results).await;

    let report = RunReport { results, publications_written: written? };
    report.log_summary();
    Ok(report)
  }

  async fn resolve(&self, scope: &RunScope) -> Vec<Target> {
    let subjects = registry::list_subjects_with_source_url(&self.inner.store).await;
    let selected: Vec<_> = match scope {
      RunScope::All => subjects,
      RunScope::Subject(id) => {
        let found: Vec<_> = subjects.into_iter().filter(|s| &s.id == id).take(1).collect();
        if found.is_empty() {
          warn!(subject = %id, "subject not found or has no profile URL");
        }
        found
      }
    };
    selected
      .into_iter()
      .filter_map(|s| {
        let url = s.source_url()?.to_owned();
        Some(Target { id: s.id, url })
      })
      .collect()
  }

  /// Scrape every target in order. In per-subject mode each success is
  /// persisted straight away and the first write failure stops the run.
  async fn scrape_all(
    &self,
    fetcher: &F::Fetcher,
    targets: &[Target],
  ) -> (Vec<ScrapeResult>, Result<usize>) {
    let settings = &self.inner.settings;
    let retry = RetryPolicy::from_settings(settings);
    let mut results = Vec::with_capacity(targets.len());
    let mut written = 0;

    for (i, target) in targets.iter().enumerate() {
      if i > 0 {
        tokio::time::sleep(settings.subject_delay()).await;
      }

      info!(subject = %target.id, url = %target.url, "scraping profile");
      let result = retry
        .run(|_| scrape_once(fetcher, &target.id, &target.url))
        .await;
      info!(
        subject = %target.id,
        success = result.success,
        publications = result.publications.len(),
        attempts = result.attempts,
        "subject done"
      );

      let persist_now = settings.persist_mode == PersistMode::PerSubject && result.success;
      results.push(result);
      if persist_now {
        match self.persist(&results[results.len() - 1..]).await {
          Ok(n) => written += n,
          Err(e) => return (results, Err(e)),
        }
      }
    }

    (results, Ok(written))
  }

  /// Reconcile `results` into the stored collection and write it back in one
  /// store edit. Returns the number of fresh publications written.
  async fn persist(&self, results: &[ScrapeResult]) -> Result<usize> {
    let fresh: usize = results
      .iter()
      .filter(|r| r.success)
      .map(|r| r.publications.len())
      .sum();
    if !results.iter().any(|r| r.success) {
      info!("no successful subjects, stored publications left as they are");
      return Ok(0);
    }

    let total = self
      .inner
      .store
      .edit_publications(|publications| {
        reconcile(publications, results);
        publications.len()
      })
      .await
      .map_err(IngestError::persist)?;

    info!(fresh, total, "saved publications");
    Ok(fresh)
  }

  async fn log_run(&self, results: &[ScrapeResult]) {
    let entry = RunLogEntry::new(timestamp::now(), results);
    if let Err(e) = self.inner.store.append_run_log(entry).await {
      warn!(error = %e, "failed to append run log");
    }
  }
}
