//! [`JsonStore`], the JSON-file implementation of [`LabStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use pubsync_core::{
  collection::PublicationSet,
  publication::{Publication, PublicationId},
  run_log::{RunLog, RunLogEntry},
  store::LabStore,
  subject::Subject,
  timestamp,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{Error, Result, files};

pub const TEAM_MEMBERS_FILE: &str = "team-members.json";
pub const PUBLICATIONS_FILE: &str = "publications.json";
pub const RUN_LOG_FILE: &str = "ingestion-logs.json";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lab store backed by flat JSON array files in one data directory.
///
/// Cloning is cheap; clones share the directory and the write lock.
#[derive(Clone)]
pub struct JsonStore {
  inner: Arc<Inner>,
}

struct Inner {
  data_dir:   PathBuf,
  /// Serialises every write and read-modify-write within this process.
  write_lock: Mutex<()>,
}

impl JsonStore {
  /// Open a store rooted at `data_dir`. The directory is created lazily on
  /// the first write.
  pub fn open(data_dir: impl Into<PathBuf>) -> Self {
    Self {
      inner: Arc::new(Inner {
        data_dir:   data_dir.into(),
        write_lock: Mutex::new(()),
      }),
    }
  }

  pub fn data_dir(&self) -> &Path { &self.inner.data_dir }

  fn path(&self, file: &str) -> PathBuf { self.inner.data_dir.join(file) }

  async fn read_publications(&self) -> Result<Vec<Publication>> {
    let publications = files::read_json(&self.path(PUBLICATIONS_FILE)).await?;
    Ok(publications.unwrap_or_default())
  }

  /// The collection in its stored form. Callers hold the write lock.
  async fn read_set(&self) -> Result<PublicationSet> {
    let path = self.path(PUBLICATIONS_FILE);
    match files::read_json(&path).await? {
      Some(set) => Ok(set),
      None => {
        debug!(path = %path.display(), "publications file absent, starting empty");
        Ok(PublicationSet::default())
      }
    }
  }

  async fn write_set(&self, set: &PublicationSet) -> Result<()> {
    files::write_atomic(&self.path(PUBLICATIONS_FILE), set).await?;
    debug!(count = set.len(), "saved publications");
    Ok(())
  }

  async fn read_run_log(&self) -> Result<RunLog> {
    let entries = files::read_json(&self.path(RUN_LOG_FILE)).await?;
    Ok(RunLog::from_entries(entries.unwrap_or_default()))
  }
}

// ─── LabStore impl ───────────────────────────────────────────────────────────

impl LabStore for JsonStore {
  type Error = crate::Error;

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let subjects = files::read_json(&self.path(TEAM_MEMBERS_FILE)).await?;
    Ok(subjects.unwrap_or_default())
  }

  async fn load_publications(&self) -> Result<Vec<Publication>> {
    self.read_publications().await
  }

  async fn save_publications(&self, publications: &[Publication]) -> Result<()> {
    let _guard = self.inner.write_lock.lock().await;
    files::write_atomic(&self.path(PUBLICATIONS_FILE), publications).await?;
    debug!(count = publications.len(), "saved publications");
    Ok(())
  }

  async fn edit_publications<'a, F, T>(&'a self, edit: F) -> Result<T>
  where
    F: FnOnce(&mut PublicationSet) -> T + Send + 'a,
    T: Send + 'a,
  {
    let _guard = self.inner.write_lock.lock().await;
    let mut set = self.read_set().await?;
    let out = edit(&mut set);
    self.write_set(&set).await?;
    Ok(out)
  }

  async fn update_publication(
    &self,
    id: PublicationId,
    update: Publication,
  ) -> Result<Option<Publication>> {
    let _guard = self.inner.write_lock.lock().await;
    let mut set = self.read_set().await?;

    let updated = set
      .update(&id, update, timestamp::now())
      .map_err(|e| Error::json(self.path(PUBLICATIONS_FILE), e))?;
    if updated.is_some() {
      self.write_set(&set).await?;
    }
    Ok(updated)
  }

  async fn delete_publication(&self, id: PublicationId) -> Result<bool> {
    let _guard = self.inner.write_lock.lock().await;
    let mut set = self.read_set().await?;

    if !set.remove(&id) {
      return Ok(false);
    }
    self.write_set(&set).await?;
    Ok(true)
  }

  async fn load_run_log(&self) -> Result<RunLog> { self.read_run_log().await }

  async fn append_run_log(&self, entry: RunLogEntry) -> Result<()> {
    let _guard = self.inner.write_lock.lock().await;
    let mut log = match self.read_run_log().await {
      Ok(log) => log,
      Err(e) => {
        warn!(error = %e, "unreadable run log, starting a new one");
        RunLog::default()
      }
    };
    log.push(entry);
    files::write_atomic(&self.path(RUN_LOG_FILE), &log).await
  }
}
