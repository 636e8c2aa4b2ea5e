//! Errors that end an ingestion run.
//!
//! Everything else (a subject failing, a bad row, a run-log write) is
//! absorbed and reported through the run's results.

use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Error)]
pub enum IngestError {
  #[error("{0}")]
  Launch(#[source] FetchError),

  #[error("an ingestion run is already in progress")]
  RunInProgress,

  #[error("failed to persist publications: {0}")]
  Persist(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IngestError {
  pub(crate) fn persist(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Persist(Box::new(e))
  }
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
