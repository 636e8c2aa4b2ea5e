//! Read-only access to the subject registry.
//!
//! Storage errors degrade to an empty list: a run with no readable registry
//! is a no-op, not a failure.

use pubsync_core::{store::LabStore, subject::Subject};
use tracing::warn;

pub async fn list_subjects<S: LabStore>(store: &S) -> Vec<Subject> {
  match store.list_subjects().await {
    Ok(subjects) => subjects,
    Err(e) => {
      warn!(error = %e, "failed to read subjects, treating registry as empty");
      Vec::new()
    }
  }
}

/// Subjects that have a non-blank profile URL, in registry order.
pub async fn list_subjects_with_source_url<S: LabStore>(store: &S) -> Vec<Subject> {
  list_subjects(store)
    .await
    .into_iter()
    .filter(|s| s.source_url().is_some())
    .collect()
}
