//! The `LabStore` trait.
//!
//! Implemented by storage backends (e.g. `pubsync-store-json`). The ingestion
//! pipeline and the HTTP API depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::{
  collection::PublicationSet,
  publication::{Publication, PublicationId},
  run_log::{RunLog, RunLogEntry},
  subject::Subject,
};

/// Abstraction over the lab's persisted collections.
///
/// Publications are always written as a whole collection; there is no
/// incremental insert. All methods return `Send` futures so the trait can be
/// used from axum handlers and spawned tasks.
pub trait LabStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// All subjects, in stored order.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  // ── Publications ──────────────────────────────────────────────────────

  /// The full publications collection. A collection that has never been
  /// written reads as empty.
  fn load_publications(
    &self,
  ) -> impl Future<Output = Result<Vec<Publication>, Self::Error>> + Send + '_;

  /// Replace the full publications collection.
  fn save_publications<'a>(
    &'a self,
    publications: &'a [Publication],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Load the collection, hand it to `edit`, and write the result back.
  ///
  /// No other write to the collection can land between the load and the
  /// write. Records `edit` does not touch are written back in their stored
  /// form.
  fn edit_publications<'a, F, T>(
    &'a self,
    edit: F,
  ) -> impl Future<Output = Result<T, Self::Error>> + Send + 'a
  where
    F: FnOnce(&mut PublicationSet) -> T + Send + 'a,
    T: Send + 'a;

  /// Replace one stored publication with `update` (see
  /// [`Publication::apply_update`]). Returns `None` if `id` is unknown.
  fn update_publication(
    &self,
    id: PublicationId,
    update: Publication,
  ) -> impl Future<Output = Result<Option<Publication>, Self::Error>> + Send + '_;

  /// Remove one publication. Returns `false` if `id` is unknown.
  fn delete_publication(
    &self,
    id: PublicationId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Run log ───────────────────────────────────────────────────────────

  fn load_run_log(
    &self,
  ) -> impl Future<Output = Result<RunLog, Self::Error>> + Send + '_;

  /// Append one entry, keeping only the newest
  /// [`RUN_LOG_CAPACITY`](crate::run_log::RUN_LOG_CAPACITY) entries.
  fn append_run_log(
    &self,
    entry: RunLogEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
