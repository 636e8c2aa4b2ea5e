//! JSON REST API for pubsync.
//!
//! Exposes an axum [`Router`] over an [`Ingester`], which carries both the
//! [`LabStore`] for curation endpoints and the run lease for the ingestion
//! trigger. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pubsync_api::api_router(ingester.clone()))
//! ```

pub mod error;
pub mod publications;

use axum::{
  Router,
  routing::{get, put},
};
use pubsync_core::store::LabStore;
use pubsync_ingest::{FetcherFactory, Ingester};

pub use error::ApiError;

/// Build a fully-materialised API router for `ingester`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, F>(ingester: Ingester<S, F>) -> Router<()>
where
  S: LabStore + 'static,
  F: FetcherFactory + 'static,
{
  Router::new()
    .route(
      "/publications",
      get(publications::list::<S, F>).post(publications::trigger::<S, F>),
    )
    .route(
      "/publications/{id}",
      put(publications::update::<S, F>)
        .delete(publications::delete::<S, F>),
    )
    .with_state(ingester)
}
