//! JSON-file backend for the pubsync lab store.
//!
//! Each collection is a flat JSON array in one data directory:
//! `team-members.json`, `publications.json` and `ingestion-logs.json`.
//! Writes replace the whole file atomically; there is no schema versioning.

mod files;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{JsonStore, PUBLICATIONS_FILE, RUN_LOG_FILE, TEAM_MEMBERS_FILE};
