//! Scholar profile extractor for pubsync.
//!
//! Turns the rendered HTML of one profile page into [`pubsync_core`]
//! publication records. Pure synchronous; no browser or filesystem
//! dependencies. Fetching the page is the ingest crate's job.
//!
//! # Quick start
//!
//! ```no_run
//! use chrono::Utc;
//! use pubsync_scholar::{ExtractContext, extract};
//!
//! let html = std::fs::read_to_string("profile.html").unwrap();
//! let ctx = ExtractContext {
//!   subject_id:  "m1",
//!   profile_url: "https://scholar.google.com/citations?user=abc",
//!   scraped_at:  Utc::now(),
//! };
//! let out = extract(&html, &ctx);
//! println!("{} publications, {} bad rows", out.publications.len(), out.errors.len());
//! ```

mod clean;
pub mod error;
mod page;

pub use error::{Error, Result};
pub use page::{DEFAULT_ORIGIN, ExtractContext, Extraction, ProfilePage, extract};
