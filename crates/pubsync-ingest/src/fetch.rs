//! The fetch seam: how a run obtains rendered profile HTML.
//!
//! [`crate::browser`] implements it with a headless Chrome; tests script it.

use std::{future::Future, time::Duration};

use thiserror::Error;

/// Why one fetch attempt produced no usable page.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("failed to launch browser: {0}")]
  Launch(String),

  #[error("navigation timed out after {0:?}")]
  Timeout(Duration),

  #[error("navigation failed: {0}")]
  Navigation(String),

  /// The source served a refusal page instead of the profile.
  #[error("blocked by source (page title {0:?})")]
  Blocked(String),
}

/// Renders one profile URL to HTML.
///
/// Each call uses its own tab and releases it before returning, whatever the
/// outcome.
pub trait ProfileFetcher: Send + Sync {
  fn fetch_profile_html<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<String, FetchError>> + Send + 'a;
}

/// Opens and closes the fetcher shared by every subject of one run.
pub trait FetcherFactory: Send + Sync {
  type Fetcher: ProfileFetcher;

  fn open(&self) -> impl Future<Output = Result<Self::Fetcher, FetchError>> + Send + '_;

  /// Release the fetcher. Failures are logged, never returned.
  fn close(&self, fetcher: Self::Fetcher) -> impl Future<Output = ()> + Send + '_;
}
