//! Per-subject scrape outcome.

use serde::{Deserialize, Serialize};

use crate::publication::Publication;

/// The outcome of scraping one subject's profile.
///
/// Built fresh for every attempt. When the retry policy gives up, the last
/// attempt's result is reported as-is; earlier attempts leave no trace beyond
/// `attempts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
  pub success:        bool,
  /// Extracted records in source-listing order.
  pub publications:   Vec<Publication>,
  pub errors:         Vec<String>,
  pub team_member_id: String,
  pub scholar_url:    String,
  /// Number of attempts the retry policy made before settling on this result.
  #[serde(default)]
  pub attempts:       u32,
}

impl ScrapeResult {
  /// An unsuccessful result with no publications and no errors yet.
  pub fn pending(team_member_id: &str, scholar_url: &str) -> Self {
    Self {
      success:        false,
      publications:   Vec::new(),
      errors:         Vec::new(),
      team_member_id: team_member_id.to_owned(),
      scholar_url:    scholar_url.to_owned(),
      attempts:       0,
    }
  }

  /// A failed result carrying a single error message.
  pub fn failed(
    team_member_id: &str,
    scholar_url: &str,
    error: impl Into<String>,
  ) -> Self {
    let mut result = Self::pending(team_member_id, scholar_url);
    result.errors.push(error.into());
    result
  }
}
