//! One scrape attempt: fetch, check for a block page, extract.

use chrono::{DateTime, Utc};
use pubsync_core::{scrape::ScrapeResult, timestamp};
use pubsync_scholar::{ExtractContext, Extraction, ProfilePage};
use tracing::debug;

use crate::fetch::{FetchError, ProfileFetcher};

pub const NO_PUBLICATIONS: &str = "no publications found on profile";

/// Run a single attempt against `url`.
///
/// Never fails: every problem ends up as a message in the result's
/// `errors`. The result is successful when at least one publication was
/// extracted, even if some rows failed.
pub async fn scrape_once<F: ProfileFetcher>(
  fetcher: &F,
  subject_id: &str,
  url: &str,
) -> ScrapeResult {
  let mut result = ScrapeResult::pending(subject_id, url);

  let extraction = match fetcher.fetch_profile_html(url).await {
    Ok(html) => read_profile(&html, subject_id, url, timestamp::now()),
    Err(e) => Err(e),
  };
  let extraction = match extraction {
    Ok(extraction) => extraction,
    Err(e) => {
      result.errors.push(format!("scraping failed: {e}"));
      return result;
    }
  };

  debug!(
    subject = subject_id,
    publications = extraction.publications.len(),
    bad_rows = extraction.errors.len(),
    "extracted profile"
  );
  result.errors.extend(extraction.errors.iter().map(ToString::to_string));
  if extraction.publications.is_empty() {
    result.errors.push(NO_PUBLICATIONS.to_owned());
  }
  result.success = !extraction.publications.is_empty();
  result.publications = extraction.publications;
  result
}

/// Parse and extract synchronously; the DOM never lives across an await.
fn read_profile(
  html: &str,
  subject_id: &str,
  profile_url: &str,
  scraped_at: DateTime<Utc>,
) -> Result<Extraction, FetchError> {
  let page = ProfilePage::parse(html);
  if let Some(title) = page.blocked_title() {
    return Err(FetchError::Blocked(title));
  }
  Ok(page.extract(&ExtractContext { subject_id, profile_url, scraped_at }))
}
