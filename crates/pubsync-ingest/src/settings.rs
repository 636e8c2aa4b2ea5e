//! Tunables for an ingestion run, deserialised from the `ingest` and
//! `browser` config sections.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// A desktop Chrome user agent; the default headless one is refused more
/// often.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X \
                                      10_15_7) AppleWebKit/537.36 (KHTML, \
                                      like Gecko) Chrome/91.0.4472.124 \
                                      Safari/537.36";

/// Listing rows of a rendered profile.
pub const DEFAULT_READY_SELECTOR: &str = "#gsc_a_b .gsc_a_tr";

/// When reconciled publications are written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
  /// Once, after every subject has been scraped.
  #[default]
  Batch,
  /// After each successful subject.
  PerSubject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
  /// Attempts per subject, including the first. Zero is treated as one.
  pub max_attempts:     u32,
  /// Base for the linear backoff: attempt `n` failing waits `n * delay`.
  pub retry_delay_ms:   u64,
  /// Pause between consecutive subjects.
  pub subject_delay_ms: u64,
  pub persist_mode:     PersistMode,
}

impl Default for IngestSettings {
  fn default() -> Self {
    Self {
      max_attempts:     3,
      retry_delay_ms:   2_000,
      subject_delay_ms: 2_000,
      persist_mode:     PersistMode::Batch,
    }
  }
}

impl IngestSettings {
  pub fn retry_delay(&self) -> Duration { Duration::from_millis(self.retry_delay_ms) }

  pub fn subject_delay(&self) -> Duration {
    Duration::from_millis(self.subject_delay_ms)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
  /// Chrome/Chromium binary; auto-detected when unset.
  pub executable:            Option<PathBuf>,
  pub user_agent:            String,
  pub navigation_timeout_ms: u64,
  /// Upper bound on waiting for `ready_selector` after navigation.
  pub settle_timeout_ms:     u64,
  pub ready_selector:        String,
}

impl Default for BrowserSettings {
  fn default() -> Self {
    Self {
      executable:            None,
      user_agent:            DEFAULT_USER_AGENT.to_owned(),
      navigation_timeout_ms: 30_000,
      settle_timeout_ms:     2_000,
      ready_selector:        DEFAULT_READY_SELECTOR.to_owned(),
    }
  }
}

impl BrowserSettings {
  pub fn navigation_timeout(&self) -> Duration {
    Duration::from_millis(self.navigation_timeout_ms)
  }

  pub fn settle_timeout(&self) -> Duration {
    Duration::from_millis(self.settle_timeout_ms)
  }
}
