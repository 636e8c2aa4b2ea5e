//! Append-only ingestion run log, capped to the newest entries.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scrape::ScrapeResult;

/// Maximum number of run entries kept on disk.
pub const RUN_LOG_CAPACITY: usize = 100;

/// Summary of one subject within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLogResult {
  pub team_member_id:    String,
  pub scholar_url:       String,
  pub success:           bool,
  pub publication_count: usize,
  pub errors:            Vec<String>,
}

impl From<&ScrapeResult> for RunLogResult {
  fn from(r: &ScrapeResult) -> Self {
    Self {
      team_member_id:    r.team_member_id.clone(),
      scholar_url:       r.scholar_url.clone(),
      success:           r.success,
      publication_count: r.publications.len(),
      errors:            r.errors.clone(),
    }
  }
}

/// One ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
  #[serde(with = "crate::timestamp")]
  pub timestamp: DateTime<Utc>,
  pub results:   Vec<RunLogResult>,
}

impl RunLogEntry {
  pub fn new(timestamp: DateTime<Utc>, results: &[ScrapeResult]) -> Self {
    Self { timestamp, results: results.iter().map(RunLogResult::from).collect() }
  }
}

/// Bounded FIFO of run entries, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunLog {
  entries: VecDeque<RunLogEntry>,
}

impl RunLog {
  /// Build a log from stored entries, dropping the oldest beyond capacity.
  pub fn from_entries(entries: Vec<RunLogEntry>) -> Self {
    let mut log = Self { entries: entries.into() };
    log.trim();
    log
  }

  /// Append `entry`, evicting the oldest entries beyond [`RUN_LOG_CAPACITY`].
  pub fn push(&mut self, entry: RunLogEntry) {
    self.entries.push_back(entry);
    self.trim();
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn entries(&self) -> impl Iterator<Item = &RunLogEntry> {
    self.entries.iter()
  }

  fn trim(&mut self) {
    while self.entries.len() > RUN_LOG_CAPACITY {
      self.entries.pop_front();
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn entry(n: i64) -> RunLogEntry {
    RunLogEntry {
      timestamp: Utc.timestamp_opt(n, 0).unwrap(),
      results:   Vec::new(),
    }
  }

  #[test]
  fn keeps_newest_hundred_oldest_first() {
    let mut log = RunLog::default();
    for n in 0..130 {
      log.push(entry(n));
    }
    assert_eq!(log.len(), RUN_LOG_CAPACITY);
    let stamps: Vec<i64> =
      log.entries().map(|e| e.timestamp.timestamp()).collect();
    assert_eq!(stamps.first(), Some(&30));
    assert_eq!(stamps.last(), Some(&129));
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn oversized_stored_log_is_trimmed_on_load() {
    let log = RunLog::from_entries((0..150).map(entry).collect());
    assert_eq!(log.len(), RUN_LOG_CAPACITY);
    assert_eq!(log.entries().next().unwrap().timestamp.timestamp(), 50);
  }

  #[test]
  fn serialises_as_plain_array() {
    let mut log = RunLog::default();
    log.push(RunLogEntry::new(
      Utc.timestamp_opt(0, 0).unwrap(),
      &[ScrapeResult::failed("m1", "u", "blocked by source")],
    ));
    let json = serde_json::to_value(&log).unwrap();
    assert_eq!(
      json,
      serde_json::json!([{
        "timestamp": "1970-01-01T00:00:00.000Z",
        "results": [{
          "teamMemberId": "m1",
          "scholarUrl": "u",
          "success": false,
          "publicationCount": 0,
          "errors": ["blocked by source"],
        }],
      }])
    );
  }
}
