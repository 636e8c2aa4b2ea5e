//! Per-subject retry policy with linear backoff.

use std::{future::Future, time::Duration};

use pubsync_core::scrape::ScrapeResult;
use tracing::{debug, warn};

use crate::settings::IngestSettings;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub delay:        Duration,
}

impl RetryPolicy {
  pub fn from_settings(settings: &IngestSettings) -> Self {
    Self {
      max_attempts: settings.max_attempts,
      delay:        settings.retry_delay(),
    }
  }

  /// Wait after failed attempt `attempt` (1-based): `attempt * delay`.
  pub fn backoff(&self, attempt: u32) -> Duration { self.delay * attempt }

  /// Call `attempt_fn` with attempt numbers 1, 2, … until a result is
  /// successful or the attempts run out.
  ///
  /// Returns the last result as-is, with `attempts` set. Earlier failures
  /// are dropped, not merged.
  pub async fn run<F, Fut>(&self, mut attempt_fn: F) -> ScrapeResult
  where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ScrapeResult>,
  {
    let max = self.max_attempts.max(1);
    let mut attempt = 1;
    loop {
      let mut result = attempt_fn(attempt).await;
      result.attempts = attempt;
      if result.success {
        debug!(subject = %result.team_member_id, attempt, "attempt succeeded");
        return result;
      }
      if attempt >= max {
        return result;
      }

      let wait = self.backoff(attempt);
      warn!(
        subject = %result.team_member_id,
        attempt,
        max,
        errors = ?result.errors,
        retry_in_ms = wait.as_millis() as u64,
        "attempt failed, retrying"
      );
      tokio::time::sleep(wait).await;
      attempt += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};

  use super::*;

  fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy { max_attempts, delay: Duration::ZERO }
  }

  fn outcome(success: bool, error: &str) -> ScrapeResult {
    let mut r = ScrapeResult::failed("m1", "u", error);
    r.success = success;
    r
  }

  #[test]
  fn backoff_is_linear() {
    let p = RetryPolicy { max_attempts: 3, delay: Duration::from_secs(2) };
    assert_eq!(p.backoff(1), Duration::from_secs(2));
    assert_eq!(p.backoff(2), Duration::from_secs(4));
  }

  #[tokio::test]
  async fn third_attempt_success_is_reported_alone() {
    let calls = AtomicU32::new(0);
    let result = policy(3)
      .run(|n| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { outcome(n == 3, &format!("attempt {n}")) }
      })
      .await;

    assert!(result.success);
    assert_eq!(result.attempts, 3);
    assert_eq!(result.errors, vec!["attempt 3"]);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn exhausted_retries_keep_last_errors_only() {
    let result = policy(3)
      .run(|n| async move { outcome(false, &format!("attempt {n}")) })
      .await;

    assert!(!result.success);
    assert_eq!(result.attempts, 3);
    assert_eq!(result.errors, vec!["attempt 3"]);
  }

  #[tokio::test]
  async fn first_success_stops_immediately() {
    let calls = AtomicU32::new(0);
    let result = policy(3)
      .run(|_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { outcome(true, "") }
      })
      .await;
    assert_eq!(result.attempts, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn zero_max_attempts_still_tries_once() {
    let result = policy(0).run(|_| async { outcome(false, "x") }).await;
    assert_eq!(result.attempts, 1);
  }

  #[tokio::test(start_paused = true)]
  async fn waits_between_attempts() {
    let p = RetryPolicy { max_attempts: 3, delay: Duration::from_secs(2) };
    let start = tokio::time::Instant::now();
    p.run(|_| async { outcome(false, "x") }).await;
    assert_eq!(start.elapsed(), Duration::from_secs(6));
  }
}
