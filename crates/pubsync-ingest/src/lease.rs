//! Single-slot lease that keeps ingestion runs from overlapping.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Clones share one slot.
#[derive(Clone, Default)]
pub struct RunLease {
  slot: Arc<Mutex<()>>,
}

/// Held for the whole of a run; dropping it frees the slot.
pub struct LeaseGuard {
  _slot: OwnedMutexGuard<()>,
}

impl RunLease {
  pub fn new() -> Self { Self::default() }

  /// Take the slot, or `None` if a run already holds it. Never waits.
  pub fn try_acquire(&self) -> Option<LeaseGuard> {
    self
      .slot
      .clone()
      .try_lock_owned()
      .ok()
      .map(|slot| LeaseGuard { _slot: slot })
  }

  pub fn is_held(&self) -> bool { self.slot.try_lock().is_err() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn second_acquire_fails_until_release() {
    let lease = RunLease::new();
    let other = lease.clone();

    let guard = lease.try_acquire().expect("free");
    assert!(other.is_held());
    assert!(other.try_acquire().is_none());

    drop(guard);
    assert!(!lease.is_held());
    assert!(other.try_acquire().is_some());
  }
}
