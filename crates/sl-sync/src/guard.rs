//! Mount guard: the one cancellation mechanism of a subscriber lifetime.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Lifecycle of the subscriber a view model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MountState {
    Active,
    /// Terminal.
    TornDown,
}

/// Cloneable handle shared by everything that may write on behalf of one
/// subscriber. Tearing down any clone tears down all of them.
///
/// Teardown does not abort requests already in flight; it only stops their
/// results from being merged.
#[derive(Debug, Clone, Default)]
pub struct MountGuard {
    token: CancellationToken,
}

impl MountGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MountState {
        if self.token.is_cancelled() {
            MountState::TornDown
        } else {
            MountState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == MountState::Active
    }

    /// One-way transition to [`MountState::TornDown`]. Repeated calls are no-ops.
    pub fn tear_down(&self) {
        self.token.cancel();
    }

    /// Resolves once the guard has been torn down.
    pub async fn torn_down(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_active() {
        let guard = MountGuard::new();
        assert_eq!(guard.state(), MountState::Active);
        assert!(guard.is_active());
    }

    #[test]
    fn test_teardown_is_one_way_and_shared() {
        let guard = MountGuard::new();
        let clone = guard.clone();

        clone.tear_down();
        assert_eq!(guard.state(), MountState::TornDown);

        guard.tear_down();
        assert!(!clone.is_active());
    }

    #[tokio::test]
    async fn test_torn_down_future_resolves() {
        let guard = MountGuard::new();
        let waiter = guard.clone();
        let handle = tokio::spawn(async move { waiter.torn_down().await });

        guard.tear_down();
        handle.await.unwrap();
    }
}
