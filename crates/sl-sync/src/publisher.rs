use sl_types::ViewModel;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Holds the current view model for one subscriber lifetime and notifies
/// watchers after each merge.
///
/// Backed by a `watch` channel, so a receiver that falls behind sees only the
/// latest state: several merges in quick succession may surface as a single
/// wake-up.
#[derive(Debug, Clone)]
pub struct ViewModelPublisher {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    tx: watch::Sender<ViewModel>,
    revision: AtomicU64,
}

impl ViewModelPublisher {
    pub fn new(initial: ViewModel) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                tx,
                revision: AtomicU64::new(0),
            }),
        }
    }

    /// Clone of the current view model.
    pub fn snapshot(&self) -> ViewModel {
        self.inner.tx.borrow().clone()
    }

    /// Read the current view model without cloning it.
    pub fn with_current<R>(&self, f: impl FnOnce(&ViewModel) -> R) -> R {
        f(&*self.inner.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.inner.tx.subscribe()
    }

    /// Number of merges applied so far.
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    /// Mutate the view model in place and notify every receiver once.
    pub fn publish<R: Default>(&self, f: impl FnOnce(&mut ViewModel) -> R) -> R {
        let mut result = R::default();
        self.inner.tx.send_modify(|vm| result = f(vm));
        self.inner.revision.fetch_add(1, Ordering::AcqRel);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_data::FallbackStore;
    use tokio_test::{assert_pending, assert_ready_ok, task};

    #[test]
    fn test_initial_snapshot_is_seed() {
        let publisher = ViewModelPublisher::new(FallbackStore::view_model());
        assert_eq!(publisher.snapshot(), FallbackStore::view_model());
        assert_eq!(publisher.revision(), 0);
    }

    #[test]
    fn test_publish_notifies_receivers() {
        let publisher = ViewModelPublisher::new(FallbackStore::view_model());
        let mut rx = publisher.subscribe();

        {
            let mut changed = task::spawn(rx.changed());
            assert_pending!(changed.poll());

            publisher.publish(|vm| vm.summary.revenue = "9000".into());
            assert!(changed.is_woken());
            assert_ready_ok!(changed.poll());
        }

        assert_eq!(rx.borrow_and_update().summary.revenue, "9000");
        assert_eq!(publisher.revision(), 1);
    }

    #[test]
    fn test_bursts_coalesce_for_slow_receivers() {
        let publisher = ViewModelPublisher::new(FallbackStore::view_model());
        let mut rx = publisher.subscribe();

        publisher.publish(|vm| vm.summary.revenue = "1".into());
        publisher.publish(|vm| vm.summary.revenue = "2".into());

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().summary.revenue, "2");
        assert!(!rx.has_changed().unwrap());
        assert_eq!(publisher.revision(), 2);
    }

    #[test]
    fn test_with_current_reads_without_clone() {
        let publisher = ViewModelPublisher::new(FallbackStore::view_model());
        let len = publisher.with_current(|vm| vm.timeseries.len());
        assert_eq!(len, FallbackStore::timeseries().len());
    }
}
