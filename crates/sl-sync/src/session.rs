//! A subscriber lifetime: mount, sync, observe, unmount.

use sl_data::{EndpointSet, FallbackStore, HttpTransport, Transport};
use sl_types::ViewModel;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::guard::MountGuard;
use crate::merge::MergeEngine;
use crate::orchestrator::{FetchOrchestrator, SyncReport};
use crate::publisher::ViewModelPublisher;

/// Owns the view model of one mounted subscriber.
///
/// The view model starts as a copy of the fallback snapshot and only ever
/// changes through guarded merges. Dropping the session unmounts it.
#[derive(Debug)]
pub struct SyncSession {
    id: Uuid,
    guard: MountGuard,
    publisher: ViewModelPublisher,
    orchestrator: FetchOrchestrator,
}

impl SyncSession {
    /// Mount a new subscriber against the given transport and endpoints.
    pub fn mount(transport: Arc<dyn Transport>, endpoints: &EndpointSet) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, transport = transport.name(), "Mounted sync session");

        Self {
            id,
            guard: MountGuard::new(),
            publisher: ViewModelPublisher::new(FallbackStore::view_model()),
            orchestrator: FetchOrchestrator::new(transport, endpoints),
        }
    }

    /// Mount over HTTP using a [`SyncConfig`].
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::mount(Arc::new(HttpTransport::new(&config.base_url)), &config.endpoints)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn snapshot(&self) -> ViewModel {
        self.publisher.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.publisher.subscribe()
    }

    pub fn publisher(&self) -> &ViewModelPublisher {
        &self.publisher
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    pub fn is_mounted(&self) -> bool {
        self.guard.is_active()
    }

    fn engine(&self) -> MergeEngine {
        MergeEngine::new(self.guard.clone(), self.publisher.clone())
    }

    /// Run one round of fetches on the current task. After unmount this
    /// returns immediately without issuing any request.
    pub async fn sync(&self) -> SyncReport {
        run_round(self.id, self.orchestrator.clone(), self.engine()).await
    }

    /// Another round under the same guard, e.g. for periodic refresh.
    pub async fn refresh(&self) -> SyncReport {
        debug!(session = %self.id, "Refreshing");
        self.sync().await
    }

    /// Run one round on the runtime in the background.
    pub fn spawn_sync(&self) -> JoinHandle<SyncReport> {
        tokio::spawn(run_round(self.id, self.orchestrator.clone(), self.engine()))
    }

    /// Tear down the guard. Results still in flight are discarded when they
    /// arrive.
    pub fn unmount(&self) {
        if self.guard.is_active() {
            info!(session = %self.id, revision = self.publisher.revision(), "Unmounting sync session");
        }
        self.guard.tear_down();
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn run_round(id: Uuid, orchestrator: FetchOrchestrator, engine: MergeEngine) -> SyncReport {
    if !engine.guard().is_active() {
        debug!(session = %id, "Session unmounted; skipping sync round");
        let now = chrono::Utc::now();
        return SyncReport {
            started_at: now,
            finished_at: now,
            sources: Vec::new(),
        };
    }

    orchestrator
        .run(|delta| engine.apply(delta))
        .instrument(info_span!("sync", session = %id))
        .await
}
