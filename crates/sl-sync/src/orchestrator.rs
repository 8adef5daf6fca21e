//! Fetch orchestrator: one concurrent, independent request per source.
//!
//! All requests are issued up front and polled together from a single task.
//! Each result is normalized and handed to the sink the moment it resolves, so
//! a slow or failing source never holds back the others. There is no retry,
//! no backoff and no timeout of our own.

use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sl_data::{EndpointDescriptor, EndpointSet, SchemaNormalizer, SourceKind, Transport};
use sl_types::{FailureClass, ShapeError, SourceError};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::merge::{Delta, MergeOutcome};

/// What happened to one source during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceOutcome {
    Merged,
    /// Fetched and normalized, but the subscriber was gone.
    Suppressed,
    Failed(FailureClass),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub kind: SourceKind,
    pub path: String,
    pub outcome: SourceOutcome,
}

/// Per-round diagnostics. Never shown to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// In completion order.
    pub sources: Vec<SourceReport>,
}

impl SyncReport {
    pub fn outcome(&self, kind: SourceKind) -> Option<SourceOutcome> {
        self.sources.iter().find(|s| s.kind == kind).map(|s| s.outcome)
    }

    pub fn merged_count(&self) -> usize {
        self.count(|o| o == SourceOutcome::Merged)
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, SourceOutcome::Failed(_)))
    }

    pub fn completion_order(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind).collect()
    }

    fn count(&self, pred: impl Fn(SourceOutcome) -> bool) -> usize {
        self.sources.iter().filter(|s| pred(s.outcome)).count()
    }
}

/// Normalize a raw payload according to the source it came from.
pub fn normalize_payload(kind: SourceKind, payload: &Value) -> Result<Delta, ShapeError> {
    match kind {
        SourceKind::Summary => SchemaNormalizer::normalize_summary(payload).map(Delta::Summary),
        SourceKind::TimeSeries => {
            SchemaNormalizer::normalize_timeseries(payload).map(Delta::TimeSeries)
        }
        SourceKind::Risks => SchemaNormalizer::normalize_risks(payload).map(Delta::Risks),
    }
}

/// Issues the declared requests for one round and routes their results.
#[derive(Debug, Clone)]
pub struct FetchOrchestrator {
    transport: Arc<dyn Transport>,
    descriptors: Vec<EndpointDescriptor>,
}

impl FetchOrchestrator {
    pub fn new(transport: Arc<dyn Transport>, endpoints: &EndpointSet) -> Self {
        Self::with_descriptors(transport, endpoints.descriptors())
    }

    pub fn with_descriptors(transport: Arc<dyn Transport>, descriptors: Vec<EndpointDescriptor>) -> Self {
        Self {
            transport,
            descriptors,
        }
    }

    pub fn descriptors(&self) -> &[EndpointDescriptor] {
        &self.descriptors
    }

    /// Fetch and normalize a single source.
    pub async fn fetch(
        transport: &dyn Transport,
        descriptor: &EndpointDescriptor,
    ) -> Result<Delta, SourceError> {
        let payload = transport.get_json(&descriptor.path).await?;
        normalize_payload(descriptor.kind, &payload)
            .map_err(|e| SourceError::shape(&descriptor.path, e))
    }

    /// Run one round. `sink` is called synchronously, once per successful
    /// source, in completion order; failures only get logged.
    pub async fn run<F>(&self, mut sink: F) -> SyncReport
    where
        F: FnMut(Delta) -> MergeOutcome,
    {
        let started_at = Utc::now();
        info!(
            transport = self.transport.name(),
            sources = self.descriptors.len(),
            "Starting sync round"
        );

        let mut pending: FuturesUnordered<_> = self
            .descriptors
            .iter()
            .map(|descriptor| async move {
                let result = Self::fetch(self.transport.as_ref(), descriptor).await;
                (descriptor, result)
            })
            .collect();

        let mut sources = Vec::with_capacity(self.descriptors.len());
        while let Some((descriptor, result)) = pending.next().await {
            let outcome = match result {
                Ok(delta) => match sink(delta) {
                    MergeOutcome::Applied { .. } => SourceOutcome::Merged,
                    MergeOutcome::Suppressed => SourceOutcome::Suppressed,
                },
                Err(e) => {
                    warn!(source = %descriptor.kind, error = %e, "Source failed; keeping current data");
                    SourceOutcome::Failed(e.class())
                }
            };
            debug!(source = %descriptor.kind, outcome = ?outcome, "Source resolved");
            sources.push(SourceReport {
                kind: descriptor.kind,
                path: descriptor.path.clone(),
                outcome,
            });
        }

        let report = SyncReport {
            started_at,
            finished_at: Utc::now(),
            sources,
        };
        info!(
            merged = report.merged_count(),
            failed = report.failed_count(),
            "Sync round finished"
        );
        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Canned response for one path.
    #[derive(Debug, Clone)]
    pub(crate) enum Reply {
        Json(Value),
        Status(u16),
        Refused,
        NotJson,
    }

    /// In-memory transport with an optional per-path delay. A path given
    /// several replies serves them in order and then repeats the last one.
    #[derive(Debug, Default)]
    pub(crate) struct StubTransport {
        replies: Mutex<HashMap<String, VecDeque<(Duration, Reply)>>>,
    }

    impl StubTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn reply(self, path: &str, reply: Reply) -> Self {
            self.delayed(path, Duration::ZERO, reply)
        }

        pub(crate) fn delayed(self, path: &str, delay: Duration, reply: Reply) -> Self {
            self.replies
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default()
                .push_back((delay, reply));
            self
        }

        fn next_reply(&self, path: &str) -> Option<(Duration, Reply)> {
            let mut replies = self.replies.lock().unwrap();
            let queue = replies.get_mut(path)?;
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get_json(&self, path: &str) -> Result<Value, SourceError> {
            let Some((delay, reply)) = self.next_reply(path) else {
                return Err(SourceError::Status { endpoint: path.to_string(), status: 404 });
            };
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match reply {
                Reply::Json(value) => Ok(value),
                Reply::Status(status) => Err(SourceError::Status { endpoint: path.to_string(), status }),
                Reply::Refused => Err(SourceError::Transport {
                    endpoint: path.to_string(),
                    message: "connection refused".to_string(),
                }),
                Reply::NotJson => Err(SourceError::Decode {
                    endpoint: path.to_string(),
                    message: "expected value at line 1 column 1".to_string(),
                }),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    pub(crate) fn summary_reply() -> Reply {
        Reply::Json(json!({ "summary": { "revenue": "9000" } }))
    }

    pub(crate) fn timeseries_reply() -> Reply {
        Reply::Json(json!({ "timeseries": [{ "label": "Q1", "revenue": 10, "orders": 2, "active": 5 }] }))
    }

    pub(crate) fn risks_reply() -> Reply {
        Reply::Json(json!({
            "active_risks": [{ "id": "r1", "severity": "HIGH", "title": "T", "explanation": "E" }],
            "historical_risks": []
        }))
    }

    fn orchestrator(stub: StubTransport) -> FetchOrchestrator {
        FetchOrchestrator::new(Arc::new(stub), &EndpointSet::default())
    }

    #[tokio::test]
    async fn test_all_sources_succeed() {
        let stub = StubTransport::new()
            .reply("/monitoring/overview", summary_reply())
            .reply("/api/monitoring", timeseries_reply())
            .reply("/risks", risks_reply());

        let mut deltas = Vec::new();
        let report = orchestrator(stub)
            .run(|delta| {
                deltas.push(delta);
                MergeOutcome::Applied { changed: true }
            })
            .await;

        assert_eq!(report.merged_count(), 3);
        assert_eq!(deltas.len(), 3);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_classified() {
        let stub = StubTransport::new()
            .reply("/monitoring/overview", Reply::Status(500))
            .reply("/api/monitoring", Reply::NotJson)
            .reply("/risks", risks_reply());

        let mut sources = Vec::new();
        let report = orchestrator(stub)
            .run(|delta| {
                sources.push(delta.source());
                MergeOutcome::Applied { changed: true }
            })
            .await;

        assert_eq!(sources, vec![SourceKind::Risks]);
        assert_eq!(
            report.outcome(SourceKind::Summary),
            Some(SourceOutcome::Failed(FailureClass::Transport))
        );
        assert_eq!(
            report.outcome(SourceKind::TimeSeries),
            Some(SourceOutcome::Failed(FailureClass::Decode))
        );
        assert_eq!(report.outcome(SourceKind::Risks), Some(SourceOutcome::Merged));
    }

    #[tokio::test]
    async fn test_shape_failure_invokes_nothing() {
        let stub = StubTransport::new()
            .reply("/monitoring/overview", Reply::Refused)
            .reply("/api/monitoring", Reply::Json(json!({ "timeseries": "oops" })))
            .reply("/risks", Reply::Json(json!({ "unrelated": true })));

        let mut calls = 0;
        let report = orchestrator(stub)
            .run(|_| {
                calls += 1;
                MergeOutcome::Applied { changed: true }
            })
            .await;

        assert_eq!(calls, 0);
        assert_eq!(report.failed_count(), 3);
        assert_eq!(
            report.outcome(SourceKind::TimeSeries),
            Some(SourceOutcome::Failed(FailureClass::Shape))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_are_delivered_in_completion_order() {
        let stub = StubTransport::new()
            .delayed("/monitoring/overview", Duration::from_millis(300), summary_reply())
            .delayed("/api/monitoring", Duration::from_millis(100), timeseries_reply())
            .delayed("/risks", Duration::from_millis(200), risks_reply());

        let report = orchestrator(stub)
            .run(|_| MergeOutcome::Applied { changed: true })
            .await;

        assert_eq!(
            report.completion_order(),
            vec![SourceKind::TimeSeries, SourceKind::Risks, SourceKind::Summary]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_run_concurrently() {
        let stub = StubTransport::new()
            .delayed("/monitoring/overview", Duration::from_secs(1), summary_reply())
            .delayed("/api/monitoring", Duration::from_secs(1), timeseries_reply())
            .delayed("/risks", Duration::from_secs(1), risks_reply());

        let start = tokio::time::Instant::now();
        orchestrator(stub)
            .run(|_| MergeOutcome::Applied { changed: true })
            .await;

        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_suppressed_outcome_is_reported() {
        let stub = StubTransport::new().reply("/risks", risks_reply());
        let report = FetchOrchestrator::with_descriptors(
            Arc::new(stub),
            vec![EndpointDescriptor::default_for(SourceKind::Risks)],
        )
        .run(|_| MergeOutcome::Suppressed)
        .await;

        assert_eq!(report.outcome(SourceKind::Risks), Some(SourceOutcome::Suppressed));
    }

    #[test]
    fn test_normalize_payload_dispatch() {
        let delta = normalize_payload(SourceKind::Summary, &json!({ "summary": { "customers": 5 } })).unwrap();
        assert_eq!(delta.source(), SourceKind::Summary);

        let delta = normalize_payload(SourceKind::TimeSeries, &json!({ "metrics": { "history": [] } })).unwrap();
        assert_eq!(delta, Delta::TimeSeries(Vec::new()));

        assert!(normalize_payload(SourceKind::Risks, &json!([])).is_err());
    }
}
