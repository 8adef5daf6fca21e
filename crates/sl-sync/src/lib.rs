//! Resilient view-model synchronization for the Sightline dashboard.
//!
//! Provides:
//! - Concurrent, independent fetching of the summary, time-series and risk sources
//! - Partial (per-field) and atomic (per-collection) merging over fallback data
//! - A mount guard that suppresses writes after the subscriber goes away
//! - Change notification for the presentation layer

pub mod config;
pub mod guard;
pub mod merge;
pub mod orchestrator;
pub mod publisher;
pub mod session;

pub use config::SyncConfig;
pub use guard::{MountGuard, MountState};
pub use merge::{apply_delta, Delta, MergeEngine, MergeOutcome};
pub use orchestrator::{FetchOrchestrator, SourceOutcome, SourceReport, SyncReport};
pub use publisher::ViewModelPublisher;
pub use session::SyncSession;
