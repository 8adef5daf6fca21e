//! Merge engine: folds normalized deltas into the view model.
//!
//! Summary fields use a partial merge (each supplied field overwrites, the rest
//! are retained). The time series and each risk list use an atomic merge (the
//! whole collection is replaced or left alone). Every source writes a disjoint
//! slice and nothing is derived during a merge, so deltas from different
//! sources commute.
//!
//! Both risk lists belong to the risks source. After any risks merge the
//! historical list holds no id that is in the active list; on a clash the
//! active entry is kept.

use serde::{Deserialize, Serialize};
use sl_data::{MergePolicy, SourceKind};
use sl_types::{Provenance, RiskItem, RiskPatch, SummaryPatch, TimeSeriesPoint, ViewModel};
use std::collections::HashSet;
use tracing::debug;

use crate::guard::MountGuard;
use crate::publisher::ViewModelPublisher;

/// Normalized output of one successful source response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Delta {
    Summary(SummaryPatch),
    TimeSeries(Vec<TimeSeriesPoint>),
    Risks(RiskPatch),
}

impl Delta {
    pub fn source(&self) -> SourceKind {
        match self {
            Delta::Summary(_) => SourceKind::Summary,
            Delta::TimeSeries(_) => SourceKind::TimeSeries,
            Delta::Risks(_) => SourceKind::Risks,
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.source().merge_policy()
    }
}

/// Apply a delta to a view model. Returns whether any value or provenance flag
/// changed.
pub fn apply_delta(vm: &mut ViewModel, delta: Delta) -> bool {
    let before_provenance = vm.provenance;
    let changed = match delta {
        Delta::Summary(patch) => {
            let mut changed = false;
            for (field, value) in patch.fields() {
                if vm.summary.get(field) != value {
                    vm.summary.set(field, value.to_string());
                    changed = true;
                }
                vm.provenance.mark_summary_field(field);
            }
            changed
        }
        Delta::TimeSeries(points) => {
            vm.provenance.timeseries = Provenance::Live;
            replace(&mut vm.timeseries, points)
        }
        Delta::Risks(RiskPatch { active, historical }) => {
            let mut changed = false;
            if let Some(active) = active {
                vm.provenance.active_risks = Provenance::Live;
                changed |= replace(&mut vm.risks.active, active);
            }
            // Active wins: a historical entry never shares an id with the
            // active list held after this merge, whichever side was supplied.
            let active_ids: HashSet<&str> = vm.risks.active.iter().map(|r| r.id.as_str()).collect();
            let historical = match historical {
                Some(historical) => {
                    vm.provenance.historical_risks = Provenance::Live;
                    historical
                }
                None => vm.risks.historical.clone(),
            };
            let historical: Vec<RiskItem> = historical
                .into_iter()
                .filter(|item| {
                    let clash = active_ids.contains(item.id.as_str());
                    if clash {
                        debug!(id = %item.id, "Dropping historical risk that is also active");
                    }
                    !clash
                })
                .collect();
            changed |= replace(&mut vm.risks.historical, historical);
            changed
        }
    };
    changed || vm.provenance != before_provenance
}

fn replace<T: PartialEq>(slot: &mut Vec<T>, incoming: Vec<T>) -> bool {
    if *slot == incoming {
        return false;
    }
    *slot = incoming;
    true
}

/// Result of handing a delta to the [`MergeEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeOutcome {
    /// The delta was merged and subscribers notified.
    Applied { changed: bool },
    /// The subscriber was torn down; nothing was written.
    Suppressed,
}

/// Guarded writer for one subscriber's view model.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    guard: MountGuard,
    publisher: ViewModelPublisher,
}

impl MergeEngine {
    pub fn new(guard: MountGuard, publisher: ViewModelPublisher) -> Self {
        Self { guard, publisher }
    }

    /// Merge a delta unless the guard has been torn down.
    pub fn apply(&self, delta: Delta) -> MergeOutcome {
        if !self.guard.is_active() {
            debug!(source = %delta.source(), "Discarding delta after teardown");
            return MergeOutcome::Suppressed;
        }

        let source = delta.source();
        let policy = delta.policy();
        let changed = self.publisher.publish(|vm| apply_delta(vm, delta));
        debug!(source = %source, policy = ?policy, changed, "Merged delta");
        MergeOutcome::Applied { changed }
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    pub fn publisher(&self) -> &ViewModelPublisher {
        &self.publisher
    }
}
