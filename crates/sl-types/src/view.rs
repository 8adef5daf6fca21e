//! The view model handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::metrics::{SummaryField, SummaryMetrics, TimeSeriesPoint};
use crate::risk::{RiskCollection, RiskStats};

/// Where the value currently held for a slice came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Fallback,
    Live,
}

/// Per-slice provenance flags. Not rendered; kept for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewProvenance {
    pub revenue: Provenance,
    pub customers: Provenance,
    pub pending_orders: Provenance,
    pub timeseries: Provenance,
    pub active_risks: Provenance,
    pub historical_risks: Provenance,
}

impl ViewProvenance {
    pub fn summary_field(&self, field: SummaryField) -> Provenance {
        match field {
            SummaryField::Revenue => self.revenue,
            SummaryField::Customers => self.customers,
            SummaryField::PendingOrders => self.pending_orders,
        }
    }

    pub fn mark_summary_field(&mut self, field: SummaryField) {
        match field {
            SummaryField::Revenue => self.revenue = Provenance::Live,
            SummaryField::Customers => self.customers = Provenance::Live,
            SummaryField::PendingOrders => self.pending_orders = Provenance::Live,
        }
    }

    /// True when every slice still holds fallback data.
    pub fn is_all_fallback(&self) -> bool {
        *self == ViewProvenance::default()
    }
}

/// Complete, always-valid state consumed by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub summary: SummaryMetrics,
    pub timeseries: Vec<TimeSeriesPoint>,
    pub risks: RiskCollection,
    pub provenance: ViewProvenance,
}

impl ViewModel {
    /// Build a view model whose every slice is flagged as fallback data.
    pub fn from_fallback(
        summary: SummaryMetrics,
        timeseries: Vec<TimeSeriesPoint>,
        risks: RiskCollection,
    ) -> Self {
        Self {
            summary,
            timeseries,
            risks,
            provenance: ViewProvenance::default(),
        }
    }

    /// Risk statistics, computed from the current collections on every call.
    pub fn risk_stats(&self) -> RiskStats {
        self.risks.stats()
    }
}
