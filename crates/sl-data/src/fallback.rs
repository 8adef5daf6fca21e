//! Compiled-in defaults for every view model slice.
//!
//! The snapshot is built once per process and never mutated. It seeds each new
//! view model and stays in place for any slice whose live fetch never succeeds.

use once_cell::sync::Lazy;
use sl_types::{RiskCollection, RiskItem, Severity, SummaryMetrics, TimeSeriesPoint, Trend, ViewModel};

/// Immutable default data.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSnapshot {
    pub summary: SummaryMetrics,
    pub timeseries: Vec<TimeSeriesPoint>,
    pub risks: RiskCollection,
}

static SNAPSHOT: Lazy<FallbackSnapshot> = Lazy::new(|| FallbackSnapshot {
    summary: SummaryMetrics::new("$24,680", "1,248", "86"),
    timeseries: vec![
        TimeSeriesPoint::new("Mon", 4000.0, 240.0, 2400.0),
        TimeSeriesPoint::new("Tue", 3000.0, 139.0, 2210.0),
        TimeSeriesPoint::new("Wed", 2000.0, 980.0, 2290.0),
        TimeSeriesPoint::new("Thu", 2780.0, 390.0, 2000.0),
        TimeSeriesPoint::new("Fri", 1890.0, 480.0, 2181.0),
        TimeSeriesPoint::new("Sat", 2390.0, 380.0, 2500.0),
        TimeSeriesPoint::new("Sun", 3490.0, 430.0, 2100.0),
    ],
    risks: RiskCollection::new(
        vec![
            risk(
                "1",
                Severity::High,
                "Cash Flow Instability Forecast",
                "Based on current accounts receivable trends and upcoming tax liabilities, cash reserves may dip below safe thresholds in 6 days.",
                Trend::Deteriorating,
                "QuickBooks + Bank Feed",
                "94%",
            ),
            risk(
                "2",
                Severity::Medium,
                "Supply Chain Delay - Vendor A",
                "Vendor A has shown a 3-day average delay in shipment for the last 4 orders. This risks stockouts for product category Z.",
                Trend::Stable,
                "Shopify Inventory",
                "82%",
            ),
            risk(
                "3",
                Severity::Low,
                "Customer Churn Risk",
                "Engagement metrics for 3 key accounts have dropped by 15% over the last month.",
                Trend::Improving,
                "HubSpot",
                "65%",
            ),
            risk(
                "4",
                Severity::High,
                "Unusual Transaction Detected",
                "Transaction #9923 for $5,000 originates from an unrecognized IP address. Flagged as potential fraud.",
                Trend::New,
                "Stripe Payments",
                "99%",
            ),
        ],
        Vec::new(),
    ),
});

fn risk(
    id: &str,
    severity: Severity,
    title: &str,
    explanation: &str,
    trend: Trend,
    source: &str,
    confidence: &str,
) -> RiskItem {
    RiskItem {
        id: id.to_string(),
        severity,
        title: title.to_string(),
        explanation: explanation.to_string(),
        trend,
        source: source.to_string(),
        confidence: confidence.to_string(),
    }
}

/// Read-only access to the process-wide fallback snapshot.
pub struct FallbackStore;

impl FallbackStore {
    pub fn snapshot() -> &'static FallbackSnapshot {
        &SNAPSHOT
    }

    pub fn summary() -> &'static SummaryMetrics {
        &SNAPSHOT.summary
    }

    pub fn timeseries() -> &'static [TimeSeriesPoint] {
        &SNAPSHOT.timeseries
    }

    pub fn risks() -> &'static RiskCollection {
        &SNAPSHOT.risks
    }

    /// A fresh view model cloned from the snapshot, every slice flagged as
    /// fallback.
    pub fn view_model() -> ViewModel {
        let snapshot = Self::snapshot();
        ViewModel::from_fallback(
            snapshot.summary.clone(),
            snapshot.timeseries.clone(),
            snapshot.risks.clone(),
        )
    }
}
