use serde::{Deserialize, Serialize};
use std::fmt;

/// The independent data sources feeding the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Summary,
    TimeSeries,
    Risks,
}

/// How a source's normalized output is folded into the view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergePolicy {
    /// Field-by-field overwrite-or-retain.
    Partial,
    /// Whole-collection replace-or-retain.
    Atomic,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Summary, SourceKind::TimeSeries, SourceKind::Risks];

    pub fn merge_policy(&self) -> MergePolicy {
        match self {
            SourceKind::Summary => MergePolicy::Partial,
            SourceKind::TimeSeries | SourceKind::Risks => MergePolicy::Atomic,
        }
    }

    pub fn default_path(&self) -> &'static str {
        match self {
            SourceKind::Summary => "/monitoring/overview",
            SourceKind::TimeSeries => "/api/monitoring",
            SourceKind::Risks => "/risks",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Summary => "summary",
            SourceKind::TimeSeries => "timeseries",
            SourceKind::Risks => "risks",
        };
        write!(f, "{}", s)
    }
}

/// Where to fetch one source from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub kind: SourceKind,
    pub path: String,
}

impl EndpointDescriptor {
    pub fn new(kind: SourceKind, path: &str) -> Self {
        Self {
            kind,
            path: path.to_string(),
        }
    }

    pub fn default_for(kind: SourceKind) -> Self {
        Self::new(kind, kind.default_path())
    }
}

/// Paths of the three declared sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSet {
    pub summary: String,
    pub timeseries: String,
    pub risks: String,
}

impl Default for EndpointSet {
    fn default() -> Self {
        Self {
            summary: SourceKind::Summary.default_path().to_string(),
            timeseries: SourceKind::TimeSeries.default_path().to_string(),
            risks: SourceKind::Risks.default_path().to_string(),
        }
    }
}

impl EndpointSet {
    pub fn path(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Summary => &self.summary,
            SourceKind::TimeSeries => &self.timeseries,
            SourceKind::Risks => &self.risks,
        }
    }

    /// One descriptor per source, in declaration order.
    pub fn descriptors(&self) -> Vec<EndpointDescriptor> {
        SourceKind::ALL
            .iter()
            .map(|kind| EndpointDescriptor::new(*kind, self.path(*kind)))
            .collect()
    }
}
