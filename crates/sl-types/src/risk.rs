//! Risk records and the statistics derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ShapeError;

/// Severity of a business risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl FromStr for Severity {
    type Err = ShapeError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(ShapeError::InvalidField {
                field: "severity".to_string(),
                message: format!("unknown severity '{s}'"),
            }),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction a risk has been moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Stable,
    Improving,
    Deteriorating,
    New,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Stable => "stable",
            Trend::Improving => "improving",
            Trend::Deteriorating => "deteriorating",
            Trend::New => "new",
        }
    }
}

impl FromStr for Trend {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(Trend::Stable),
            "improving" => Ok(Trend::Improving),
            "deteriorating" => Ok(Trend::Deteriorating),
            "new" => Ok(Trend::New),
            _ => Err(ShapeError::InvalidField {
                field: "trend".to_string(),
                message: format!("unknown trend '{s}'"),
            }),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single risk as shown on the risk assessment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskItem {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub explanation: String,
    pub trend: Trend,
    pub source: String,
    pub confidence: String,
}

/// Active and historical risks. The two lists never share an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCollection {
    pub active: Vec<RiskItem>,
    pub historical: Vec<RiskItem>,
}

impl RiskCollection {
    pub fn new(active: Vec<RiskItem>, historical: Vec<RiskItem>) -> Self {
        Self { active, historical }
    }

    /// Severity breakdown of the active list.
    pub fn severity_counts(&self) -> SeverityCounts {
        SeverityCounts::from_items(&self.active)
    }

    pub fn stats(&self) -> RiskStats {
        RiskStats {
            severity: self.severity_counts(),
            active: self.active.len(),
            resolved: self.historical.len(),
        }
    }
}

/// Whole-collection replacements carried by one risk response. Each side is
/// replaced independently; `None` leaves the held collection untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskPatch {
    pub active: Option<Vec<RiskItem>>,
    pub historical: Option<Vec<RiskItem>>,
}

impl RiskPatch {
    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.historical.is_none()
    }
}

/// Counts of active risks by dashboard bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// High severity.
    pub critical: usize,
    /// Medium severity.
    pub warning: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn from_items(items: &[RiskItem]) -> Self {
        let count = |severity: Severity| items.iter().filter(|r| r.severity == severity).count();
        Self {
            critical: count(Severity::High),
            warning: count(Severity::Medium),
            low: count(Severity::Low),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskStats {
    pub severity: SeverityCounts,
    pub active: usize,
    pub resolved: usize,
}
