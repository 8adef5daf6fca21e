use serde::{Deserialize, Serialize};
use std::fmt;

/// Headline business figures shown on the dashboard cards.
///
/// Values are display strings (`"$24,680"`, `"1,248"`); the backend is free to
/// send pre-formatted text or raw numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub revenue: String,
    pub customers: String,
    pub pending_orders: String,
}

impl SummaryMetrics {
    pub fn new(revenue: &str, customers: &str, pending_orders: &str) -> Self {
        Self {
            revenue: revenue.to_string(),
            customers: customers.to_string(),
            pending_orders: pending_orders.to_string(),
        }
    }

    pub fn get(&self, field: SummaryField) -> &str {
        match field {
            SummaryField::Revenue => &self.revenue,
            SummaryField::Customers => &self.customers,
            SummaryField::PendingOrders => &self.pending_orders,
        }
    }

    pub fn set(&mut self, field: SummaryField, value: String) {
        match field {
            SummaryField::Revenue => self.revenue = value,
            SummaryField::Customers => self.customers = value,
            SummaryField::PendingOrders => self.pending_orders = value,
        }
    }
}

/// The three independently sourced summary fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryField {
    Revenue,
    Customers,
    PendingOrders,
}

impl SummaryField {
    pub const ALL: [SummaryField; 3] = [
        SummaryField::Revenue,
        SummaryField::Customers,
        SummaryField::PendingOrders,
    ];

    /// Key used for this field in the `/monitoring/overview` payload.
    pub fn wire_key(&self) -> &'static str {
        match self {
            SummaryField::Revenue => "revenue",
            SummaryField::Customers => "customers",
            SummaryField::PendingOrders => "pending_orders",
        }
    }
}

impl fmt::Display for SummaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_key())
    }
}

/// Field-level update produced from a summary payload. `None` means the live
/// response did not supply a usable value for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPatch {
    pub revenue: Option<String>,
    pub customers: Option<String>,
    pub pending_orders: Option<String>,
}

impl SummaryPatch {
    pub fn get(&self, field: SummaryField) -> Option<&str> {
        match field {
            SummaryField::Revenue => self.revenue.as_deref(),
            SummaryField::Customers => self.customers.as_deref(),
            SummaryField::PendingOrders => self.pending_orders.as_deref(),
        }
    }

    pub fn set(&mut self, field: SummaryField, value: String) {
        match field {
            SummaryField::Revenue => self.revenue = Some(value),
            SummaryField::Customers => self.customers = Some(value),
            SummaryField::PendingOrders => self.pending_orders = Some(value),
        }
    }

    /// Fields carried by this patch, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (SummaryField, &str)> {
        SummaryField::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}

/// One point of the activity chart. Sequences are kept in the order received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub label: String,
    pub revenue: f64,
    pub orders: f64,
    pub active: f64,
}

impl TimeSeriesPoint {
    pub fn new(label: &str, revenue: f64, orders: f64, active: f64) -> Self {
        Self {
            label: label.to_string(),
            revenue,
            orders,
            active,
        }
    }
}
