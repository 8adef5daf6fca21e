//! Validation and reshaping of raw endpoint payloads.
//!
//! Every entry point takes an already-parsed [`serde_json::Value`] and either
//! returns canonical records or a [`ShapeError`]. Nothing here panics, and
//! rejection happens at the finest granularity each record kind allows:
//! individual fields for the summary, the whole array for the time series,
//! single items for risks.

use serde_json::{Map, Number, Value};
use sl_types::{
    RiskItem, RiskPatch, Severity, ShapeError, SummaryField, SummaryPatch, TimeSeriesPoint, Trend,
};
use std::collections::HashSet;

/// Accepted locations of the time-series array, in priority order.
pub const TIMESERIES_LAYOUTS: [TimeSeriesLayout; 3] = [
    TimeSeriesLayout::TopLevel,
    TimeSeriesLayout::MetricsTimeseries,
    TimeSeriesLayout::MetricsHistory,
];

/// One accepted shape of the `/api/monitoring` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSeriesLayout {
    /// `{ "timeseries": [...] }`
    TopLevel,
    /// `{ "metrics": { "timeseries": [...] } }`
    MetricsTimeseries,
    /// `{ "metrics": { "history": [...] } }`
    MetricsHistory,
}

impl TimeSeriesLayout {
    pub fn path(&self) -> &'static [&'static str] {
        match self {
            TimeSeriesLayout::TopLevel => &["timeseries"],
            TimeSeriesLayout::MetricsTimeseries => &["metrics", "timeseries"],
            TimeSeriesLayout::MetricsHistory => &["metrics", "history"],
        }
    }

    pub fn describe(&self) -> String {
        self.path().join(".")
    }

    /// The array at this layout's location, if the location exists and holds
    /// an array.
    pub fn locate<'a>(&self, payload: &'a Value) -> Option<&'a Vec<Value>> {
        self.path()
            .iter()
            .try_fold(payload, |node, key| node.get(*key))
            .and_then(Value::as_array)
    }
}

/// Stateless payload normalizer.
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    /// Extract the summary fields from a `/monitoring/overview` payload.
    ///
    /// Each field is validated on its own; a bad `revenue` does not stop
    /// `customers` from being accepted. A payload that yields no field at all
    /// is rejected as [`ShapeError::EmptyUpdate`].
    pub fn normalize_summary(payload: &Value) -> Result<SummaryPatch, ShapeError> {
        let root = as_mapping(payload, "$")?;
        let summary = root
            .get("summary")
            .ok_or_else(|| ShapeError::MissingField { field: "summary".to_string() })?;
        let summary = as_mapping(summary, "summary")?;

        let mut patch = SummaryPatch::default();
        for field in SummaryField::ALL {
            let Some(raw) = summary.get(field.wire_key()) else {
                continue;
            };
            match scalar_text(raw, field.wire_key()) {
                Ok(value) => patch.set(field, value),
                Err(e) => tracing::debug!(field = %field, "Rejected summary field: {}", e),
            }
        }

        if patch.is_empty() {
            return Err(ShapeError::EmptyUpdate);
        }
        Ok(patch)
    }

    /// Extract the chart series from an `/api/monitoring` payload.
    pub fn normalize_timeseries(payload: &Value) -> Result<Vec<TimeSeriesPoint>, ShapeError> {
        Self::normalize_timeseries_with_layout(payload).map(|(_, points)| points)
    }

    /// Like [`Self::normalize_timeseries`], also reporting which layout matched.
    ///
    /// The first layout whose location holds an array wins outright: if its
    /// points are malformed the payload is rejected, later layouts are not
    /// consulted.
    pub fn normalize_timeseries_with_layout(
        payload: &Value,
    ) -> Result<(TimeSeriesLayout, Vec<TimeSeriesPoint>), ShapeError> {
        as_mapping(payload, "$")?;

        let (layout, raw_points) = TIMESERIES_LAYOUTS
            .iter()
            .find_map(|layout| layout.locate(payload).map(|points| (*layout, points)))
            .ok_or_else(|| ShapeError::NoMatchingLayout {
                tried: TIMESERIES_LAYOUTS
                    .iter()
                    .map(TimeSeriesLayout::describe)
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        let points = raw_points
            .iter()
            .enumerate()
            .map(|(index, raw)| Self::normalize_point(raw, index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((layout, points))
    }

    fn normalize_point(raw: &Value, index: usize) -> Result<TimeSeriesPoint, ShapeError> {
        let location = format!("timeseries[{index}]");
        let point = as_mapping(raw, &location)?;

        let label = first_text(point, &["label", "name"])?.ok_or_else(|| {
            ShapeError::MissingField { field: format!("{location}.label") }
        })?;

        let number = |key: &str| -> Result<f64, ShapeError> {
            match point.get(key) {
                None | Some(Value::Null) => Ok(0.0),
                Some(value) => numeric(value, &format!("{location}.{key}")),
            }
        };

        Ok(TimeSeriesPoint {
            label,
            revenue: number("revenue")?,
            orders: number("orders")?,
            active: number("active")?,
        })
    }

    /// Extract the risk collections from a `/risks` payload.
    ///
    /// `active_risks` and `historical_risks` are handled independently. Items
    /// that fail validation are dropped; the surviving items still replace the
    /// collection as a whole.
    pub fn normalize_risks(payload: &Value) -> Result<RiskPatch, ShapeError> {
        let root = as_mapping(payload, "$")?;

        let active = Self::risk_array(root, "active_risks", &HashSet::new());
        let active_ids: HashSet<String> = active
            .iter()
            .flatten()
            .map(|item| item.id.clone())
            .collect();
        let historical = Self::risk_array(root, "historical_risks", &active_ids);

        let patch = RiskPatch { active, historical };
        if patch.is_empty() {
            return Err(ShapeError::EmptyUpdate);
        }
        Ok(patch)
    }

    fn risk_array(
        root: &Map<String, Value>,
        key: &str,
        excluded_ids: &HashSet<String>,
    ) -> Option<Vec<RiskItem>> {
        let raw = root.get(key)?;
        let Some(raw_items) = raw.as_array() else {
            tracing::warn!("Ignoring {}: expected an array", key);
            return None;
        };

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(raw_items.len());
        for (index, raw_item) in raw_items.iter().enumerate() {
            match Self::normalize_risk_item(raw_item) {
                Ok(item) if excluded_ids.contains(&item.id) => {
                    tracing::warn!("Skipping {}[{}]: id {} is already active", key, index, item.id);
                }
                Ok(item) if !seen.insert(item.id.clone()) => {
                    tracing::warn!("Skipping {}[{}]: duplicate id {}", key, index, item.id);
                }
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!("Skipping invalid risk at {}[{}]: {}", key, index, e),
            }
        }
        Some(items)
    }

    /// Normalize a single risk entry.
    ///
    /// Accepts both the dashboard field names and the backend's risk-engine
    /// names (`risk_id`, `risk_type`, `description`).
    pub fn normalize_risk_item(raw: &Value) -> Result<RiskItem, ShapeError> {
        let item = as_mapping(raw, "risk")?;

        let id = match item.get("id").filter(|v| !v.is_null()) {
            Some(value) => scalar_text(value, "id")?,
            None => match item.get("risk_id").filter(|v| !v.is_null()) {
                Some(value) => scalar_text(value, "risk_id")?,
                None => return Err(ShapeError::MissingField { field: "id".to_string() }),
            },
        };

        let severity: Severity = required_text(item, &["severity"], "severity")?.parse()?;
        let title = required_text(item, &["title", "risk_type"], "title")?;
        let explanation = required_text(item, &["explanation", "description"], "explanation")?;

        let trend = match first_text(item, &["trend"])? {
            Some(raw_trend) => raw_trend.parse()?,
            None => Trend::New,
        };
        let source = first_text(item, &["source", "risk_type"])?.unwrap_or_default();
        let confidence = match item.get("confidence") {
            None | Some(Value::Null) => String::new(),
            Some(Value::Number(n)) => percent(n),
            Some(value) => scalar_text(value, "confidence")?,
        };

        Ok(RiskItem {
            id,
            severity,
            title,
            explanation,
            trend,
            source,
            confidence,
        })
    }
}

fn as_mapping<'a>(value: &'a Value, location: &str) -> Result<&'a Map<String, Value>, ShapeError> {
    value.as_object().ok_or_else(|| ShapeError::NotAMapping {
        location: location.to_string(),
    })
}

/// A non-blank string or a number, as display text.
fn scalar_text(value: &Value, field: &str) -> Result<String, ShapeError> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::String(_) => Err(ShapeError::InvalidField {
            field: field.to_string(),
            message: "blank string".to_string(),
        }),
        Value::Number(n) => Ok(render_number(n)),
        other => Err(ShapeError::InvalidField {
            field: field.to_string(),
            message: format!("expected string or number, got {}", kind_of(other)),
        }),
    }
}

/// First candidate key holding a non-blank string. Null or blank values fall
/// through to the next key; any other type is an error.
fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Result<Option<String>, ShapeError> {
    for key in keys {
        match map.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.trim().is_empty() => continue,
            Some(Value::String(s)) => return Ok(Some(s.trim().to_string())),
            Some(other) => {
                return Err(ShapeError::InvalidField {
                    field: key.to_string(),
                    message: format!("expected string, got {}", kind_of(other)),
                })
            }
        }
    }
    Ok(None)
}

fn required_text(map: &Map<String, Value>, keys: &[&str], field: &str) -> Result<String, ShapeError> {
    first_text(map, keys)?.ok_or_else(|| ShapeError::MissingField { field: field.to_string() })
}

fn numeric(value: &Value, field: &str) -> Result<f64, ShapeError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).ok_or_else(|| ShapeError::InvalidField {
        field: field.to_string(),
        message: format!("expected a number, got {value}"),
    })
}

fn render_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Numeric confidence: a non-integral value strictly between 0 and 1 is a
/// fraction and is scaled to percent. Whole numbers are already percent,
/// whether encoded as `1` or `1.0`.
fn percent(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if f.fract() != 0.0 && f > 0.0 && f < 1.0 => {
            let scaled = (f * 10_000.0).round() / 100.0;
            match Number::from_f64(scaled) {
                Some(scaled) => format!("{}%", render_number(&scaled)),
                None => format!("{}%", render_number(n)),
            }
        }
        _ => format!("{}%", render_number(n)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
