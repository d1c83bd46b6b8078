//! Per-operation statistics reports.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single metric value in a [`StatsReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Bool(bool),
    Count(u64),
    Float(f64),
    Text(String),
}

impl StatValue {
    /// Numeric view of the metric, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Count(n) => Some(*n as f64),
            StatValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Bool(b) => write!(f, "{}", b),
            StatValue::Count(n) => write!(f, "{}", n),
            StatValue::Float(x) => write!(f, "{}", x),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<usize> for StatValue {
    fn from(n: usize) -> Self {
        StatValue::Count(n as u64)
    }
}

impl From<f64> for StatValue {
    fn from(x: f64) -> Self {
        StatValue::Float(x)
    }
}

impl From<bool> for StatValue {
    fn from(b: bool) -> Self {
        StatValue::Bool(b)
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

impl From<String> for StatValue {
    fn from(s: String) -> Self {
        StatValue::Text(s)
    }
}

/// What a single operation did to the dataset.
///
/// Produced fresh for every call and never merged with another report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    /// Operation name (e.g. `outliers`).
    pub operation: String,

    /// Column the operation targeted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Named metrics in insertion order.
    pub metrics: IndexMap<String, StatValue>,

    /// Row indices (before the operation) whose cells were changed, removed or flagged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_rows: Vec<usize>,
}

impl StatsReport {
    /// Create an empty report.
    pub fn new(operation: impl Into<String>, column: Option<&str>) -> Self {
        Self {
            operation: operation.into(),
            column: column.map(str::to_string),
            metrics: IndexMap::new(),
            affected_rows: Vec::new(),
        }
    }

    /// Record a metric, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<StatValue>) {
        self.metrics.insert(name.into(), value.into());
    }

    /// Builder form of [`StatsReport::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_affected_rows(mut self, rows: Vec<usize>) -> Self {
        self.affected_rows = rows;
        self
    }

    pub fn get(&self, name: &str) -> Option<&StatValue> {
        self.metrics.get(name)
    }

    /// Get a count metric.
    pub fn count(&self, name: &str) -> Option<u64> {
        match self.metrics.get(name) {
            Some(StatValue::Count(n)) => Some(*n),
            _ => None,
        }
    }

    /// Get a numeric metric (count or float).
    pub fn number(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(StatValue::as_f64)
    }

    /// Get a text metric.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.metrics.get(name) {
            Some(StatValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Get a boolean metric.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.metrics.get(name) {
            Some(StatValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}
