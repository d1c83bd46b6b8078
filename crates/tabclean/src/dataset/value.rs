//! Dynamically typed cell values.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Tokens that denote a missing value when they appear as text.
const NULL_TOKENS: &[&str] = &["", "na", "n/a", "nan", "null", "none", "nil"];

/// Date-only formats recognised for temporal cells.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Date-time formats recognised for temporal cells.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// A single cell in a [`Dataset`](super::Dataset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Numeric value. `NaN` is treated as missing; infinities are not numeric data.
    Number(f64),
    /// Free text.
    Text(String),
    /// Boolean value.
    Boolean(bool),
    /// Date and/or time without a zone.
    Temporal(NaiveDateTime),
    /// No value.
    Missing,
}

/// The kind of a non-missing cell after looking through text encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Numeric,
    Text,
    Boolean,
    Temporal,
}

/// Hashable identity of a cell, used for duplicate detection and mode counting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Number(u64),
    Text(String),
    Boolean(bool),
    Temporal(NaiveDateTime),
    Missing,
}

impl Value {
    /// Infer a typed cell from raw text, the way an ingestion layer would.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_null_token(trimmed) {
            return Value::Missing;
        }
        if let Some(n) = parse_finite(trimmed) {
            return Value::Number(n);
        }
        if let Some(b) = parse_bool_literal(trimmed) {
            return Value::Boolean(b);
        }
        if let Some(t) = parse_temporal(trimmed) {
            return Value::Temporal(t);
        }
        Value::Text(raw.to_string())
    }

    /// The single missing-value predicate shared by every handler.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            Value::Text(s) => is_null_token(s.trim()),
            Value::Boolean(_) | Value::Temporal(_) => false,
        }
    }

    /// Numeric view of the cell. Numeric text is parsed; everything else,
    /// including non-finite numbers, is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Text(s) => parse_finite(s.trim()),
            _ => None,
        }
    }

    /// Classify a non-missing cell. Returns `None` for missing cells.
    pub fn kind(&self) -> Option<CellKind> {
        if self.is_missing() {
            return None;
        }
        let kind = match self {
            Value::Number(n) if n.is_finite() => CellKind::Numeric,
            Value::Number(_) => CellKind::Text,
            Value::Boolean(_) => CellKind::Boolean,
            Value::Temporal(_) => CellKind::Temporal,
            Value::Text(s) => {
                let trimmed = s.trim();
                if parse_finite(trimmed).is_some() {
                    CellKind::Numeric
                } else if parse_bool_literal(trimmed).is_some() {
                    CellKind::Boolean
                } else if parse_temporal(trimmed).is_some() {
                    CellKind::Temporal
                } else {
                    CellKind::Text
                }
            }
            Value::Missing => return None,
        };
        Some(kind)
    }

    /// Hashable identity. All missing encodings collapse to [`CellKey::Missing`].
    pub fn key(&self) -> CellKey {
        if self.is_missing() {
            return CellKey::Missing;
        }
        match self {
            // -0.0 and 0.0 compare equal, so they must hash equal too.
            Value::Number(n) => CellKey::Number(if *n == 0.0 { 0 } else { n.to_bits() }),
            Value::Text(s) => CellKey::Text(s.clone()),
            Value::Boolean(b) => CellKey::Boolean(*b),
            Value::Temporal(t) => CellKey::Temporal(*t),
            Value::Missing => CellKey::Missing,
        }
    }

    /// Render the cell as text. Missing cells render as an empty string.
    pub fn render(&self) -> String {
        if self.is_missing() {
            return String::new();
        }
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Temporal(t) => {
                if t.time() == NaiveTime::MIN {
                    write!(f, "{}", t.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            Value::Missing => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// Check if trimmed text is a missing-value token.
pub fn is_null_token(trimmed: &str) -> bool {
    NULL_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Parse a finite number. `inf`, `Infinity` and `NaN` spellings are rejected.
pub(crate) fn parse_finite(trimmed: &str) -> Option<f64> {
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse `true`/`false` (case-insensitive).
pub(crate) fn parse_bool_literal(trimmed: &str) -> Option<bool> {
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parse a date or date-time string using the supported formats.
pub fn parse_temporal(trimmed: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}
