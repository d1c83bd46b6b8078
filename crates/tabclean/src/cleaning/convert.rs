//! Column type conversion with strict or coercing failure policy.

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value, parse_temporal};
use crate::error::{CleaningError, Result};
use crate::operation::OperationKind;
use crate::report::StatsReport;
use crate::typing::classify;

/// Target semantic type for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Integer,
    Float,
    String,
    Boolean,
    Temporal,
}

impl TargetType {
    pub fn name(&self) -> &'static str {
        match self {
            TargetType::Integer => "integer",
            TargetType::Float => "float",
            TargetType::String => "string",
            TargetType::Boolean => "boolean",
            TargetType::Temporal => "temporal",
        }
    }
}

/// What to do with a cell that cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Replace the cell with a missing value and carry on.
    #[default]
    Coerce,
    /// Abort the whole conversion on the first bad cell.
    Strict,
}

/// Conversion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub target: TargetType,
    #[serde(default)]
    pub on_error: OnError,
}

impl ConversionConfig {
    pub fn new(target: TargetType, on_error: OnError) -> Self {
        Self { target, on_error }
    }
}

/// Convert every cell of `column` to `config.target`.
///
/// Under [`OnError::Strict`] the dataset is left untouched when any cell fails.
pub fn convert(dataset: &mut Dataset, column: &str, config: &ConversionConfig) -> Result<StatsReport> {
    let values = dataset.require_column(column)?;
    let original_type = classify(values);

    let mut converted = Vec::with_capacity(values.len());
    let mut affected = Vec::new();
    let mut values_converted = 0usize;
    let mut coerced_to_missing = 0usize;

    for (row, value) in values.iter().enumerate() {
        if value.is_missing() {
            converted.push(value.clone());
            continue;
        }
        match convert_cell(value, config.target) {
            Some(new_value) => {
                if new_value != *value {
                    affected.push(row);
                }
                values_converted += 1;
                converted.push(new_value);
            }
            None if config.on_error == OnError::Strict => {
                tracing::debug!(column, row, target = config.target.name(), "strict conversion failed");
                return Err(CleaningError::Conversion {
                    column: column.to_string(),
                    row,
                    value: value.render(),
                    target: config.target.name().to_string(),
                });
            }
            None => {
                affected.push(row);
                coerced_to_missing += 1;
                converted.push(Value::Missing);
            }
        }
    }

    dataset.replace_column(column, converted)?;

    Ok(StatsReport::new(OperationKind::DataType.name(), Some(column))
        .with("original_type", original_type.name())
        .with("new_type", config.target.name())
        .with("conversion_successful", true)
        .with("values_converted", values_converted)
        .with("values_coerced_to_missing", coerced_to_missing)
        .with_affected_rows(affected))
}

/// Convert a single non-missing cell. `None` means unparseable.
pub fn convert_cell(value: &Value, target: TargetType) -> Option<Value> {
    match target {
        TargetType::Integer => to_float(value)
            .filter(|n| n.is_finite() && n.fract() == 0.0)
            .map(Value::Number),
        TargetType::Float => to_float(value).map(Value::Number),
        TargetType::String => Some(Value::Text(value.render())),
        TargetType::Boolean => to_bool(value).map(Value::Boolean),
        TargetType::Temporal => match value {
            Value::Temporal(_) => Some(value.clone()),
            Value::Text(s) => parse_temporal(s.trim()).map(Value::Temporal),
            _ => None,
        },
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => {
            let trimmed = s.trim();
            // i64 first so large integers keep their exact text meaning
            trimmed
                .parse::<i64>()
                .map(|n| n as f64)
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok())
                .filter(|n| n.is_finite())
        }
        other => other.as_f64(),
    }
}

/// Fixed literal set: true-like {"true", "1", 1, true}, false-like {"false", "0", 0, false}.
fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Boolean(b) => Some(*b),
        Value::Number(n) if *n == 1.0 => Some(true),
        Value::Number(n) if *n == 0.0 => Some(false),
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
                Some(true)
            } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}
