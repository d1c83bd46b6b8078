//! Descriptive column profiles.

use std::collections::HashSet;

use serde::Serialize;

use crate::dataset::{Dataset, Value};
use crate::error::Result;
use crate::stats::{self, NumericStatistics};
use crate::typing::{ColumnType, classify};

/// Summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub column_type: ColumnType,
    /// Non-missing cells.
    pub count: usize,
    pub missing_count: usize,
    /// Distinct non-missing values.
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericProfile>,
}

/// Distribution statistics for numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericProfile {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub q1: f64,
    pub q3: f64,
    /// Population skewness.
    pub skewness: f64,
    /// Population excess kurtosis.
    pub kurtosis: f64,
}

impl NumericProfile {
    fn from_values(present: &[f64]) -> Option<Self> {
        let summary = NumericStatistics::from_values(present)?;
        let numbers: Vec<Value> = present.iter().copied().map(Value::Number).collect();
        let mode = stats::mode(&numbers).and_then(|v| v.as_f64()).unwrap_or(summary.mean);
        let (skewness, kurtosis) = shape(present, summary.mean);

        Some(Self {
            min: summary.min,
            max: summary.max,
            mean: summary.mean,
            median: summary.median,
            mode,
            std: summary.std,
            q1: summary.q1,
            q3: summary.q3,
            skewness,
            kurtosis,
        })
    }
}

/// Skewness and excess kurtosis from central moments. Both zero without spread.
fn shape(values: &[f64], mean: f64) -> (f64, f64) {
    let n = values.len() as f64;
    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &x| {
        let d = x - mean;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });
    let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);
    if m2 == 0.0 {
        return (0.0, 0.0);
    }
    (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
}

/// Profile a single column.
pub fn profile_column(dataset: &Dataset, column: &str) -> Result<ColumnProfile> {
    let values = dataset.require_column(column)?;
    Ok(build_profile(column, values))
}

/// Profile every column in order.
pub fn profile_dataset(dataset: &Dataset) -> Vec<ColumnProfile> {
    dataset
        .columns()
        .map(|(name, values)| build_profile(name, values))
        .collect()
}

fn build_profile(name: &str, values: &[Value]) -> ColumnProfile {
    let column_type = classify(values);
    let missing_count = values.iter().filter(|v| v.is_missing()).count();
    let unique_count = values
        .iter()
        .filter(|v| !v.is_missing())
        .map(Value::key)
        .collect::<HashSet<_>>()
        .len();

    let numeric = if column_type.is_numeric() {
        let present: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
        NumericProfile::from_values(&present)
    } else {
        None
    };

    ColumnProfile {
        name: name.to_string(),
        column_type,
        count: values.len() - missing_count,
        missing_count,
        unique_count,
        numeric,
    }
}
