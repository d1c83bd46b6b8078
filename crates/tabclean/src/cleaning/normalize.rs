//! Numeric rescaling.

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value};
use crate::error::{CleaningError, Result};
use crate::operation::OperationKind;
use crate::report::StatsReport;
use crate::stats::NumericStatistics;
use crate::typing::numeric_values;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMethod {
    MinMax,
    ZScore,
    Robust,
    Decimal,
}

impl NormalizeMethod {
    pub fn name(&self) -> &'static str {
        match self {
            NormalizeMethod::MinMax => "minmax",
            NormalizeMethod::ZScore => "zscore",
            NormalizeMethod::Robust => "robust",
            NormalizeMethod::Decimal => "decimal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    pub method: NormalizeMethod,
    /// Target range, used by [`NormalizeMethod::MinMax`] only.
    pub range_min: f64,
    pub range_max: f64,
}

impl NormalizeConfig {
    pub fn new(method: NormalizeMethod) -> Self {
        Self {
            method,
            range_min: 0.0,
            range_max: 1.0,
        }
    }

    pub fn with_range(mut self, range_min: f64, range_max: f64) -> Self {
        self.range_min = range_min;
        self.range_max = range_max;
        self
    }
}

/// Rescale the numeric `column` in place.
pub fn normalize(dataset: &mut Dataset, column: &str, config: &NormalizeConfig) -> Result<StatsReport> {
    if !config.range_min.is_finite() || !config.range_max.is_finite() {
        return Err(CleaningError::invalid("normalization range must be finite"));
    }
    if config.range_min > config.range_max {
        return Err(CleaningError::invalid(format!(
            "range_min {} is greater than range_max {}",
            config.range_min, config.range_max
        )));
    }

    let operation = OperationKind::Normalize.name();
    let values = dataset.require_column(column)?;
    let nums = numeric_values(values, column, operation)?;
    let summary = NumericStatistics::from_column(&nums).ok_or_else(|| {
        CleaningError::InapplicableOperation {
            operation: operation.to_string(),
            reason: format!("column '{}' has no numeric values", column),
        }
    })?;

    let transform = scaler(&summary, config);
    let mut scaled = Vec::with_capacity(values.len());
    let mut new_min = f64::INFINITY;
    let mut new_max = f64::NEG_INFINITY;
    let mut normalized = 0usize;
    for n in &nums {
        match n {
            Some(x) => {
                let y = transform(*x);
                new_min = new_min.min(y);
                new_max = new_max.max(y);
                normalized += 1;
                scaled.push(Value::Number(y));
            }
            None => scaled.push(Value::Missing),
        }
    }

    tracing::debug!(column, method = config.method.name(), new_min, new_max, "normalized column");

    dataset.replace_column(column, scaled)?;

    Ok(StatsReport::new(operation, Some(column))
        .with("method", config.method.name())
        .with("original_min", summary.min)
        .with("original_max", summary.max)
        .with("new_min", new_min)
        .with("new_max", new_max)
        .with("values_normalized", normalized)
        .with_affected_rows((0..nums.len()).filter(|&i| nums[i].is_some()).collect()))
}

/// Build the per-value transform. Degenerate spreads fall back to a safe form.
fn scaler(summary: &NumericStatistics, config: &NormalizeConfig) -> Box<dyn Fn(f64) -> f64> {
    let NumericStatistics { min, max, mean, std, q1, .. } = *summary;
    match config.method {
        NormalizeMethod::MinMax => {
            let (lo, hi) = (config.range_min, config.range_max);
            if max == min {
                Box::new(move |_: f64| lo)
            } else {
                Box::new(move |x: f64| lo + (x - min) / (max - min) * (hi - lo))
            }
        }
        NormalizeMethod::ZScore => {
            if std == 0.0 {
                Box::new(move |x: f64| x - mean)
            } else {
                Box::new(move |x: f64| (x - mean) / std)
            }
        }
        NormalizeMethod::Robust => {
            let iqr = summary.iqr();
            if iqr == 0.0 {
                Box::new(|x: f64| x)
            } else {
                Box::new(move |x: f64| (x - q1) / iqr)
            }
        }
        NormalizeMethod::Decimal => {
            let scale = decimal_scale(min.abs().max(max.abs()));
            Box::new(move |x: f64| x / scale)
        }
    }
}

/// `10^d` with `d` one less than the digit count of the integer part.
fn decimal_scale(max_abs: f64) -> f64 {
    if max_abs == 0.0 || !max_abs.is_finite() {
        return 1.0;
    }
    let digits = format!("{:.0}", max_abs.trunc()).len();
    10f64.powi(digits as i32 - 1)
}
