//! Outlier detection and handling for numeric columns.

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value};
use crate::error::{CleaningError, Result};
use crate::operation::OperationKind;
use crate::report::StatsReport;
use crate::stats::{self, NumericStatistics};
use crate::typing::numeric_values;

/// Detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Bounds at `Q1 - t*IQR` and `Q3 + t*IQR`.
    Iqr,
    /// Flag `|x - mean| / std > t`.
    ZScore,
    /// Keep the central fraction `t` of the distribution.
    Percentile,
}

impl OutlierMethod {
    pub fn name(&self) -> &'static str {
        match self {
            OutlierMethod::Iqr => "iqr",
            OutlierMethod::ZScore => "zscore",
            OutlierMethod::Percentile => "percentile",
        }
    }
}

/// What to do with flagged values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierAction {
    /// Clip flagged values to the bounds.
    Cap,
    /// Delete rows holding flagged values.
    Remove,
    /// Add a boolean companion column; the source column is untouched.
    Mark,
}

impl OutlierAction {
    pub fn name(&self) -> &'static str {
        match self {
            OutlierAction::Cap => "cap",
            OutlierAction::Remove => "remove",
            OutlierAction::Mark => "mark",
        }
    }
}

/// Outlier handling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierConfig {
    pub method: OutlierMethod,
    pub action: OutlierAction,
    pub threshold: f64,
    /// Suffix of the column added by [`OutlierAction::Mark`].
    pub marker_suffix: String,
}

impl OutlierConfig {
    pub fn new(method: OutlierMethod, action: OutlierAction, threshold: f64) -> Self {
        Self {
            method,
            action,
            threshold,
            marker_suffix: "_is_outlier".to_string(),
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(CleaningError::invalid(format!(
                "outlier threshold must be a positive number, got {}",
                self.threshold
            )));
        }
        if self.method == OutlierMethod::Percentile && self.threshold > 1.0 {
            return Err(CleaningError::invalid(format!(
                "percentile threshold is a fraction in (0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Inclusive range of accepted values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    /// Compute bounds for `method` with threshold `t`.
    pub fn compute(summary: &NumericStatistics, present: &[f64], method: OutlierMethod, t: f64) -> Self {
        match method {
            OutlierMethod::Iqr => Self {
                lower: summary.q1 - t * summary.iqr(),
                upper: summary.q3 + t * summary.iqr(),
            },
            OutlierMethod::ZScore => Self {
                lower: summary.mean - t * summary.std,
                upper: summary.mean + t * summary.std,
            },
            OutlierMethod::Percentile => {
                let sorted = stats::sorted(present);
                let tail = (1.0 - t) / 2.0;
                Self {
                    lower: stats::quantile(&sorted, tail),
                    upper: stats::quantile(&sorted, 1.0 - tail),
                }
            }
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

/// Detect outliers in `column` and apply the configured action.
pub fn detect_and_handle(
    dataset: &mut Dataset,
    column: &str,
    config: &OutlierConfig,
) -> Result<StatsReport> {
    config.validate()?;

    let operation = OperationKind::Outliers.name();
    let values = dataset.require_column(column)?;
    let nums = numeric_values(values, column, operation)?;
    let present: Vec<f64> = nums.iter().flatten().copied().collect();
    let summary = NumericStatistics::from_values(&present).ok_or_else(|| {
        CleaningError::InapplicableOperation {
            operation: operation.to_string(),
            reason: format!("column '{}' has no numeric values", column),
        }
    })?;
    let bounds = OutlierBounds::compute(&summary, &present, config.method, config.threshold);

    let is_outlier = |x: f64| match config.method {
        // A zero deviation flags nothing
        OutlierMethod::ZScore => summary.z_score(x).abs() > config.threshold,
        OutlierMethod::Iqr | OutlierMethod::Percentile => !bounds.contains(x),
    };
    let flagged: Vec<usize> = nums
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_some_and(&is_outlier))
        .map(|(i, _)| i)
        .collect();

    tracing::debug!(
        column,
        method = config.method.name(),
        threshold = config.threshold,
        lower = bounds.lower,
        upper = bounds.upper,
        found = flagged.len(),
        "detected outliers"
    );

    let mut report = StatsReport::new(operation, Some(column))
        .with("method", config.method.name())
        .with("action", config.action.name())
        .with("threshold", config.threshold)
        .with("lower_bound", bounds.lower)
        .with("upper_bound", bounds.upper)
        .with("outliers_found", flagged.len());

    match config.action {
        OutlierAction::Cap => {
            let mut capped = values.to_vec();
            for &row in &flagged {
                if let Some(x) = nums[row] {
                    capped[row] = Value::Number(bounds.clamp(x));
                }
            }
            dataset.replace_column(column, capped)?;
            report.insert("outliers_capped", flagged.len());
        }
        OutlierAction::Remove => {
            let mut keep = vec![true; values.len()];
            for &row in &flagged {
                keep[row] = false;
            }
            dataset.retain_rows(&keep)?;
            report.insert("outliers_removed", flagged.len());
            report.insert("rows_remaining", dataset.row_count());
        }
        OutlierAction::Mark => {
            let mut marks = vec![Value::Boolean(false); values.len()];
            for &row in &flagged {
                marks[row] = Value::Boolean(true);
            }
            let marker = format!("{}{}", column, config.marker_suffix);
            dataset.set_column(marker.clone(), marks)?;
            report.insert("outliers_marked", flagged.len());
            report.insert("marker_column", marker);
        }
    }

    Ok(report.with_affected_rows(flagged))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(values: &[f64]) -> Dataset {
        Dataset::from_columns(vec![(
            "x",
            values.iter().map(|v| Value::Number(*v)).collect(),
        )])
        .unwrap()
    }

    #[test]
    fn test_iqr_cap() {
        let mut ds = dataset(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let config = OutlierConfig::new(OutlierMethod::Iqr, OutlierAction::Cap, 1.5);
        let report = detect_and_handle(&mut ds, "x", &config).unwrap();

        assert_eq!(report.count("outliers_found"), Some(1));
        assert_eq!(report.count("outliers_capped"), Some(1));
        assert!((report.number("lower_bound").unwrap() + 1.5).abs() < 1e-12);
        assert!((report.number("upper_bound").unwrap() - 8.5).abs() < 1e-12);
        assert_eq!(ds.get(5, "x"), Some(&Value::Number(8.5)));
        assert_eq!(report.affected_rows, vec![5]);
    }

    #[test]
    fn test_iqr_remove() {
        let mut ds = dataset(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let config = OutlierConfig::new(OutlierMethod::Iqr, OutlierAction::Remove, 1.5);
        let report = detect_and_handle(&mut ds, "x", &config).unwrap();
        assert_eq!(report.count("outliers_removed"), Some(1));
        assert_eq!(ds.row_count(), 5);
    }

    #[test]
    fn test_mark_adds_companion_column() {
        let mut ds = dataset(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let config = OutlierConfig::new(OutlierMethod::Iqr, OutlierAction::Mark, 1.5);
        let report = detect_and_handle(&mut ds, "x", &config).unwrap();
        assert_eq!(report.count("outliers_marked"), Some(1));
        assert_eq!(ds.get(5, "x_is_outlier"), Some(&Value::Boolean(true)));
        assert_eq!(ds.get(0, "x_is_outlier"), Some(&Value::Boolean(false)));
        assert_eq!(ds.get(5, "x"), Some(&Value::Number(100.0)));
    }

    #[test]
    fn test_zscore_zero_variance_flags_nothing() {
        let mut ds = dataset(&[5.0, 5.0, 5.0]);
        let config = OutlierConfig::new(OutlierMethod::ZScore, OutlierAction::Remove, 3.0);
        let report = detect_and_handle(&mut ds, "x", &config).unwrap();
        assert_eq!(report.count("outliers_found"), Some(0));
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn test_zscore_flags_far_value() {
        let mut values = vec![10.0; 20];
        values.push(1000.0);
        let mut ds = dataset(&values);
        let config = OutlierConfig::new(OutlierMethod::ZScore, OutlierAction::Mark, 3.0);
        let report = detect_and_handle(&mut ds, "x", &config).unwrap();
        assert_eq!(report.affected_rows, vec![20]);
    }

    #[test]
    fn test_percentile_trims_both_tails() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let mut ds = dataset(&values);
        let config = OutlierConfig::new(OutlierMethod::Percentile, OutlierAction::Mark, 0.9);
        let report = detect_and_handle(&mut ds, "x", &config).unwrap();
        // Bounds at the 5th and 95th percentiles
        assert!((report.number("lower_bound").unwrap() - 5.0).abs() < 1e-9);
        assert!((report.number("upper_bound").unwrap() - 95.0).abs() < 1e-9);
        assert_eq!(report.count("outliers_found"), Some(10));
    }

    #[test]
    fn test_rejects_text_column() {
        let mut ds = Dataset::from_columns(vec![("x", vec![Value::from("a")])]).unwrap();
        let config = OutlierConfig::new(OutlierMethod::Iqr, OutlierAction::Cap, 1.5);
        let err = detect_and_handle(&mut ds, "x", &config).unwrap_err();
        assert!(matches!(err, CleaningError::TypeMismatch { .. }));
    }

    #[test]
    fn test_rejects_infinite_cells() {
        let mut ds = Dataset::from_columns(vec![(
            "x",
            ["1", "2", "3", "Infinity"].iter().map(|r| Value::infer(r)).collect(),
        )])
        .unwrap();
        let config = OutlierConfig::new(OutlierMethod::ZScore, OutlierAction::Cap, 3.0);
        let err = detect_and_handle(&mut ds, "x", &config).unwrap_err();
        assert!(matches!(err, CleaningError::TypeMismatch { .. }));
        assert_eq!(ds.get(3, "x"), Some(&Value::Text("Infinity".to_string())));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let mut ds = dataset(&[1.0, 2.0]);
        let config = OutlierConfig::new(OutlierMethod::Percentile, OutlierAction::Cap, 1.5);
        assert!(matches!(
            detect_and_handle(&mut ds, "x", &config),
            Err(CleaningError::InvalidParameter(_))
        ));
        let config = OutlierConfig::new(OutlierMethod::Iqr, OutlierAction::Cap, -1.0);
        assert!(detect_and_handle(&mut ds, "x", &config).is_err());
    }

    #[test]
    fn test_missing_cells_are_not_outliers() {
        let mut ds = Dataset::from_columns(vec![(
            "x",
            vec![1.0.into(), 2.0.into(), Value::Missing, 3.0.into()],
        )])
        .unwrap();
        let config = OutlierConfig::new(OutlierMethod::Iqr, OutlierAction::Remove, 1.5);
        let report = detect_and_handle(&mut ds, "x", &config).unwrap();
        assert_eq!(report.count("outliers_found"), Some(0));
        assert_eq!(ds.row_count(), 4);
    }
}
