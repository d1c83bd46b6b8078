//! Missing-value imputation and row dropping.

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value};
use crate::error::{CleaningError, Result};
use crate::operation::OperationKind;
use crate::report::StatsReport;
use crate::stats::{self, NumericStatistics};
use crate::typing::numeric_values;

/// How to treat missing cells in a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "kebab-case")]
pub enum MissingStrategy {
    /// Fill with the column mean (numeric only).
    FillMean,
    /// Fill with the column median (numeric only).
    FillMedian,
    /// Fill with the most frequent value, first seen on ties (numeric only).
    FillMode,
    /// Fill with zero.
    FillZero,
    /// Fill with a caller-supplied value.
    FillCustom(Value),
    /// Remove rows where the column is missing.
    Drop,
}

impl MissingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            MissingStrategy::FillMean => "fill-mean",
            MissingStrategy::FillMedian => "fill-median",
            MissingStrategy::FillMode => "fill-mode",
            MissingStrategy::FillZero => "fill-zero",
            MissingStrategy::FillCustom(_) => "fill-custom",
            MissingStrategy::Drop => "drop",
        }
    }
}

/// Fill or drop the missing cells of `column`.
pub fn fill_or_drop(
    dataset: &mut Dataset,
    column: &str,
    strategy: &MissingStrategy,
) -> Result<StatsReport> {
    let values = dataset.require_column(column)?;
    let missing_rows: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_missing())
        .map(|(i, _)| i)
        .collect();

    tracing::debug!(
        column,
        strategy = strategy.name(),
        missing = missing_rows.len(),
        "handling missing values"
    );

    let report = StatsReport::new(OperationKind::MissingValues.name(), Some(column))
        .with("strategy", strategy.name());

    if matches!(strategy, MissingStrategy::Drop) {
        let keep: Vec<bool> = values.iter().map(|v| !v.is_missing()).collect();
        dataset.retain_rows(&keep)?;
        return Ok(report
            .with("rows_dropped", missing_rows.len())
            .with("rows_remaining", dataset.row_count())
            .with_affected_rows(missing_rows));
    }

    let fill = fill_value(values, column, strategy)?;
    let mut filled = values.to_vec();
    for &row in &missing_rows {
        filled[row] = fill.clone();
    }
    dataset.replace_column(column, filled)?;

    Ok(report
        .with("missing_filled", missing_rows.len())
        .with("fill_value", fill.render())
        .with_affected_rows(missing_rows))
}

/// Compute the replacement value for a fill strategy.
fn fill_value(values: &[Value], column: &str, strategy: &MissingStrategy) -> Result<Value> {
    let operation = OperationKind::MissingValues.name();
    let value = match strategy {
        MissingStrategy::FillMean | MissingStrategy::FillMedian => {
            let nums = numeric_values(values, column, operation)?;
            let summary = NumericStatistics::from_column(&nums).ok_or_else(|| no_values(column))?;
            if matches!(strategy, MissingStrategy::FillMean) {
                Value::Number(summary.mean)
            } else {
                Value::Number(summary.median)
            }
        }
        MissingStrategy::FillMode => {
            // Count on the numeric view so "1" and 1 land in the same bucket
            let nums: Vec<Value> = numeric_values(values, column, operation)?
                .into_iter()
                .map(Value::from)
                .collect();
            stats::mode(&nums).ok_or_else(|| no_values(column))?
        }
        MissingStrategy::FillZero => Value::Number(0.0),
        MissingStrategy::FillCustom(custom) => {
            if custom.is_missing() {
                return Err(CleaningError::invalid("custom fill value must not be missing"));
            }
            custom.clone()
        }
        MissingStrategy::Drop => Value::Missing,
    };
    Ok(value)
}

fn no_values(column: &str) -> CleaningError {
    CleaningError::InapplicableOperation {
        operation: OperationKind::MissingValues.name().to_string(),
        reason: format!("column '{}' has no non-missing values", column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_dataset(values: Vec<Value>) -> Dataset {
        Dataset::from_columns(vec![("x", values)]).unwrap()
    }

    #[test]
    fn test_fill_mean() {
        let mut ds = numeric_dataset(vec![1.0.into(), Value::Missing, 3.0.into()]);
        let report = fill_or_drop(&mut ds, "x", &MissingStrategy::FillMean).unwrap();
        assert_eq!(report.count("missing_filled"), Some(1));
        assert_eq!(ds.get(1, "x"), Some(&Value::Number(2.0)));
        assert_eq!(report.affected_rows, vec![1]);
    }

    #[test]
    fn test_fill_median() {
        let mut ds = numeric_dataset(vec![1.0.into(), 10.0.into(), 2.0.into(), Value::Missing]);
        fill_or_drop(&mut ds, "x", &MissingStrategy::FillMedian).unwrap();
        assert_eq!(ds.get(3, "x"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_fill_mode_first_seen() {
        let mut ds = numeric_dataset(vec![1.0.into(), 1.0.into(), 2.0.into(), Value::Missing]);
        fill_or_drop(&mut ds, "x", &MissingStrategy::FillMode).unwrap();
        assert_eq!(ds.get(3, "x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_fill_mean_rejects_text() {
        let mut ds = numeric_dataset(vec!["a".into(), Value::Missing]);
        let err = fill_or_drop(&mut ds, "x", &MissingStrategy::FillMean).unwrap_err();
        assert!(matches!(err, CleaningError::TypeMismatch { .. }));
        assert_eq!(ds.get(1, "x"), Some(&Value::Missing));
    }

    #[test]
    fn test_fill_zero_and_custom_work_on_text() {
        let mut ds = numeric_dataset(vec!["a".into(), Value::Missing]);
        fill_or_drop(&mut ds, "x", &MissingStrategy::FillCustom("unknown".into())).unwrap();
        assert_eq!(ds.get(1, "x"), Some(&Value::Text("unknown".to_string())));

        let mut ds = numeric_dataset(vec!["a".into(), Value::Missing]);
        fill_or_drop(&mut ds, "x", &MissingStrategy::FillZero).unwrap();
        assert_eq!(ds.get(1, "x"), Some(&Value::Number(0.0)));
    }

    #[test]
    fn test_drop_rows() {
        let mut ds = Dataset::from_columns(vec![
            ("x", vec![1.0.into(), Value::Missing, Value::Number(f64::NAN)]),
            ("y", vec!["a".into(), "b".into(), "c".into()]),
        ])
        .unwrap();
        let report = fill_or_drop(&mut ds, "x", &MissingStrategy::Drop).unwrap();
        assert_eq!(report.count("rows_dropped"), Some(2));
        assert_eq!(report.count("rows_remaining"), Some(1));
        assert_eq!(ds.row_count(), 1);
        assert_eq!(ds.get(0, "y"), Some(&Value::Text("a".to_string())));
    }

    #[test]
    fn test_no_missing_values_is_a_noop() {
        let mut ds = numeric_dataset(vec![1.0.into(), 2.0.into()]);
        let report = fill_or_drop(&mut ds, "x", &MissingStrategy::FillMean).unwrap();
        assert_eq!(report.count("missing_filled"), Some(0));
        assert_eq!(ds.column("x").unwrap(), &[Value::Number(1.0), Value::Number(2.0)]);
    }
}
