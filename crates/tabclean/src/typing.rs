//! Semantic type classification for columns.

use serde::{Deserialize, Serialize};

use crate::dataset::{CellKind, Value};
use crate::error::{CleaningError, Result};

/// Inferred semantic type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Every non-missing value is a number or numeric text.
    Numeric,
    /// Free text.
    Text,
    /// Boolean values (true/false).
    Boolean,
    /// Date and/or time values.
    Temporal,
    /// Values disagree, or there are no non-missing values at all.
    Mixed,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }

    /// Lowercase name used in reports and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Temporal => "temporal",
            ColumnType::Mixed => "mixed",
        }
    }
}

impl From<CellKind> for ColumnType {
    fn from(kind: CellKind) -> Self {
        match kind {
            CellKind::Numeric => ColumnType::Numeric,
            CellKind::Text => ColumnType::Text,
            CellKind::Boolean => ColumnType::Boolean,
            CellKind::Temporal => ColumnType::Temporal,
        }
    }
}

/// Classify a column from the kinds of its non-missing cells.
pub fn classify(values: &[Value]) -> ColumnType {
    let mut kinds = values.iter().filter_map(Value::kind);
    let Some(first) = kinds.next() else {
        return ColumnType::Mixed;
    };
    if kinds.all(|k| k == first) {
        first.into()
    } else {
        ColumnType::Mixed
    }
}

/// Numeric view of a column for operations that require numbers.
///
/// Missing cells map to `None`. Fails with [`CleaningError::InapplicableOperation`]
/// when the column has no values and [`CleaningError::TypeMismatch`] when it is
/// not numeric.
pub fn numeric_values(values: &[Value], column: &str, operation: &str) -> Result<Vec<Option<f64>>> {
    if values.iter().all(Value::is_missing) {
        return Err(CleaningError::InapplicableOperation {
            operation: operation.to_string(),
            reason: format!("column '{}' has no non-missing values", column),
        });
    }
    let column_type = classify(values);
    if !column_type.is_numeric() {
        return Err(CleaningError::TypeMismatch {
            column: column.to_string(),
            expected: ColumnType::Numeric.name().to_string(),
            found: column_type.name().to_string(),
        });
    }
    Ok(values.iter().map(Value::as_f64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(raw: &[&str]) -> Vec<Value> {
        raw.iter().map(|r| Value::infer(r)).collect()
    }

    #[test]
    fn test_classify_numeric_with_missing() {
        assert_eq!(classify(&cells(&["1", "2.5", "", "NA"])), ColumnType::Numeric);
    }

    #[test]
    fn test_numeric_text_counts_as_numeric() {
        let values = vec![Value::Number(1.0), Value::Text("2".to_string())];
        assert_eq!(classify(&values), ColumnType::Numeric);
    }

    #[test]
    fn test_classify_text_boolean_temporal() {
        assert_eq!(classify(&cells(&["a", "b"])), ColumnType::Text);
        assert_eq!(classify(&cells(&["true", "FALSE"])), ColumnType::Boolean);
        assert_eq!(classify(&cells(&["2024-01-01", "2024-02-01"])), ColumnType::Temporal);
    }

    #[test]
    fn test_classify_mixed() {
        assert_eq!(classify(&cells(&["1", "x"])), ColumnType::Mixed);
        assert_eq!(classify(&cells(&["", ""])), ColumnType::Mixed);
        assert_eq!(classify(&[]), ColumnType::Mixed);
    }

    #[test]
    fn test_numeric_values_rejects_text() {
        let err = numeric_values(&cells(&["1", "x"]), "c", "outliers").unwrap_err();
        assert!(matches!(err, CleaningError::TypeMismatch { .. }));
    }

    #[test]
    fn test_numeric_values_rejects_empty_column() {
        let err = numeric_values(&cells(&["", "NA"]), "c", "normalize").unwrap_err();
        assert!(matches!(err, CleaningError::InapplicableOperation { .. }));
    }

    #[test]
    fn test_numeric_values_maps_missing_to_none() {
        let nums = numeric_values(&cells(&["1", "", "3"]), "c", "normalize").unwrap();
        assert_eq!(nums, vec![Some(1.0), None, Some(3.0)]);
    }
}
