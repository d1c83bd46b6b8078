//! Column-ordered in-memory table.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{CleaningError, Result};

use super::value::Value;

/// In-memory tabular dataset.
///
/// Columns are stored by name in insertion order. All columns have the same
/// number of rows.
///
/// Datasets built from text remember each cell's source text until an
/// operation changes that cell, so untouched cells render back verbatim.
/// Equality compares cell values only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    columns: IndexMap<String, Vec<Value>>,
    #[serde(skip)]
    source: IndexMap<String, Vec<Option<String>>>,
    row_count: usize,
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.row_count == other.row_count && self.columns == other.columns
    }
}

impl Dataset {
    /// Create an empty dataset with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset from named columns.
    ///
    /// Fails on duplicate names or columns of unequal length.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut dataset = Self::new();
        for (index, (name, values)) in columns.into_iter().enumerate() {
            let name = name.into();
            if dataset.columns.contains_key(&name) {
                return Err(CleaningError::invalid(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
            if index == 0 {
                dataset.row_count = values.len();
            } else if values.len() != dataset.row_count {
                return Err(CleaningError::invalid(format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    dataset.row_count
                )));
            }
            dataset.columns.insert(name, values);
        }
        Ok(dataset)
    }

    /// Build a dataset from raw string rows, inferring each cell's type.
    ///
    /// Short rows are padded with missing cells; rows longer than the header
    /// are rejected.
    pub fn from_text_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let width = headers.len();
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); width];
        let mut source: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); width];

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() > width {
                return Err(CleaningError::invalid(format!(
                    "row {} has {} fields, header has {}",
                    row_idx,
                    row.len(),
                    width
                )));
            }
            for (col_idx, (column, text)) in columns.iter_mut().zip(source.iter_mut()).enumerate() {
                let raw = row.get(col_idx);
                column.push(raw.map(|r| Value::infer(r)).unwrap_or(Value::Missing));
                text.push(raw.cloned());
            }
        }

        let mut dataset = Self::from_columns(headers.iter().cloned().zip(columns))?;
        dataset.source = headers.into_iter().zip(source).collect();
        dataset.row_count = rows.len();
        Ok(dataset)
    }

    /// Render every cell back to text.
    ///
    /// Cells still holding their source text render it unchanged; every other
    /// cell is rendered from its value, missing cells as empty strings.
    pub fn to_text_rows(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let headers = self.columns.keys().cloned().collect();
        let rows = (0..self.row_count)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|(name, col)| {
                        self.source
                            .get(name)
                            .and_then(|text| text[row].clone())
                            .unwrap_or_else(|| col[row].render())
                    })
                    .collect()
            })
            .collect();
        (headers, rows)
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Iterate `(name, values)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Get a column by name or fail with [`CleaningError::ColumnNotFound`].
    pub fn require_column(&self, name: &str) -> Result<&[Value]> {
        self.column(name)
            .ok_or_else(|| CleaningError::ColumnNotFound(name.to_string()))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.values().map(|c| &c[index]).collect())
    }

    /// Replace the contents of an existing column.
    pub fn replace_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        self.check_length(name, &values)?;
        if !self.columns.contains_key(name) {
            return Err(CleaningError::ColumnNotFound(name.to_string()));
        }
        self.forget_changed_source(name, &values);
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    /// Add a column at the end, or overwrite it in place if the name exists.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.columns.is_empty() {
            self.row_count = values.len();
        } else {
            self.check_length(&name, &values)?;
        }
        self.forget_changed_source(&name, &values);
        self.columns.insert(name, values);
        Ok(())
    }

    /// Keep only rows whose mask entry is `true`.
    pub fn retain_rows(&mut self, keep: &[bool]) -> Result<()> {
        if keep.len() != self.row_count {
            return Err(CleaningError::invalid(format!(
                "row mask has {} entries, dataset has {} rows",
                keep.len(),
                self.row_count
            )));
        }
        for values in self.columns.values_mut() {
            let mut mask = keep.iter();
            values.retain(|_| *mask.next().unwrap_or(&false));
        }
        for text in self.source.values_mut() {
            let mut mask = keep.iter();
            text.retain(|_| *mask.next().unwrap_or(&false));
        }
        self.row_count = keep.iter().filter(|k| **k).count();
        Ok(())
    }

    /// Drop the source text of cells whose value is about to change.
    fn forget_changed_source(&mut self, name: &str, values: &[Value]) {
        let (Some(current), Some(text)) = (self.columns.get(name), self.source.get_mut(name)) else {
            return;
        };
        for ((old, new), raw) in current.iter().zip(values).zip(text.iter_mut()) {
            if old != new {
                *raw = None;
            }
        }
    }

    fn check_length(&self, name: &str, values: &[Value]) -> Result<()> {
        if values.len() != self.row_count {
            return Err(CleaningError::invalid(format!(
                "column '{}' has {} rows, expected {}",
                name,
                values.len(),
                self.row_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> Dataset {
        Dataset::from_text_rows(
            headers.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_from_text_rows_infers_cells() {
        let ds = make_table(
            vec!["id", "name", "active"],
            vec![vec!["1", "Alice", "true"], vec!["2", "", "false"]],
        );
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.get(0, "id"), Some(&Value::Number(1.0)));
        assert_eq!(ds.get(1, "name"), Some(&Value::Missing));
        assert_eq!(ds.get(1, "active"), Some(&Value::Boolean(false)));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let ds = make_table(vec!["a", "b"], vec![vec!["1"]]);
        assert_eq!(ds.get(0, "b"), Some(&Value::Missing));
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let result = Dataset::from_text_rows(
            vec!["a".to_string()],
            vec![vec!["1".to_string(), "2".to_string()]],
        );
        assert!(matches!(result, Err(CleaningError::InvalidParameter(_))));
    }

    #[test]
    fn test_duplicate_column_names_rejected() {
        let result = Dataset::from_columns(vec![
            ("a", vec![Value::Missing]),
            ("a", vec![Value::Missing]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Dataset::from_columns(vec![
            ("a", vec![Value::Missing]),
            ("b", vec![Value::Missing, Value::Missing]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_retain_rows() {
        let mut ds = make_table(vec!["x", "y"], vec![vec!["1", "a"], vec!["2", "b"], vec!["3", "c"]]);
        ds.retain_rows(&[true, false, true]).unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.get(1, "y"), Some(&Value::Text("c".to_string())));
    }

    #[test]
    fn test_set_column_appends_and_overwrites() {
        let mut ds = make_table(vec!["x"], vec![vec!["1"], vec!["2"]]);
        ds.set_column("flag", vec![Value::Boolean(true), Value::Boolean(false)])
            .unwrap();
        assert_eq!(ds.column_names().collect::<Vec<_>>(), vec!["x", "flag"]);
        ds.set_column("flag", vec![Value::Boolean(false), Value::Boolean(false)])
            .unwrap();
        assert_eq!(ds.column_count(), 2);
        assert!(ds.set_column("bad", vec![Value::Missing]).is_err());
    }

    #[test]
    fn test_to_text_rows() {
        let ds = make_table(vec!["x", "y"], vec![vec!["1", ""], vec!["2.5", "b"]]);
        let (headers, rows) = ds.to_text_rows();
        assert_eq!(headers, vec!["x", "y"]);
        assert_eq!(rows, vec![vec!["1", ""], vec!["2.5", "b"]]);
    }

    #[test]
    fn test_untouched_cells_keep_source_text() {
        let mut ds = make_table(
            vec!["zip", "date", "flag", "name"],
            vec![vec!["02134", "01/15/2024", "TRUE", " bob "], vec!["NA", " 7 ", "", "cat"]],
        );
        ds.replace_column(
            "name",
            vec![Value::Text("bob".to_string()), Value::Text("cat".to_string())],
        )
        .unwrap();

        let (_, rows) = ds.to_text_rows();
        assert_eq!(rows[0], vec!["02134", "01/15/2024", "TRUE", "bob"]);
        assert_eq!(rows[1], vec!["NA", " 7 ", "", "cat"]);
    }

    #[test]
    fn test_changed_cells_are_rendered() {
        let mut ds = make_table(vec!["x"], vec![vec!["01"], vec!["NA"], vec!["3"]]);
        ds.replace_column("x", vec![1.0.into(), 2.0.into(), 3.0.into()])
            .unwrap();
        let (_, rows) = ds.to_text_rows();
        assert_eq!(rows, vec![vec!["01"], vec!["2"], vec!["3"]]);

        ds.retain_rows(&[false, true, true]).unwrap();
        let (_, rows) = ds.to_text_rows();
        assert_eq!(rows, vec![vec!["2"], vec!["3"]]);
    }

    #[test]
    fn test_equality_ignores_source_text() {
        let from_text = make_table(vec!["x"], vec![vec!["01"]]);
        let from_values = Dataset::from_columns(vec![("x", vec![Value::Number(1.0)])]).unwrap();
        assert_eq!(from_text, from_values);
    }
}
