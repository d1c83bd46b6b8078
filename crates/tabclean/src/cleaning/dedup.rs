//! Duplicate row detection.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{CellKey, Dataset, Value};
use crate::error::{CleaningError, Result};
use crate::operation::OperationKind;
use crate::report::StatsReport;

/// Which columns form the duplicate key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyColumns {
    #[default]
    All,
    Subset(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateAction {
    /// Keep one row per key group.
    #[default]
    Remove,
    /// Add a boolean column flagging every row that shares its key.
    Mark,
    /// Report only.
    Count,
}

impl DuplicateAction {
    pub fn name(&self) -> &'static str {
        match self {
            DuplicateAction::Remove => "remove",
            DuplicateAction::Mark => "mark",
            DuplicateAction::Count => "count",
        }
    }
}

/// Which row of a duplicate group survives removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keep {
    #[default]
    First,
    Last,
}

impl Keep {
    pub fn name(&self) -> &'static str {
        match self {
            Keep::First => "first",
            Keep::Last => "last",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    pub keys: KeyColumns,
    pub action: DuplicateAction,
    pub keep: Keep,
    /// Name of the column added by [`DuplicateAction::Mark`].
    pub marker_column: String,
}

impl DedupConfig {
    pub fn new(keys: KeyColumns, action: DuplicateAction, keep: Keep) -> Self {
        Self {
            keys,
            action,
            keep,
            marker_column: "is_duplicate".to_string(),
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self::new(KeyColumns::All, DuplicateAction::Remove, Keep::First)
    }
}

/// Rows grouped by key, in first-seen order.
#[derive(Debug)]
struct KeyGroup {
    first: usize,
    last: usize,
    size: usize,
}

/// Find duplicate rows and apply the configured action.
pub fn deduplicate(dataset: &mut Dataset, config: &DedupConfig) -> Result<StatsReport> {
    let key_columns = resolve_keys(dataset, config)?;

    let columns: Vec<&[Value]> = key_columns
        .iter()
        .map(|name| dataset.require_column(name))
        .collect::<Result<_>>()?;

    let mut groups: IndexMap<Vec<CellKey>, KeyGroup> = IndexMap::new();
    let mut row_group = Vec::with_capacity(dataset.row_count());
    for row in 0..dataset.row_count() {
        let key: Vec<CellKey> = columns.iter().map(|col| col[row].key()).collect();
        let entry = groups.entry(key);
        row_group.push(entry.index());
        let group = entry.or_insert(KeyGroup {
            first: row,
            last: row,
            size: 0,
        });
        group.last = row;
        group.size += 1;
    }

    // Rows that removal would delete, given `keep`.
    let redundant: Vec<usize> = row_group
        .iter()
        .enumerate()
        .filter(|&(row, &g)| {
            let group = &groups[g];
            let survivor = match config.keep {
                Keep::First => group.first,
                Keep::Last => group.last,
            };
            group.size > 1 && row != survivor
        })
        .map(|(row, _)| row)
        .collect();

    tracing::debug!(
        keys = key_columns.len(),
        groups = groups.len(),
        duplicates = redundant.len(),
        "grouped rows by key"
    );

    let report = StatsReport::new(OperationKind::Duplicates.name(), None)
        .with("action", config.action.name())
        .with("keep", config.keep.name())
        .with("key_columns", key_columns.join(","));

    match config.action {
        DuplicateAction::Remove => {
            let mut keep = vec![true; dataset.row_count()];
            for &row in &redundant {
                keep[row] = false;
            }
            let removed = redundant.len();
            dataset.retain_rows(&keep)?;
            Ok(report
                .with("duplicates_removed", removed)
                .with("rows_remaining", dataset.row_count())
                .with_affected_rows(redundant))
        }
        DuplicateAction::Mark => {
            let mut marked = Vec::new();
            let marks: Vec<Value> = row_group
                .iter()
                .enumerate()
                .map(|(row, &g)| {
                    let shared = groups[g].size > 1;
                    if shared {
                        marked.push(row);
                    }
                    Value::Boolean(shared)
                })
                .collect();
            dataset.set_column(config.marker_column.clone(), marks)?;
            Ok(report
                .with("duplicates_marked", marked.len())
                .with("marker_column", config.marker_column.as_str())
                .with_affected_rows(marked))
        }
        DuplicateAction::Count => Ok(report
            .with("duplicate_count", redundant.len())
            .with_affected_rows(redundant)),
    }
}

fn resolve_keys(dataset: &Dataset, config: &DedupConfig) -> Result<Vec<String>> {
    match &config.keys {
        KeyColumns::All => {
            // A marker column from an earlier run must not split groups
            let names: Vec<String> = dataset
                .column_names()
                .filter(|name| *name != config.marker_column)
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                return Err(CleaningError::InapplicableOperation {
                    operation: OperationKind::Duplicates.name().to_string(),
                    reason: "dataset has no columns".to_string(),
                });
            }
            Ok(names)
        }
        KeyColumns::Subset(names) => {
            if names.is_empty() {
                return Err(CleaningError::invalid("duplicate key subset is empty"));
            }
            for name in names {
                dataset.require_column(name)?;
            }
            Ok(names.clone())
        }
    }
}
