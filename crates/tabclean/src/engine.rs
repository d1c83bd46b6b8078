//! Operation dispatch.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::cleaning;
use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::error::{CleaningError, ErrorKind, Result};
use crate::operation::{OperationKind, OperationParams, OperationRequest};
use crate::report::StatsReport;
use crate::typing::classify;

/// Routes operation requests to the cleaning handlers.
///
/// Holds only immutable configuration, so one engine can serve any number of
/// datasets.
#[derive(Debug, Clone, Default)]
pub struct CleaningEngine {
    config: EngineConfig,
}

/// Result of applying one operation through [`CleaningEngine::apply`].
///
/// The dataset is always handed back: transformed on success, untouched on
/// failure.
#[derive(Debug, Clone, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    pub stats: StatsReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip)]
    pub dataset: Dataset,
}

impl OperationOutcome {
    /// Split into the dataset and the handler result.
    pub fn into_parts(self) -> (Dataset, std::result::Result<StatsReport, String>) {
        match self.error {
            None => (self.dataset, Ok(self.stats)),
            Some(error) => (self.dataset, Err(error)),
        }
    }
}

impl CleaningEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply `request` to `dataset`, modifying it only on success.
    pub fn apply_in_place(&self, dataset: &mut Dataset, request: &OperationRequest) -> Result<StatsReport> {
        let kind = request.kind();
        let column = match (kind.is_column_scoped(), request.column()) {
            (true, Some(column)) => {
                dataset.require_column(column)?;
                column
            }
            (true, None) => {
                return Err(CleaningError::invalid(format!(
                    "operation '{}' requires a column",
                    kind.name()
                )));
            }
            (false, _) => "",
        };

        match request.params() {
            OperationParams::MissingValues(strategy) => cleaning::fill_or_drop(dataset, column, strategy),
            OperationParams::Outliers(config) => cleaning::detect_and_handle(dataset, column, config),
            OperationParams::DataType(config) => cleaning::convert(dataset, column, config),
            OperationParams::TextCleaning(steps) => cleaning::clean(dataset, column, steps),
            OperationParams::Duplicates(config) => cleaning::deduplicate(dataset, config),
            OperationParams::Normalize(config) => cleaning::normalize(dataset, column, config),
        }
    }

    /// Apply `request`, taking ownership of the dataset and always returning it.
    pub fn apply(&self, mut dataset: Dataset, request: &OperationRequest) -> OperationOutcome {
        let kind = request.kind();
        match self.apply_in_place(&mut dataset, request) {
            Ok(stats) => {
                tracing::info!(
                    operation = kind.name(),
                    column = request.column().unwrap_or("*"),
                    affected = stats.affected_rows.len(),
                    rows = dataset.row_count(),
                    "applied operation"
                );
                OperationOutcome {
                    success: true,
                    stats,
                    error: None,
                    error_kind: None,
                    dataset,
                }
            }
            Err(err) => {
                let stats = failure_report(&dataset, kind.name(), request.column(), request.params(), &err);
                Self::failed(dataset, stats, err)
            }
        }
    }

    /// Apply an operation given in the loose transport shape.
    ///
    /// Unknown operation names and malformed parameters become failed
    /// outcomes rather than errors.
    pub fn apply_operation(
        &self,
        dataset: Dataset,
        column: Option<&str>,
        operation: &str,
        params: &Map<String, JsonValue>,
    ) -> OperationOutcome {
        match OperationRequest::from_loose(column, operation, params, &self.config) {
            Ok(request) => self.apply(dataset, &request),
            Err(err) => {
                let name = OperationKind::parse(operation)
                    .map(|kind| kind.name().to_string())
                    .unwrap_or_else(|_| operation.to_string());
                let stats = StatsReport::new(name, column).with("error", err.to_string());
                Self::failed(dataset, stats, err)
            }
        }
    }

    fn failed(dataset: Dataset, stats: StatsReport, err: CleaningError) -> OperationOutcome {
        tracing::warn!(
            operation = %stats.operation,
            kind = ?err.kind(),
            error = %err,
            "operation rejected"
        );
        OperationOutcome {
            success: false,
            stats,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            dataset,
        }
    }
}

fn failure_report(
    dataset: &Dataset,
    operation: &str,
    column: Option<&str>,
    params: &OperationParams,
    err: &CleaningError,
) -> StatsReport {
    let mut report = StatsReport::new(operation, column);
    if let (OperationParams::DataType(config), Some(values)) =
        (params, column.and_then(|c| dataset.column(c)))
    {
        report.insert("original_type", classify(values).name());
        report.insert("new_type", config.target.name());
        report.insert("conversion_successful", false);
    }
    report.with("error", err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;
    use serde_json::json;

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            ("x", vec![1.0.into(), 2.0.into(), Value::Missing]),
            ("s", vec!["a".into(), "b".into(), "c".into()]),
        ])
        .unwrap()
    }

    fn params(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_apply_operation_success() {
        let engine = CleaningEngine::new();
        let outcome = engine.apply_operation(
            dataset(),
            Some("x"),
            "missing-values",
            &params(json!({"action": "fill-zero"})),
        );
        assert!(outcome.success);
        assert_eq!(outcome.stats.count("missing_filled"), Some(1));
        assert_eq!(outcome.dataset.get(2, "x"), Some(&Value::Number(0.0)));
    }

    #[test]
    fn test_unknown_operation_is_invalid_parameter() {
        let engine = CleaningEngine::new();
        let outcome = engine.apply_operation(dataset(), Some("x"), "sparkle", &Map::new());
        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidParameter));
        assert_eq!(outcome.dataset, dataset());
    }

    #[test]
    fn test_missing_column_is_reported() {
        let engine = CleaningEngine::new();
        let outcome = engine.apply_operation(dataset(), Some("nope"), "normalize", &Map::new());
        assert_eq!(outcome.error_kind, Some(ErrorKind::ColumnNotFound));
    }

    #[test]
    fn test_failed_conversion_report() {
        let engine = CleaningEngine::new();
        let outcome = engine.apply_operation(
            dataset(),
            Some("s"),
            "data-type",
            &params(json!({"target_type": "integer", "on_error": "strict"})),
        );
        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(ErrorKind::ConversionError));
        assert_eq!(outcome.stats.flag("conversion_successful"), Some(false));
        assert_eq!(outcome.stats.text("original_type"), Some("text"));
        assert!(outcome.stats.text("error").is_some());
        assert_eq!(outcome.dataset, dataset());
    }

    #[test]
    fn test_type_mismatch_leaves_dataset_untouched() {
        let engine = CleaningEngine::new();
        let outcome = engine.apply_operation(dataset(), Some("s"), "outliers", &Map::new());
        assert_eq!(outcome.error_kind, Some(ErrorKind::TypeMismatch));
        assert_eq!(outcome.dataset, dataset());
    }

    #[test]
    fn test_outcome_serialization_skips_dataset() {
        let engine = CleaningEngine::new();
        let outcome = engine.apply_operation(dataset(), None, "duplicates", &Map::new());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("dataset").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json["stats"]["metrics"]["duplicates_removed"], 0);
    }

    #[test]
    fn test_config_defaults_reach_handlers() {
        let config = EngineConfig {
            duplicate_column: "dup".to_string(),
            ..EngineConfig::default()
        };
        let engine = CleaningEngine::with_config(config);
        let outcome = engine.apply_operation(dataset(), None, "duplicates", &params(json!({"action": "mark"})));
        assert!(outcome.dataset.contains_column("dup"));
    }
}
