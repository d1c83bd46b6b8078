//! Typed operation requests.

mod params;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::cleaning::{
    ConversionConfig, DedupConfig, MissingStrategy, NormalizeConfig, OutlierConfig, TextStep,
};
use crate::config::EngineConfig;
use crate::error::{CleaningError, Result};

use params::ParamReader;

/// The six supported cleaning operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    MissingValues,
    Outliers,
    DataType,
    TextCleaning,
    Duplicates,
    Normalize,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::MissingValues,
        OperationKind::Outliers,
        OperationKind::DataType,
        OperationKind::TextCleaning,
        OperationKind::Duplicates,
        OperationKind::Normalize,
    ];

    /// Wire name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::MissingValues => "missing-values",
            OperationKind::Outliers => "outliers",
            OperationKind::DataType => "data-type",
            OperationKind::TextCleaning => "text-cleaning",
            OperationKind::Duplicates => "duplicates",
            OperationKind::Normalize => "normalize",
        }
    }

    /// Parse a wire name. Case and `_`/`-` differences are ignored.
    pub fn parse(name: &str) -> Result<Self> {
        let token = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == token)
            .ok_or_else(|| CleaningError::invalid(format!("unknown operation '{}'", name)))
    }

    /// Whether the operation targets a single column.
    pub fn is_column_scoped(&self) -> bool {
        !matches!(self, OperationKind::Duplicates)
    }
}

/// Validated, per-operation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "kebab-case")]
pub enum OperationParams {
    MissingValues(MissingStrategy),
    Outliers(OutlierConfig),
    DataType(ConversionConfig),
    TextCleaning(Vec<TextStep>),
    Duplicates(DedupConfig),
    Normalize(NormalizeConfig),
}

impl OperationParams {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationParams::MissingValues(_) => OperationKind::MissingValues,
            OperationParams::Outliers(_) => OperationKind::Outliers,
            OperationParams::DataType(_) => OperationKind::DataType,
            OperationParams::TextCleaning(_) => OperationKind::TextCleaning,
            OperationParams::Duplicates(_) => OperationKind::Duplicates,
            OperationParams::Normalize(_) => OperationKind::Normalize,
        }
    }
}

/// One cleaning request: an operation, its parameters and an optional column.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    column: Option<String>,
    params: OperationParams,
}

impl OperationRequest {
    /// Request targeting `column`.
    pub fn for_column(column: impl Into<String>, params: OperationParams) -> Self {
        Self {
            column: Some(column.into()),
            params,
        }
    }

    /// Request with no target column, such as deduplication over all columns.
    pub fn dataset_wide(params: OperationParams) -> Self {
        Self { column: None, params }
    }

    /// Build a request from the loose transport shape.
    ///
    /// Unset thresholds and ranges fall back to `defaults`.
    pub fn from_loose(
        column: Option<&str>,
        operation: &str,
        params: &Map<String, JsonValue>,
        defaults: &EngineConfig,
    ) -> Result<Self> {
        let kind = OperationKind::parse(operation)?;
        let reader = ParamReader::new(params);

        let typed = match kind {
            OperationKind::MissingValues => OperationParams::MissingValues(params::missing_strategy(&reader)?),
            OperationKind::Outliers => OperationParams::Outliers(params::outlier_config(&reader, defaults)?),
            OperationKind::DataType => OperationParams::DataType(params::conversion_config(&reader)?),
            OperationKind::TextCleaning => OperationParams::TextCleaning(params::text_steps(&reader)?),
            OperationKind::Duplicates => OperationParams::Duplicates(params::dedup_config(&reader, defaults)?),
            OperationKind::Normalize => OperationParams::Normalize(params::normalize_config(&reader, defaults)?),
        };

        let column = column.map(str::trim).filter(|c| !c.is_empty());
        if kind.is_column_scoped() && column.is_none() {
            return Err(CleaningError::invalid(format!(
                "operation '{}' requires a column",
                kind.name()
            )));
        }

        Ok(Self {
            column: column.map(str::to_string),
            params: typed,
        })
    }

    pub fn kind(&self) -> OperationKind {
        self.params.kind()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn params(&self) -> &OperationParams {
        &self.params
    }
}
