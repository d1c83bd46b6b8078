//! Error types for the tabclean library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for cleaning operations.
///
/// Every variant is local to a single operation. A failed operation never
/// leaves a partially modified dataset behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CleaningError {
    /// The operation needs a column of a different semantic type.
    #[error("Type mismatch in column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// Strict type conversion hit a value it could not parse.
    #[error("Cannot convert value '{value}' at row {row} of column '{column}' to {target}")]
    Conversion {
        column: String,
        row: usize,
        value: String,
        target: String,
    },

    /// A required parameter is missing or malformed.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The column's shape rules out the requested operation.
    #[error("Operation '{operation}' is not applicable: {reason}")]
    InapplicableOperation { operation: String, reason: String },

    /// The named column does not exist in the dataset.
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),
}

/// Coarse error category, used for structured failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TypeMismatch,
    ConversionError,
    InvalidParameter,
    InapplicableOperation,
    ColumnNotFound,
}

impl CleaningError {
    /// Get the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CleaningError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            CleaningError::Conversion { .. } => ErrorKind::ConversionError,
            CleaningError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            CleaningError::InapplicableOperation { .. } => ErrorKind::InapplicableOperation,
            CleaningError::ColumnNotFound(_) => ErrorKind::ColumnNotFound,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CleaningError::InvalidParameter(message.into())
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_message_names_row_and_value() {
        let err = CleaningError::Conversion {
            column: "age".to_string(),
            row: 2,
            value: "x".to_string(),
            target: "integer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 2"));
        assert!(msg.contains("'x'"));
        assert_eq!(err.kind(), ErrorKind::ConversionError);
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::TypeMismatch).unwrap();
        assert_eq!(json, "\"type_mismatch\"");
    }
}
