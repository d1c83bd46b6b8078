//! Engine configuration and defaults.

use serde::{Deserialize, Serialize};

/// Defaults applied when a request leaves a parameter unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IQR multiplier for the `iqr` outlier method.
    pub iqr_threshold: f64,
    /// Z-score cutoff for the `zscore` outlier method.
    pub zscore_threshold: f64,
    /// Central fraction kept by the `percentile` outlier method.
    pub percentile_fraction: f64,
    /// Lower bound for min-max normalization.
    pub range_min: f64,
    /// Upper bound for min-max normalization.
    pub range_max: f64,
    /// Suffix for the companion column added by the outlier `mark` action.
    pub outlier_column_suffix: String,
    /// Column added by the duplicates `mark` action.
    pub duplicate_column: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iqr_threshold: 1.5,
            zscore_threshold: 3.0,
            percentile_fraction: 0.95,
            range_min: 0.0,
            range_max: 1.0,
            outlier_column_suffix: "_is_outlier".to_string(),
            duplicate_column: "is_duplicate".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
