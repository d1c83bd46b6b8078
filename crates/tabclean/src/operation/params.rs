//! Parsing of loose, transport-shaped parameter maps into typed configs.
//!
//! Keys and values follow the names used by the web form that produced them,
//! so several aliases are accepted for most options. Enum tokens are matched
//! case-insensitively with `_` and `-` treated alike.

use serde_json::{Map, Value as JsonValue};

use crate::cleaning::{
    ConversionConfig, DedupConfig, DuplicateAction, Keep, KeyColumns, MissingStrategy, NormalizeConfig,
    NormalizeMethod, OnError, OutlierAction, OutlierConfig, OutlierMethod, TargetType, TextStep,
};
use crate::config::EngineConfig;
use crate::dataset::Value;
use crate::error::{CleaningError, Result};

/// Read-only view over a parameter map with alias-aware getters.
pub(crate) struct ParamReader<'a> {
    map: &'a Map<String, JsonValue>,
}

impl<'a> ParamReader<'a> {
    pub(crate) fn new(map: &'a Map<String, JsonValue>) -> Self {
        Self { map }
    }

    /// First non-null value stored under any of `keys`.
    pub(crate) fn get(&self, keys: &[&str]) -> Option<(&'a str, &'a JsonValue)> {
        keys.iter().find_map(|key| {
            self.map
                .get_key_value(*key)
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.as_str(), v))
        })
    }

    /// A string option, normalised to a lowercase, dash-separated token.
    pub(crate) fn token(&self, keys: &[&str]) -> Result<Option<String>> {
        match self.get(keys) {
            None => Ok(None),
            Some((_, JsonValue::String(s))) => Ok(Some(normalize_token(s))),
            Some((key, other)) => Err(CleaningError::invalid(format!(
                "parameter '{}' must be a string, got {}",
                key, other
            ))),
        }
    }

    /// A number, or a string holding one.
    pub(crate) fn number(&self, keys: &[&str]) -> Result<Option<f64>> {
        let Some((key, value)) = self.get(keys) else {
            return Ok(None);
        };
        let parsed = match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|n| !n.is_nan())
            .map(Some)
            .ok_or_else(|| CleaningError::invalid(format!("parameter '{}' must be a number, got {}", key, value)))
    }

    /// A list of strings, given as a JSON array or a comma-separated string.
    pub(crate) fn list(&self, keys: &[&str]) -> Result<Option<Vec<String>>> {
        let Some((key, value)) = self.get(keys) else {
            return Ok(None);
        };
        let items = match value {
            JsonValue::String(s) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        CleaningError::invalid(format!("parameter '{}' must hold strings, got {}", key, item))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            other => {
                return Err(CleaningError::invalid(format!(
                    "parameter '{}' must be a list, got {}",
                    key, other
                )));
            }
        };
        Ok(Some(
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        ))
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('_', "-")
}

fn unknown(what: &str, value: &str) -> CleaningError {
    CleaningError::invalid(format!("unknown {} '{}'", what, value))
}

pub(crate) fn missing_strategy(params: &ParamReader<'_>) -> Result<MissingStrategy> {
    let action = params
        .token(&["action", "strategy"])?
        .unwrap_or_else(|| "fill-mean".to_string());
    let strategy = match action.as_str() {
        "fill-mean" | "mean" => MissingStrategy::FillMean,
        "fill-median" | "median" => MissingStrategy::FillMedian,
        "fill-mode" | "mode" => MissingStrategy::FillMode,
        "fill-zero" | "zero" => MissingStrategy::FillZero,
        "fill-custom" | "custom" => MissingStrategy::FillCustom(custom_value(params)?),
        "drop" => MissingStrategy::Drop,
        other => return Err(unknown("missing-value action", other)),
    };
    Ok(strategy)
}

fn custom_value(params: &ParamReader<'_>) -> Result<Value> {
    let value = match params.get(&["custom_value", "value"]) {
        Some((_, JsonValue::String(s))) => Value::infer(s),
        Some((_, JsonValue::Number(n))) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
        Some((_, JsonValue::Bool(b))) => Value::Boolean(*b),
        Some((key, other)) => {
            return Err(CleaningError::invalid(format!(
                "parameter '{}' must be a scalar, got {}",
                key, other
            )));
        }
        None => Value::Missing,
    };
    if value.is_missing() {
        return Err(CleaningError::invalid("fill-custom requires a non-empty 'custom_value'"));
    }
    Ok(value)
}

pub(crate) fn outlier_config(params: &ParamReader<'_>, defaults: &EngineConfig) -> Result<OutlierConfig> {
    let method = match params.token(&["method"])?.as_deref() {
        None | Some("iqr") => OutlierMethod::Iqr,
        Some("zscore" | "z-score") => OutlierMethod::ZScore,
        Some("percentile") => OutlierMethod::Percentile,
        Some(other) => return Err(unknown("outlier method", other)),
    };
    let action = match params.token(&["action"])?.as_deref() {
        None | Some("remove") => OutlierAction::Remove,
        Some("cap") => OutlierAction::Cap,
        Some("mark" | "flag") => OutlierAction::Mark,
        Some(other) => return Err(unknown("outlier action", other)),
    };
    let threshold = params.number(&["threshold"])?.unwrap_or(match method {
        OutlierMethod::Iqr => defaults.iqr_threshold,
        OutlierMethod::ZScore => defaults.zscore_threshold,
        OutlierMethod::Percentile => defaults.percentile_fraction,
    });

    let mut config = OutlierConfig::new(method, action, threshold);
    config.marker_suffix = defaults.outlier_column_suffix.clone();
    Ok(config)
}

pub(crate) fn conversion_config(params: &ParamReader<'_>) -> Result<ConversionConfig> {
    let target = match params.token(&["target_type", "type"])?.as_deref() {
        None | Some("string" | "str" | "text") => TargetType::String,
        Some("integer" | "int") => TargetType::Integer,
        Some("float" | "number" | "numeric") => TargetType::Float,
        Some("boolean" | "bool") => TargetType::Boolean,
        Some("temporal" | "date" | "datetime") => TargetType::Temporal,
        Some(other) => return Err(unknown("target type", other)),
    };
    let on_error = match params.token(&["on_error", "errors"])?.as_deref() {
        None | Some("coerce") => OnError::Coerce,
        Some("strict" | "raise") => OnError::Strict,
        Some(other) => return Err(unknown("on_error policy", other)),
    };
    Ok(ConversionConfig::new(target, on_error))
}

pub(crate) fn text_steps(params: &ParamReader<'_>) -> Result<Vec<TextStep>> {
    let mut steps = params
        .list(&["actions", "steps"])?
        .unwrap_or_default()
        .iter()
        .map(|name| text_step(name))
        .collect::<Result<Vec<_>>>()?;

    if let Some((key, value)) = params.get(&["replacements"]) {
        let JsonValue::Array(pairs) = value else {
            return Err(CleaningError::invalid(format!("parameter '{}' must be a list", key)));
        };
        for pair in pairs {
            steps.push(replacement(pair)?);
        }
    }
    Ok(steps)
}

fn text_step(raw: &str) -> Result<TextStep> {
    // Inline form keeps its case: `replace:FIND=>REPL`
    if let Some(body) = raw.strip_prefix("replace:") {
        let (find, replace) = body
            .split_once("=>")
            .ok_or_else(|| CleaningError::invalid(format!("malformed replace step '{}'", raw)))?;
        return Ok(TextStep::replace(find, replace));
    }
    let step = match normalize_token(raw).as_str() {
        "trim" | "strip" => TextStep::Trim,
        "lowercase" | "lower" => TextStep::Lowercase,
        "uppercase" | "upper" => TextStep::Uppercase,
        "titlecase" | "title" => TextStep::Titlecase,
        "remove-special" | "remove-special-characters" => TextStep::RemoveSpecial,
        "remove-digits" | "remove-numbers" => TextStep::RemoveDigits,
        "remove-duplicate-words" => TextStep::RemoveDuplicateWords,
        other => return Err(unknown("text-cleaning step", other)),
    };
    Ok(step)
}

fn replacement(pair: &JsonValue) -> Result<TextStep> {
    let parts = match pair {
        JsonValue::Object(obj) => obj
            .get("find")
            .and_then(|v| v.as_str())
            .map(|find| (find, obj.get("replace").and_then(|v| v.as_str()).unwrap_or(""))),
        JsonValue::Array(items) if items.len() == 2 => items[0].as_str().zip(items[1].as_str()),
        _ => None,
    };
    parts
        .map(|(find, replace)| TextStep::replace(find, replace))
        .ok_or_else(|| CleaningError::invalid(format!("malformed replacement {}", pair)))
}

pub(crate) fn dedup_config(params: &ParamReader<'_>, defaults: &EngineConfig) -> Result<DedupConfig> {
    let keys = match params.list(&["columns", "subset"])? {
        Some(names) => KeyColumns::Subset(names),
        None => KeyColumns::All,
    };
    let (action, legacy_keep) = match params.token(&["action"])?.as_deref() {
        None | Some("remove") => (DuplicateAction::Remove, None),
        Some("remove-all" | "keep-first") => (DuplicateAction::Remove, Some(Keep::First)),
        Some("keep-last") => (DuplicateAction::Remove, Some(Keep::Last)),
        Some("mark" | "flag") => (DuplicateAction::Mark, None),
        Some("count") => (DuplicateAction::Count, None),
        Some(other) => return Err(unknown("duplicates action", other)),
    };
    let keep = match params.token(&["keep"])?.as_deref() {
        None => legacy_keep.unwrap_or_default(),
        Some("first") => Keep::First,
        Some("last") => Keep::Last,
        Some(other) => return Err(unknown("keep option", other)),
    };

    let mut config = DedupConfig::new(keys, action, keep);
    config.marker_column = defaults.duplicate_column.clone();
    Ok(config)
}

pub(crate) fn normalize_config(params: &ParamReader<'_>, defaults: &EngineConfig) -> Result<NormalizeConfig> {
    let method = match params.token(&["method"])?.as_deref() {
        None | Some("minmax" | "min-max") => NormalizeMethod::MinMax,
        Some("zscore" | "z-score") => NormalizeMethod::ZScore,
        Some("robust") => NormalizeMethod::Robust,
        Some("decimal") => NormalizeMethod::Decimal,
        Some(other) => return Err(unknown("normalization method", other)),
    };
    let range_min = params.number(&["range_min"])?.unwrap_or(defaults.range_min);
    let range_max = params.number(&["range_max"])?.unwrap_or(defaults.range_max);
    Ok(NormalizeConfig::new(method).with_range(range_min, range_max))
}
