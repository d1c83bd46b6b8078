//! Ordered text-normalization pipelines.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value};
use crate::error::{CleaningError, Result};
use crate::operation::OperationKind;
use crate::report::StatsReport;

// Patterns compiled once on first use.
static SPECIAL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Nd}").unwrap());

/// One step of a text-cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum TextStep {
    Trim,
    Lowercase,
    Uppercase,
    Titlecase,
    /// Strip everything except letters, digits and whitespace.
    RemoveSpecial,
    RemoveDigits,
    /// Drop repeated whitespace-separated words, keeping first occurrences.
    RemoveDuplicateWords,
    /// Literal, case-sensitive substring replacement.
    Replace { find: String, replace: String },
}

impl TextStep {
    pub fn name(&self) -> &'static str {
        match self {
            TextStep::Trim => "trim",
            TextStep::Lowercase => "lowercase",
            TextStep::Uppercase => "uppercase",
            TextStep::Titlecase => "titlecase",
            TextStep::RemoveSpecial => "remove-special",
            TextStep::RemoveDigits => "remove-digits",
            TextStep::RemoveDuplicateWords => "remove-duplicate-words",
            TextStep::Replace { .. } => "replace",
        }
    }

    /// Build a replacement step.
    pub fn replace(find: impl Into<String>, replace: impl Into<String>) -> Self {
        TextStep::Replace {
            find: find.into(),
            replace: replace.into(),
        }
    }

    /// Apply this step to one string.
    pub fn apply(&self, text: &str) -> String {
        match self {
            TextStep::Trim => text.trim().to_string(),
            TextStep::Lowercase => text.to_lowercase(),
            TextStep::Uppercase => text.to_uppercase(),
            TextStep::Titlecase => titlecase(text),
            TextStep::RemoveSpecial => SPECIAL_CHARS.replace_all(text, "").into_owned(),
            TextStep::RemoveDigits => DIGITS.replace_all(text, "").into_owned(),
            TextStep::RemoveDuplicateWords => {
                let words: IndexSet<&str> = text.split_whitespace().collect();
                words.into_iter().collect::<Vec<_>>().join(" ")
            }
            TextStep::Replace { find, replace } => text.replace(find.as_str(), replace),
        }
    }
}

/// Uppercase the first letter of every run of letters, lowercase the rest.
///
/// A first letter whose uppercase form expands (`ß` to `SS`) keeps only the
/// leading char uppercase, so a second pass is a no-op.
fn titlecase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                let mut upper = c.to_uppercase();
                out.extend(upper.next());
                out.extend(upper.flat_map(char::to_lowercase));
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Run `steps` in order over every cell of `column`.
///
/// Missing cells pass through. Other non-text cells are rendered to text
/// first, and that type change alone counts the row as affected.
pub fn clean(dataset: &mut Dataset, column: &str, steps: &[TextStep]) -> Result<StatsReport> {
    if steps.is_empty() {
        return Err(CleaningError::invalid("text pipeline has no steps"));
    }
    if steps
        .iter()
        .any(|s| matches!(s, TextStep::Replace { find, .. } if find.is_empty()))
    {
        return Err(CleaningError::invalid("replacement find string must not be empty"));
    }

    let values = dataset.require_column(column)?;
    let mut cleaned = Vec::with_capacity(values.len());
    let mut affected = Vec::new();

    for (row, value) in values.iter().enumerate() {
        if value.is_missing() {
            cleaned.push(value.clone());
            continue;
        }
        let original = value.render();
        let result = Value::Text(steps.iter().fold(original, |text, step| step.apply(&text)));
        if result != *value {
            affected.push(row);
        }
        cleaned.push(result);
    }

    tracing::debug!(column, steps = steps.len(), changed = affected.len(), "cleaned text");

    dataset.replace_column(column, cleaned)?;

    let step_names: Vec<&str> = steps.iter().map(TextStep::name).collect();
    Ok(StatsReport::new(OperationKind::TextCleaning.name(), Some(column))
        .with("steps_applied", step_names.join(","))
        .with("cells_changed", affected.len())
        .with_affected_rows(affected))
}
