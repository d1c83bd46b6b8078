//! Apply command - run one cleaning operation over a file.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use serde_json::{Map, Value as JsonValue};
use tabclean::{CleaningEngine, EngineConfig, StatValue, StatsReport};

use crate::input::{default_output_path, delimiter_for, read_table, write_table};

pub fn run(
    file: PathBuf,
    operation: String,
    column: Option<String>,
    params: String,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let params: Map<String, JsonValue> = serde_json::from_str(&params)
        .map_err(|e| format!("--params must be a JSON object: {}", e))?;

    let engine = match config {
        Some(path) => CleaningEngine::with_config(EngineConfig::from_json(&fs::read_to_string(&path)?)?),
        None => CleaningEngine::new(),
    };

    let table = read_table(&file)?;
    let rows_before = table.dataset.row_count();

    let outcome = engine.apply_operation(table.dataset, column.as_deref(), &operation, &params);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_report(&outcome.stats, rows_before, outcome.dataset.row_count());
    }

    if let Some(error) = outcome.error {
        return Err(error.into());
    }

    let output_path = output.unwrap_or_else(|| default_output_path(&file));
    let delimiter = delimiter_for(&output_path, table.delimiter);
    write_table(&outcome.dataset, &output_path, delimiter)?;

    if !json_output {
        println!();
        println!(
            "{} {}",
            "Saved cleaned data to".green().bold(),
            output_path.display().to_string().cyan()
        );
    }

    Ok(())
}

fn print_report(stats: &StatsReport, rows_before: usize, rows_after: usize) {
    let target = stats
        .column
        .as_deref()
        .map(|c| format!(" on column {}", c.white().bold()))
        .unwrap_or_default();
    println!("{}{}", stats.operation.cyan().bold(), target);
    println!();

    let width = stats.metrics.keys().map(|k| k.len()).max().unwrap_or(0);
    for (name, value) in &stats.metrics {
        let rendered = match value {
            StatValue::Bool(true) => "yes".green(),
            StatValue::Bool(false) => "no".red(),
            StatValue::Float(x) => format!("{:.4}", x).white(),
            other if name == "error" => other.to_string().red(),
            other => other.to_string().white(),
        };
        println!("  {:width$}  {}", name, rendered, width = width);
    }

    if rows_before != rows_after {
        println!();
        println!(
            "Rows: {} -> {}",
            rows_before.to_string().white(),
            rows_after.to_string().yellow().bold()
        );
    }
}
