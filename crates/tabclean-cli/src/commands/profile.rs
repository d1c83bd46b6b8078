//! Profile command - descriptive statistics per column.

use std::path::PathBuf;

use colored::Colorize;
use tabclean::{ColumnProfile, ColumnType, profile_column, profile_dataset};

use crate::input::read_table;

pub fn run(file: PathBuf, column: Option<String>, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let table = read_table(&file)?;
    let dataset = &table.dataset;

    let profiles = match column {
        Some(name) => vec![profile_column(dataset, &name)?],
        None => profile_dataset(dataset),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns)",
        "Profile of".cyan().bold(),
        file.display().to_string().white(),
        dataset.row_count(),
        dataset.column_count()
    );

    for profile in &profiles {
        println!();
        print_profile(profile);
    }

    Ok(())
}

fn print_profile(profile: &ColumnProfile) {
    let type_label = match profile.column_type {
        ColumnType::Numeric => "numeric".green(),
        ColumnType::Text => "text".blue(),
        ColumnType::Boolean => "boolean".magenta(),
        ColumnType::Temporal => "temporal".cyan(),
        ColumnType::Mixed => "mixed".yellow(),
    };
    println!("{} [{}]", profile.name.white().bold(), type_label);

    let missing = if profile.missing_count > 0 {
        profile.missing_count.to_string().yellow()
    } else {
        profile.missing_count.to_string().white()
    };
    println!(
        "  count: {}  missing: {}  unique: {}",
        profile.count, missing, profile.unique_count
    );

    if let Some(stats) = &profile.numeric {
        println!(
            "  min: {:.4}  q1: {:.4}  median: {:.4}  q3: {:.4}  max: {:.4}",
            stats.min, stats.q1, stats.median, stats.q3, stats.max
        );
        println!(
            "  mean: {:.4}  std: {:.4}  mode: {:.4}",
            stats.mean, stats.std, stats.mode
        );
        println!(
            "  skewness: {:.4}  kurtosis: {:.4}",
            stats.skewness, stats.kurtosis
        );
    }
}
