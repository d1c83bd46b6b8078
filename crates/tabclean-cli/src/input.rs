//! Reading and writing delimited files.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tabclean::Dataset;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// A decoded file and the delimiter it used.
pub struct LoadedTable {
    pub dataset: Dataset,
    pub delimiter: u8,
}

/// Read a delimited file into a dataset, detecting the delimiter.
pub fn read_table(path: &Path) -> Result<LoadedTable, Box<dyn Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    let bytes = fs::read(path)?;
    let delimiter = detect_delimiter(&bytes).ok_or("File contains no data")?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err("No columns found".into());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.truncate(headers.len());
        rows.push(row);
    }

    tracing::debug!(
        path = %path.display(),
        delimiter = %(delimiter as char).escape_default(),
        columns = headers.len(),
        rows = rows.len(),
        "read table"
    );

    Ok(LoadedTable {
        dataset: Dataset::from_text_rows(headers, rows)?,
        delimiter,
    })
}

/// Write a dataset, rendering missing cells as empty fields.
pub fn write_table(dataset: &Dataset, path: &Path, delimiter: u8) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    let (headers, rows) = dataset.to_text_rows();
    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Default output path: `<stem>_cleaned.<ext>` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    input.with_file_name(format!("{}_cleaned.{}", stem, ext))
}

/// Delimiter implied by an output file extension.
pub fn delimiter_for(path: &Path, fallback: u8) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => fallback,
    }
}

/// Pick the delimiter that splits the first lines most consistently.
fn detect_delimiter(bytes: &[u8]) -> Option<u8> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();
    if lines.is_empty() {
        return None;
    }

    let mut best = (b',', 0usize);
    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines.iter().map(|l| count_unquoted(l, delim)).collect();
        let first = counts[0];
        if first == 0 {
            continue;
        }
        let score = if counts.iter().all(|&c| c == first) {
            // Tabs rarely appear inside values
            first * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first
        };
        if score > best.1 {
            best = (delim, score);
        }
    }
    Some(best.0)
}

/// Count delimiter occurrences outside double quotes.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let delim = delimiter as char;
    let mut in_quotes = false;
    line.chars()
        .filter(|&ch| {
            if ch == '"' {
                in_quotes = !in_quotes;
            }
            ch == delim && !in_quotes
        })
        .count()
}
