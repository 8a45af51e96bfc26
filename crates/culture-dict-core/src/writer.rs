//! Dictionary writer.
//!
//! | Format | Layout |
//! |--------|--------|
//! | `csv_long` | header `dimension,word,similarity`, one row per word |
//! | `csv_wide` | one column per dimension, words listed down the column |
//! | `json` | `{generated_at, dimensions: [{name, words: [{word, score}]}], skipped}` |
//!
//! Files are written atomically: the table goes to a temp file next to the
//! target, is synced, then renamed over it. A failed run never leaves a
//! truncated dictionary behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ExpansionError, ExpansionResult};
use crate::types::{CultureDictionary, DictionaryDimension, SkippedDimension};

/// Output table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    CsvLong,
    CsvWide,
    Json,
}

impl OutputFormat {
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::CsvLong, OutputFormat::CsvWide, OutputFormat::Json]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::CsvLong => "csv_long",
            OutputFormat::CsvWide => "csv_wide",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ExpansionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "csv_long" | "csv" | "long" => Ok(OutputFormat::CsvLong),
            "csv_wide" | "wide" => Ok(OutputFormat::CsvWide),
            "json" => Ok(OutputFormat::Json),
            other => Err(ExpansionError::invalid_config(format!(
                "unknown output format '{}', expected one of: csv_long, csv_wide, json",
                other
            ))),
        }
    }
}

/// JSON document layout.
#[derive(Debug, Serialize)]
struct JsonDictionary<'a> {
    generated_at: DateTime<Utc>,
    dimensions: &'a [DictionaryDimension],
    skipped: &'a [SkippedDimension],
}

/// Render `dict` into any writer.
pub fn render<W: Write>(
    dict: &CultureDictionary,
    format: OutputFormat,
    delimiter: char,
    out: &mut W,
) -> ExpansionResult<()> {
    match format {
        OutputFormat::CsvLong => render_long(dict, delimiter, out),
        OutputFormat::CsvWide => render_wide(dict, delimiter, out),
        OutputFormat::Json => render_json(dict, Utc::now(), out),
    }
}

fn render_long<W: Write>(dict: &CultureDictionary, delimiter: char, out: &mut W) -> ExpansionResult<()> {
    let sep = delimiter.to_string();
    writeln!(out, "dimension{sep}word{sep}similarity")?;
    for row in dict.rows() {
        writeln!(
            out,
            "{}{sep}{}{sep}{:.6}",
            quote(row.dimension, delimiter),
            quote(row.word, delimiter),
            row.similarity
        )?;
    }
    Ok(())
}

fn render_wide<W: Write>(dict: &CultureDictionary, delimiter: char, out: &mut W) -> ExpansionResult<()> {
    let sep = delimiter.to_string();
    let dims = dict.dimensions();

    let header: Vec<String> = dims.iter().map(|d| quote(&d.name, delimiter)).collect();
    writeln!(out, "{}", header.join(&sep))?;

    let depth = dims.iter().map(|d| d.words.len()).max().unwrap_or(0);
    for i in 0..depth {
        let cells: Vec<String> = dims
            .iter()
            .map(|d| {
                d.words
                    .get(i)
                    .map(|w| quote(&w.word, delimiter))
                    .unwrap_or_default()
            })
            .collect();
        writeln!(out, "{}", cells.join(&sep))?;
    }
    Ok(())
}

fn render_json<W: Write>(
    dict: &CultureDictionary,
    generated_at: DateTime<Utc>,
    out: &mut W,
) -> ExpansionResult<()> {
    let doc = JsonDictionary {
        generated_at,
        dimensions: dict.dimensions(),
        skipped: dict.skipped(),
    };
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)?;
    Ok(())
}

/// Quote a field if it contains the delimiter, a quote or a line break.
fn quote(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains(['"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write `dict` to `path` atomically.
///
/// # Errors
/// `Io` if the directory cannot be created or the file cannot be written.
pub fn write_dictionary(
    dict: &CultureDictionary,
    path: impl AsRef<Path>,
    format: OutputFormat,
    delimiter: char,
) -> ExpansionResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| ExpansionError::invalid_config(format!("'{}' is not a file path", path.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    debug!("Writing {} dictionary to temp file {}", format.as_str(), temp_path.display());
    let result = (|| -> ExpansionResult<()> {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        render(dict, format, delimiter, &mut writer)?;
        let file = writer
            .into_inner()
            .map_err(|e| ExpansionError::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ExpansionError::Io(e)
    })?;

    info!(
        "Dictionary saved at {} ({} dimensions, {} words)",
        path.display(),
        dict.dimensions().len(),
        dict.word_count()
    );
    Ok(())
}
