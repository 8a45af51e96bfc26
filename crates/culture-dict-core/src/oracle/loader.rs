//! word2vec model loaders.
//!
//! Both formats written by gensim's `save_word2vec_format` are supported.
//! Words appear in descending corpus frequency, which is exactly the order
//! [`KeyedVectors`] expects.
//!
//! ```text
//! text:    "<count> <dim>\n" then "word v1 v2 ... vdim\n" per word
//! binary:  "<count> <dim>\n" then "word " + dim little-endian f32 [+ "\n"]
//! ```
//!
//! Text files without the header line (GloVe style) are accepted; the width
//! is taken from the first row.
//!
//! Every failure maps to `OracleUnavailable`: a model that cannot be read
//! completely aborts the run before any dimension is processed.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{EmbeddingOracle, KeyedVectors};
use crate::error::{ExpansionError, ExpansionResult};

/// On-disk layout of a word2vec model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    /// Whitespace separated text.
    Text,
    /// Binary with little-endian `f32` components.
    Binary,
    /// Pick by extension: `.bin` is binary, anything else is text.
    #[default]
    Auto,
}

impl ModelFormat {
    /// All formats, for help text and validation.
    pub fn all() -> &'static [ModelFormat] {
        &[ModelFormat::Text, ModelFormat::Binary, ModelFormat::Auto]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFormat::Text => "text",
            ModelFormat::Binary => "binary",
            ModelFormat::Auto => "auto",
        }
    }

    /// Replace `Auto` with a concrete format for `path`.
    pub fn resolve(self, path: &Path) -> ModelFormat {
        match self {
            ModelFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("bin") => ModelFormat::Binary,
                _ => ModelFormat::Text,
            },
            other => other,
        }
    }
}

impl std::str::FromStr for ModelFormat {
    type Err = ExpansionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ModelFormat::Text),
            "binary" | "bin" => Ok(ModelFormat::Binary),
            "auto" => Ok(ModelFormat::Auto),
            other => Err(ExpansionError::invalid_config(format!(
                "unknown model format '{}', expected one of: text, binary, auto",
                other
            ))),
        }
    }
}

/// Load a word2vec model from disk.
///
/// # Errors
/// `OracleUnavailable` if the file is missing, truncated or malformed.
pub fn load_word2vec(path: impl AsRef<Path>, format: ModelFormat) -> ExpansionResult<KeyedVectors> {
    let path = path.as_ref();
    let format = format.resolve(path);
    info!("Loading {} word2vec model from {}", format.as_str(), path.display());

    let file = File::open(path).map_err(|e| {
        ExpansionError::oracle_unavailable(format!("cannot open '{}': {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);

    let kv = match format {
        ModelFormat::Binary => parse_binary(reader),
        _ => parse_text(reader),
    }
    .map_err(|e| match e {
        ExpansionError::OracleUnavailable { message } => ExpansionError::oracle_unavailable(
            format!("'{}': {}", path.display(), message),
        ),
        other => other,
    })?;

    info!(
        "Loaded {} words x {} dimensions",
        kv.vocabulary_size(),
        kv.dimension()
    );
    Ok(kv)
}

/// Parse the `"<count> <dim>"` header line.
/// Widest vector accepted from a binary header.
const MAX_BINARY_DIMENSION: usize = 1 << 16;

/// Entries reserved up front, whatever the header claims.
const PREALLOCATED_ENTRIES: usize = 1 << 16;

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let count = parts.next()?.parse().ok()?;
    let dim = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((count, dim))
}

/// Parse the text format from any buffered reader.
pub fn parse_text<R: BufRead>(reader: R) -> ExpansionResult<KeyedVectors> {
    let mut lines = reader.lines().enumerate();
    let mut header = None;
    let mut entries = Vec::new();

    if let Some((_, first)) = lines.next() {
        let first = first.map_err(read_error)?;
        match parse_header(&first) {
            Some(h) => header = Some(h),
            None if first.trim().is_empty() => {}
            None => entries.push(parse_text_row(&first, 1, None)?),
        }
    }

    let width = header.map(|(_, dim)| dim);
    for (idx, line) in lines {
        let line = line.map_err(read_error)?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(parse_text_row(&line, idx + 1, width)?);
    }

    if let Some((count, _)) = header {
        if entries.len() != count {
            return Err(ExpansionError::oracle_unavailable(format!(
                "header declares {} words but {} were read",
                count,
                entries.len()
            )));
        }
    }
    debug!("Parsed {} text rows", entries.len());
    KeyedVectors::from_entries(entries)
}

fn parse_text_row(
    line: &str,
    line_no: usize,
    width: Option<usize>,
) -> ExpansionResult<(String, Vec<f32>)> {
    let mut parts = line.split_whitespace();
    let word = parts
        .next()
        .ok_or_else(|| ExpansionError::oracle_unavailable(format!("line {}: empty row", line_no)))?;
    let vector = parts
        .map(|p| p.parse::<f32>())
        .collect::<Result<Vec<f32>, _>>()
        .map_err(|e| {
            ExpansionError::oracle_unavailable(format!("line {}: bad component: {}", line_no, e))
        })?;
    if let Some(dim) = width {
        if vector.len() != dim {
            return Err(ExpansionError::oracle_unavailable(format!(
                "line {}: '{}' has {} components, header says {}",
                line_no,
                word,
                vector.len(),
                dim
            )));
        }
    }
    Ok((word.to_string(), vector))
}

/// Parse the binary format from any buffered reader.
pub fn parse_binary<R: BufRead>(mut reader: R) -> ExpansionResult<KeyedVectors> {
    let mut header = String::new();
    reader.read_line(&mut header).map_err(read_error)?;
    let (count, dim) = parse_header(&header).ok_or_else(|| {
        ExpansionError::oracle_unavailable(format!("bad binary header '{}'", header.trim()))
    })?;

    if dim == 0 || dim > MAX_BINARY_DIMENSION {
        return Err(ExpansionError::oracle_unavailable(format!(
            "binary header declares vector width {}, expected 1..={}",
            dim, MAX_BINARY_DIMENSION
        )));
    }
    let row_bytes = dim.checked_mul(4).ok_or_else(|| {
        ExpansionError::oracle_unavailable(format!("vector width {} overflows", dim))
    })?;

    // Header counts are untrusted; grow past this as entries arrive.
    let mut entries = Vec::with_capacity(count.min(PREALLOCATED_ENTRIES));
    let mut word_buf = Vec::new();
    let mut vec_buf = vec![0u8; row_bytes];

    for i in 0..count {
        word_buf.clear();
        read_word(&mut reader, &mut word_buf)?;
        if word_buf.is_empty() {
            return Err(ExpansionError::oracle_unavailable(format!(
                "entry {}: unexpected end of file, header declares {} words",
                i, count
            )));
        }
        let word = String::from_utf8_lossy(&word_buf).into_owned();

        reader.read_exact(&mut vec_buf).map_err(|e| {
            ExpansionError::oracle_unavailable(format!("entry {} ('{}'): {}", i, word, e))
        })?;
        let vector = vec_buf
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        entries.push((word, vector));
    }
    debug!("Parsed {} binary entries", entries.len());
    KeyedVectors::from_entries(entries)
}

/// Read bytes up to the next space, skipping the newlines gensim writes
/// between entries. Leaves `buf` empty at end of input.
fn read_word<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> ExpansionResult<()> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte).map_err(read_error)? {
            0 => return Ok(()),
            _ => match byte[0] {
                b' ' if !buf.is_empty() => return Ok(()),
                b'\n' | b'\r' | b' ' => continue,
                b => buf.push(b),
            },
        }
    }
}

fn read_error(e: std::io::Error) -> ExpansionError {
    ExpansionError::oracle_unavailable(format!("read failed: {}", e))
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    fn binary_model(entries: &[(&str, &[f32])], trailing_newline: bool) -> Vec<u8> {
        let dim = entries[0].1.len();
        let mut out = format!("{} {}\n", entries.len(), dim).into_bytes();
        for (word, vector) in entries {
            out.extend_from_slice(word.as_bytes());
            out.push(b' ');
            for x in *vector {
                out.extend_from_slice(&x.to_le_bytes());
            }
            if trailing_newline {
                out.push(b'\n');
            }
        }
        out
    }

    #[test]
    fn test_binary_oversized_header_is_rejected() {
        let err = parse_binary(Cursor::new(&b"18446744073709551615 2\n"[..])).unwrap_err();
        assert!(matches!(err, ExpansionError::OracleUnavailable { .. }));

        let err = parse_binary(Cursor::new(&b"3 4611686018427387904\n"[..])).unwrap_err();
        assert!(matches!(err, ExpansionError::OracleUnavailable { .. }));

        let err = parse_binary(Cursor::new(&b"3 0\n"[..])).unwrap_err();
        assert!(matches!(err, ExpansionError::OracleUnavailable { .. }));
    }

    #[test]
    fn test_parse_text_with_header() {
        let data = "3 2\nthe 0.1 0.2\ncompany -1.5 2\nvalue 3e-1 0.0\n";
        let kv = parse_text(Cursor::new(data)).unwrap();
        assert_eq!(kv.vocabulary_size(), 3);
        assert_eq!(kv.dimension(), 2);
        assert_eq!(kv.frequency_rank("value"), Some(2));
        assert_eq!(kv.vector_of("company"), Some(&[-1.5, 2.0][..]));
    }

    #[test]
    fn test_parse_text_without_header() {
        let data = "alpha 1 0 0\nbeta 0 1 0\n\n";
        let kv = parse_text(Cursor::new(data)).unwrap();
        assert_eq!(kv.vocabulary_size(), 2);
        assert_eq!(kv.dimension(), 3);
        assert_eq!(kv.frequency_rank("alpha"), Some(0));
    }

    #[test]
    fn test_parse_text_count_mismatch() {
        let err = parse_text(Cursor::new("5 2\na 1 2\n")).unwrap_err();
        assert!(matches!(err, ExpansionError::OracleUnavailable { .. }));
        assert!(err.to_string().contains("declares 5"));
    }

    #[test]
    fn test_parse_text_width_mismatch() {
        let err = parse_text(Cursor::new("2 2\na 1 2\nb 1 2 3\n")).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_parse_text_bad_float() {
        let err = parse_text(Cursor::new("1 2\na 1 x\n")).unwrap_err();
        assert!(err.to_string().contains("bad component"));
    }

    #[test]
    fn test_parse_binary_round_trip_layouts() {
        let entries: &[(&str, &[f32])] = &[("culture", &[0.5, -0.25]), ("team", &[1.0, 2.0])];
        for trailing in [true, false] {
            let bytes = binary_model(entries, trailing);
            let kv = parse_binary(Cursor::new(bytes)).unwrap();
            assert_eq!(kv.vocabulary_size(), 2);
            assert_eq!(kv.vector_of("team"), Some(&[1.0, 2.0][..]));
            assert_eq!(kv.frequency_rank("culture"), Some(0));
        }
    }

    #[test]
    fn test_parse_binary_truncated() {
        let mut bytes = binary_model(&[("a", &[1.0, 2.0]), ("b", &[3.0, 4.0])], true);
        bytes.truncate(bytes.len() - 5);
        let err = parse_binary(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ExpansionError::OracleUnavailable { .. }));
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(ModelFormat::Auto.resolve(Path::new("w2v.bin")), ModelFormat::Binary);
        assert_eq!(ModelFormat::Auto.resolve(Path::new("w2v.txt")), ModelFormat::Text);
        assert_eq!(ModelFormat::Text.resolve(Path::new("w2v.bin")), ModelFormat::Text);
        assert_eq!("BIN".parse::<ModelFormat>().unwrap(), ModelFormat::Binary);
        assert!("parquet".parse::<ModelFormat>().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.txt");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "2 2").unwrap();
        writeln!(f, "x 1 0").unwrap();
        writeln!(f, "y 0 1").unwrap();
        drop(f);

        let kv = load_word2vec(&path, ModelFormat::Auto).unwrap();
        assert_eq!(kv.vocabulary_size(), 2);
    }

    #[test]
    fn test_missing_file_is_oracle_unavailable() {
        let err = load_word2vec("/definitely/not/here.txt", ModelFormat::Text).unwrap_err();
        assert!(matches!(err, ExpansionError::OracleUnavailable { .. }));
        assert!(err.is_fatal());
    }
}
