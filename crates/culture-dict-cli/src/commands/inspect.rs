//! `inspect`: summarise an embedding model before choosing seed words.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use tracing::error;

use culture_dict_core::{load_word2vec, EmbeddingOracle, ModelFormat};

use crate::error::{CliError, CliExitCode};

/// Arguments for the inspect command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// word2vec model to inspect
    #[arg(short, long)]
    pub model: PathBuf,

    /// Model file format: text, binary or auto
    #[arg(long, default_value = "auto")]
    pub model_format: ModelFormat,

    /// How many of the most frequent words to list
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Report vocabulary rank of these words (repeatable)
    #[arg(short, long)]
    pub word: Vec<String>,
}

pub fn handle_inspect(args: InspectArgs) -> i32 {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run_inspect(&args, &mut out) {
        Ok(()) => CliExitCode::Success.code(),
        Err(e) => {
            let code = e.exit_code();
            error!("inspect failed: {} (exit {})", e, code);
            code.code()
        }
    }
}

fn run_inspect<W: Write>(args: &InspectArgs, out: &mut W) -> Result<(), CliError> {
    let oracle = load_word2vec(&args.model, args.model_format)?;
    describe(&oracle, args.top, &args.word, out)
}

/// Write the model summary.
pub(crate) fn describe<O, W>(oracle: &O, top: usize, words: &[String], out: &mut W) -> Result<(), CliError>
where
    O: EmbeddingOracle + ?Sized,
    W: Write,
{
    let io_err = |e: io::Error| CliError::from(culture_dict_core::ExpansionError::Io(e));

    writeln!(out, "vocabulary size: {}", oracle.vocabulary_size()).map_err(io_err)?;
    writeln!(out, "vector dimension: {}", oracle.dimension()).map_err(io_err)?;

    let shown = top.min(oracle.vocabulary_size());
    if shown > 0 {
        writeln!(out, "most frequent {} word(s):", shown).map_err(io_err)?;
        for (rank, word) in oracle.vocabulary_by_frequency()[..shown].iter().enumerate() {
            writeln!(out, "  {:>6}  {}", rank, word).map_err(io_err)?;
        }
    }

    for word in words {
        let written = match oracle.frequency_rank(word) {
            Some(rank) => writeln!(out, "'{}': rank {}", word, rank),
            None => writeln!(out, "'{}': not in vocabulary", word),
        };
        written.map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use culture_dict_core::KeyedVectors;

    #[test]
    fn test_describe_output() {
        let kv = KeyedVectors::from_entries(vec![
            ("the".to_string(), vec![1.0, 0.0]),
            ("culture".to_string(), vec![0.0, 1.0]),
            ("value".to_string(), vec![0.5, 0.5]),
        ])
        .unwrap();
        let mut buf = Vec::new();
        describe(
            &kv,
            2,
            &["value".to_string(), "missing".to_string()],
            &mut buf,
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("vocabulary size: 3"));
        assert!(text.contains("vector dimension: 2"));
        assert!(text.contains("most frequent 2 word(s):"));
        assert!(text.contains("culture"));
        assert!(!text.contains("  2  value"));
        assert!(text.contains("'value': rank 2"));
        assert!(text.contains("'missing': not in vocabulary"));
    }
}
