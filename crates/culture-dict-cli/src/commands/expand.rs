//! `expand`: run the full pipeline and write the dictionary.
//!
//! # Usage
//!
//! ```bash
//! culture-dict expand --config culture.toml
//! culture-dict expand --config culture.toml --model w2v.bin --format json -o dict.json
//! ```
//!
//! Settings are layered: config file, then `CULTURE_DICT_*` environment
//! variables, then command-line flags.

use std::path::PathBuf;

use clap::Args;
use tracing::{error, info};

use culture_dict_core::{
    load_word2vec, write_dictionary, ExpansionConfig, ExpansionPipeline, ModelFormat, OutputFormat,
};

use crate::error::{CliError, CliExitCode};

/// Arguments for the expand command.
#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// TOML configuration with seed words per dimension
    #[arg(short, long)]
    pub config: PathBuf,

    /// word2vec model (overrides model.path)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Model file format: text, binary or auto
    #[arg(long)]
    pub model_format: Option<ModelFormat>,

    /// Output file (overrides output.path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output layout: csv_long, csv_wide or json
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Restriction size R: most frequent words eligible as candidates
    #[arg(long)]
    pub restrict: Option<usize>,

    /// Expansion count N for every dimension without its own n_words
    #[arg(long)]
    pub n_words: Option<usize>,

    /// Rank dimensions one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub report: bool,
}

/// Execute the expand command and return the process exit code.
pub fn handle_expand(args: ExpandArgs) -> i32 {
    match run_expand(args) {
        Ok(()) => CliExitCode::Success.code(),
        Err(e) => {
            let code = e.exit_code();
            error!("expand failed: {} (exit {})", e, code);
            code.code()
        }
    }
}

/// Layer command-line overrides on top of the loaded configuration.
pub(crate) fn apply_overrides(config: &mut ExpansionConfig, args: &ExpandArgs) {
    if let Some(path) = &args.model {
        config.model.path = Some(path.clone());
    }
    if let Some(format) = args.model_format {
        config.model.format = format;
    }
    if let Some(path) = &args.output {
        config.output.path = Some(path.clone());
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(r) = args.restrict {
        config.expansion.restrict = Some(r);
        config.expansion.restrict_fraction = None;
    }
    if let Some(n) = args.n_words {
        config.expansion.n_words = n;
    }
    if args.sequential {
        config.expansion.parallel = false;
    }
}

fn run_expand(args: ExpandArgs) -> Result<(), CliError> {
    let mut config = ExpansionConfig::from_file(&args.config)?.with_env_overrides();
    apply_overrides(&mut config, &args);
    config.validate()?;

    let model_path = config
        .model
        .path
        .clone()
        .ok_or(CliError::MissingSetting("model path"))?;
    let output_path = config
        .output
        .path
        .clone()
        .ok_or(CliError::MissingSetting("output path"))?;

    let oracle = load_word2vec(&model_path, config.model.format)?;

    let pipeline = ExpansionPipeline::from_config(&oracle, &config)?;
    let (dictionary, report) = pipeline.run()?;
    info!("Dictionary created and deduplicated");

    if dictionary.is_empty() {
        return Err(CliError::NothingToWrite);
    }

    write_dictionary(
        &dictionary,
        &output_path,
        config.output.format,
        config.output.delimiter,
    )?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
