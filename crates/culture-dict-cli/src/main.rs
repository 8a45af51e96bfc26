//! Culture dictionary CLI
//!
//! Expands a handful of seed words per cultural dimension into a ranked,
//! deduplicated dictionary using a pretrained word2vec model.
//!
//! # Commands
//!
//! - `expand`: Build the dictionary and write it to disk
//! - `inspect`: Summarise a model's vocabulary
//! - `validate-config`: Check a configuration file without loading a model
//!
//! Exit codes are listed in [`error`].

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod error;

/// Culture dictionary expansion over word embeddings
#[derive(Parser)]
#[command(name = "culture-dict")]
#[command(version)]
#[command(about = "Expand seed words into a culture dictionary using word embeddings")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand seed words and write the dictionary
    ///
    /// Loads the model, ranks candidates for every dimension, resolves
    /// words claimed by several dimensions and writes the result.
    Expand(commands::expand::ExpandArgs),
    /// Print vocabulary size, vector width and frequent words of a model
    Inspect(commands::inspect::InspectArgs),
    /// Parse and validate a configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Expand(args) => commands::expand::handle_expand(args),
        Commands::Inspect(args) => commands::inspect::handle_inspect(args),
        Commands::ValidateConfig(args) => commands::validate::handle_validate(args),
    };

    std::process::exit(exit_code);
}
