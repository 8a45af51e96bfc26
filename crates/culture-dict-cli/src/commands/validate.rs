//! `validate-config`: parse and validate a configuration without a model.

use std::path::PathBuf;

use clap::Args;
use tracing::{error, info};

use culture_dict_core::ExpansionConfig;

use crate::error::{CliError, CliExitCode};

/// Arguments for the validate-config command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// TOML configuration to check
    #[arg(short, long)]
    pub config: PathBuf,
}

pub fn handle_validate(args: ValidateArgs) -> i32 {
    match run_validate(&args) {
        Ok(summary) => {
            println!("{}", summary);
            CliExitCode::Success.code()
        }
        Err(e) => {
            let code = e.exit_code();
            error!("{}: {} (exit {})", args.config.display(), e, code);
            code.code()
        }
    }
}

fn run_validate(args: &ValidateArgs) -> Result<String, CliError> {
    let config = ExpansionConfig::from_file(&args.config)?.with_env_overrides();
    let specs = config.dimension_specs()?;
    info!("{} is valid", args.config.display());

    let mut summary = format!("{} dimension(s):", specs.len());
    for spec in &specs {
        summary.push_str(&format!(
            "\n  {} ({} seed(s), n_words {})",
            spec.name,
            spec.seed_words.len(),
            spec.n_words
        ));
    }
    Ok(summary)
}
