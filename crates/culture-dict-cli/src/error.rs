//! CLI error type and exit codes.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | General or I/O error |
//! | 2 | Embedding model could not be loaded |
//! | 3 | Invalid configuration |
//! | 4 | Every dimension was skipped, nothing written |

use std::fmt;

use culture_dict_core::ExpansionError;
use thiserror::Error;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliExitCode {
    Success,
    GeneralError,
    OracleUnavailable,
    InvalidConfiguration,
    NothingToWrite,
}

impl CliExitCode {
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            CliExitCode::Success => 0,
            CliExitCode::GeneralError => 1,
            CliExitCode::OracleUnavailable => 2,
            CliExitCode::InvalidConfiguration => 3,
            CliExitCode::NothingToWrite => 4,
        }
    }
}

impl From<CliExitCode> for i32 {
    fn from(code: CliExitCode) -> Self {
        code.code()
    }
}

impl fmt::Display for CliExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

/// Map a core error to its exit code.
pub fn exit_code_for_error(e: &ExpansionError) -> CliExitCode {
    match e {
        ExpansionError::InvalidConfiguration { .. } => CliExitCode::InvalidConfiguration,
        ExpansionError::OracleUnavailable { .. } => CliExitCode::OracleUnavailable,
        // Never escapes the pipeline; a skipped dimension is not a failure.
        ExpansionError::NoResolvedSeedWords { .. } => CliExitCode::GeneralError,
        ExpansionError::Io(_) | ExpansionError::Serialization { .. } => CliExitCode::GeneralError,
    }
}

/// Errors raised by command handlers.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Expansion(#[from] ExpansionError),

    /// A required setting was given neither in the config nor on the
    /// command line.
    #[error("Missing {0}: set it in the config file or pass it on the command line")]
    MissingSetting(&'static str),

    /// No dimension survived; writing would publish an empty dictionary.
    #[error("Every dimension was skipped, no dictionary written")]
    NothingToWrite,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> CliExitCode {
        match self {
            CliError::Expansion(e) => exit_code_for_error(e),
            CliError::MissingSetting(_) => CliExitCode::InvalidConfiguration,
            CliError::NothingToWrite => CliExitCode::NothingToWrite,
            CliError::Serialization(_) => CliExitCode::GeneralError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliExitCode::Success.code(), 0);
        assert_eq!(
            exit_code_for_error(&ExpansionError::invalid_config("x")).code(),
            3
        );
        assert_eq!(
            exit_code_for_error(&ExpansionError::oracle_unavailable("x")).code(),
            2
        );
        assert_eq!(CliError::NothingToWrite.exit_code().code(), 4);
        assert_eq!(CliError::MissingSetting("model path").exit_code().code(), 3);
        let io = CliError::from(ExpansionError::Io(std::io::Error::other("x")));
        assert_eq!(i32::from(io.exit_code()), 1);
    }

    #[test]
    fn test_messages() {
        let e = CliError::MissingSetting("model path");
        assert!(e.to_string().starts_with("Missing model path"));
        let e = CliError::from(ExpansionError::oracle_unavailable("bad header"));
        assert_eq!(e.to_string(), "Embedding oracle unavailable: bad header");
    }
}
