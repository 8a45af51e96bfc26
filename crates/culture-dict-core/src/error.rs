//! Error type for every dictionary-expansion failure.
//!
//! # Error Categories
//!
//! | Category | Variants | Scope |
//! |----------|----------|-------|
//! | Configuration | InvalidConfiguration | Fatal for the whole run |
//! | Dimension | NoResolvedSeedWords | Recoverable, dimension is skipped |
//! | Oracle | OracleUnavailable | Fatal, nothing is processed |
//! | Output | Io, Serialization | Fatal, nothing is published |
//!
//! Per-dimension failures never abort the run. Global failures abort before
//! any output is written so a half-populated dictionary never looks complete.

use thiserror::Error;

/// Error type for all expansion pipeline failures.
#[derive(Debug, Error)]
pub enum ExpansionError {
    /// Non-positive restriction size or expansion count, empty or duplicated
    /// seed words, malformed configuration file.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// None of a dimension's seed words exist in the embedding vocabulary.
    #[error("No seed word of dimension '{dimension}' is in the embedding vocabulary")]
    NoResolvedSeedWords { dimension: String },

    /// The embedding model or its vocabulary could not be loaded.
    #[error("Embedding oracle unavailable: {message}")]
    OracleUnavailable { message: String },

    /// Writing the dictionary failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering the dictionary as JSON failed.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Result alias used across the crate.
pub type ExpansionResult<T> = Result<T, ExpansionError>;

impl ExpansionError {
    /// Shorthand for [`ExpansionError::InvalidConfiguration`].
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Shorthand for [`ExpansionError::OracleUnavailable`].
    pub fn oracle_unavailable(message: impl Into<String>) -> Self {
        Self::OracleUnavailable {
            message: message.into(),
        }
    }

    /// True when the error only invalidates a single dimension.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoResolvedSeedWords { .. })
    }

    /// True when the error must abort the whole run.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "ERR_INVALID_CONFIGURATION",
            Self::NoResolvedSeedWords { .. } => "ERR_NO_RESOLVED_SEED_WORDS",
            Self::OracleUnavailable { .. } => "ERR_ORACLE_UNAVAILABLE",
            Self::Io(_) => "ERR_IO",
            Self::Serialization { .. } => "ERR_SERIALIZATION",
        }
    }
}

impl From<serde_json::Error> for ExpansionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}
