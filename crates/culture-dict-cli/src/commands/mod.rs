//! CLI command handlers
//!
//! # Modules
//!
//! - `expand`: Run the expansion pipeline and write the dictionary
//! - `inspect`: Summarise an embedding model
//! - `validate`: Check a configuration file

pub mod expand;
pub mod inspect;
pub mod validate;
