//! CLI support for brace-lang
//!
//! Provides programmatic access to the `brace` commands so other tools can
//! check expressions without spawning the binary.

mod check;
mod version;

pub use check::{execute_check, CheckOptions, CheckResult};
pub use version::{execute_version_check, VersionReport};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Bindings must be given as a JSON object
    #[error("Input has to be a JSON object of variable bindings, got {0}")]
    InputNotObject(&'static str),

    #[error(transparent)]
    Version(#[from] crate::VersionError),
}
