//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// An argument could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The loader reported a failure.
    #[error(transparent)]
    Load(#[from] ogcfeat::LoadError),

    /// The load finished without success (failed or superseded).
    #[error("load did not complete: {0}")]
    Incomplete(String),
}
