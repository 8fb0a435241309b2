//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    /// Unrecognized invocation; carries the usage text.
    #[error("{0}")]
    Usage(String),

    /// `--help` or `--version` output.
    #[error("{0}")]
    Display(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Display(_) => crate::exitcode::OK,
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(_) => crate::exitcode::FAILURE,
        }
    }
}
