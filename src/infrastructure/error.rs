//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} failed: {message}")]
    Git {
        command: String,
        message: String,
        exit_code: Option<i32>,
    },

    #[error("git {command} returned unexpected output: {output:?}")]
    UnexpectedOutput { command: String, output: String },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a git failure for a command that exited non-zero.
    pub fn git(command: impl Into<String>, message: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::Git {
            command: command.into(),
            message: message.into(),
            exit_code,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
