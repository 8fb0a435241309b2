//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent policy and precondition violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("refusing to use catalog directory {path} (resolves to {resolved}): must be inside one of {roots}")]
    PathNotAllowed {
        path: PathBuf,
        resolved: PathBuf,
        roots: String,
    },

    #[error("refusing to use catalog directory {0}: it is a dangling symlink")]
    DanglingSymlink(PathBuf),

    #[error("no catalog repository at {0}: run --init, or clone the team catalog remote there")]
    NotARepository(PathBuf),
}
