//! Domain entities: core data structures

use std::fmt;
use std::path::{Path, PathBuf};

/// The five catalog operations the tool can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    Status,
    Init,
    Push,
    Pull,
    Full,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Status => "status",
            Operation::Init => "init",
            Operation::Push => "push",
            Operation::Pull => "pull",
            Operation::Full => "full",
        };
        f.write_str(name)
    }
}

/// How an operation ended.
///
/// `NoOp` means "nothing to do" and is never an error; `Warning` means the
/// operation did what it safely could (e.g. committed without a remote).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NoOp,
    Warning,
    Failure,
}

impl Outcome {
    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Failure)
    }

    fn severity(self) -> u8 {
        match self {
            Outcome::NoOp => 0,
            Outcome::Success => 1,
            Outcome::Warning => 2,
            Outcome::Failure => 3,
        }
    }

    /// Combine outcomes of sequential steps: the most severe one wins.
    pub fn combine(self, other: Outcome) -> Outcome {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

/// Result of one catalog operation, rendered by the CLI as a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub operation: Operation,
    pub outcome: Outcome,
    pub message: String,
    /// Report lines printed before the message (configuration, repository state)
    pub details: Vec<String>,
}

impl SyncResult {
    pub fn new(operation: Operation, outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            operation,
            outcome,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn success(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, Outcome::Success, message)
    }

    pub fn noop(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, Outcome::NoOp, message)
    }

    pub fn warning(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, Outcome::Warning, message)
    }

    pub fn failure(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, Outcome::Failure, message)
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Position of the local branch relative to the remote's primary branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// No `origin` remote configured.
    NoRemote,
    /// A remote exists but neither `origin/main` nor `origin/master` could be compared.
    Unknown,
    Known {
        ahead: u32,
        behind: u32,
        /// Remote branch the counts were computed against
        branch: String,
    },
}

/// Snapshot of the catalog directory, recomputed on every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryState {
    pub exists: bool,
    pub is_repo: bool,
    pub has_remote: bool,
    pub dirty: bool,
    pub divergence: Divergence,
}

impl RepositoryState {
    /// State of a directory that does not exist (or is not a repository).
    pub fn absent(exists: bool) -> Self {
        Self {
            exists,
            is_repo: false,
            has_remote: false,
            dirty: false,
            divergence: Divergence::NoRemote,
        }
    }
}

/// A catalog directory that passed path validation.
///
/// Holds the canonical absolute path; every mutating backend call uses this
/// value so the location cannot change between validation and use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDir(PathBuf);

impl CatalogDir {
    pub(crate) fn new(canonical: PathBuf) -> Self {
        Self(canonical)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CatalogDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Outcome::NoOp, Outcome::Success, Outcome::Success)]
    #[case(Outcome::Success, Outcome::NoOp, Outcome::Success)]
    #[case(Outcome::NoOp, Outcome::NoOp, Outcome::NoOp)]
    #[case(Outcome::Warning, Outcome::Success, Outcome::Warning)]
    #[case(Outcome::Success, Outcome::Failure, Outcome::Failure)]
    fn given_two_outcomes_when_combined_then_most_severe_wins(
        #[case] first: Outcome,
        #[case] second: Outcome,
        #[case] expected: Outcome,
    ) {
        assert_eq!(first.combine(second), expected);
    }

    #[test]
    fn given_default_operation_then_status() {
        assert_eq!(Operation::default(), Operation::Status);
        assert_eq!(Operation::Full.to_string(), "full");
    }
}
