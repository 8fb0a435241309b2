//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;

use crate::infrastructure::InfraResult;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists (follows symlinks).
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a symbolic link.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Canonicalize path (resolve symlinks, make absolute).
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Current working directory, for resolving relative paths.
    fn current_dir(&self) -> io::Result<PathBuf>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;
}

/// Narrow capability interface over the version-control backend.
///
/// Every method operates on the repository at `dir`. Implementations must not
/// change the working directory of the process.
pub trait GitBackend: Send + Sync {
    /// Create an empty repository.
    fn init(&self, dir: &Path) -> InfraResult<()>;

    /// Porcelain status; empty when there is nothing to commit.
    fn status_porcelain(&self, dir: &Path) -> InfraResult<String>;

    /// Stage the given paths.
    fn add_paths(&self, dir: &Path, paths: &[&str]) -> InfraResult<()>;

    /// Stage every change, including deletions and untracked files.
    fn add_all(&self, dir: &Path) -> InfraResult<()>;

    /// Commit staged changes.
    fn commit(&self, dir: &Path, message: &str) -> InfraResult<()>;

    /// True if HEAD points to a commit.
    fn has_commits(&self, dir: &Path) -> InfraResult<bool>;

    /// Name of the checked-out branch.
    fn current_branch(&self, dir: &Path) -> InfraResult<String>;

    /// True if `remote` has `branch`. Contacts the remote.
    fn remote_has_branch(&self, dir: &Path, remote: &str, branch: &str) -> InfraResult<bool>;

    /// Push `branch` to `remote`.
    fn push(&self, dir: &Path, remote: &str, branch: &str) -> InfraResult<()>;

    /// Pull `branch` from `remote` into the current branch.
    fn pull(&self, dir: &Path, remote: &str, branch: &str) -> InfraResult<()>;

    /// Update remote-tracking refs.
    fn fetch(&self, dir: &Path, remote: &str) -> InfraResult<()>;

    /// Commits `(ahead, behind)` of HEAD relative to `upstream` (e.g. `origin/main`).
    fn ahead_behind(&self, dir: &Path, upstream: &str) -> InfraResult<(u32, u32)>;

    /// URL of `remote`, `None` if the remote is not configured.
    fn remote_url(&self, dir: &Path, remote: &str) -> InfraResult<Option<String>>;

    /// Register a new remote.
    fn add_remote(&self, dir: &Path, remote: &str, url: &str) -> InfraResult<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        std::process::Command::new(cmd).args(args).output()
    }
}
