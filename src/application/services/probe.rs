//! Read-only inspection of the catalog repository

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::application::catalog_files::{PRIMARY_BRANCHES, REMOTE_NAME, WELL_KNOWN_FILES};
use crate::application::{ApplicationResult, BackendResultExt};
use crate::domain::{Divergence, RepositoryState};
use crate::infrastructure::traits::{FileSystem, GitBackend};

/// Name of git's metadata directory.
const GIT_DIR: &str = ".git";

/// Computes [`RepositoryState`] without mutating the working tree.
///
/// Fetching from the remote is the only network access; its failure only
/// leaves the tracking refs stale.
pub struct RepositoryProbe {
    fs: Arc<dyn FileSystem>,
    git: Arc<dyn GitBackend>,
}

impl RepositoryProbe {
    pub fn new(fs: Arc<dyn FileSystem>, git: Arc<dyn GitBackend>) -> Self {
        Self { fs, git }
    }

    /// True if `dir` contains git metadata.
    pub fn is_repository(&self, dir: &Path) -> bool {
        self.fs.exists(&dir.join(GIT_DIR))
    }

    /// Inspect `dir`.
    ///
    /// Fails only if the status of an existing repository cannot be read;
    /// remote comparison problems degrade to [`Divergence::Unknown`].
    #[instrument(skip(self))]
    pub fn probe(&self, dir: &Path) -> ApplicationResult<RepositoryState> {
        if !self.fs.is_dir(dir) {
            debug!("probe: {} does not exist", dir.display());
            return Ok(RepositoryState::absent(false));
        }
        if !self.is_repository(dir) {
            debug!("probe: {} is not a repository", dir.display());
            return Ok(RepositoryState::absent(true));
        }

        let dirty = !self
            .git
            .status_porcelain(dir)
            .with_git_context("read catalog status")?
            .trim()
            .is_empty();

        let has_remote = match self.git.remote_url(dir, REMOTE_NAME) {
            Ok(url) => url.is_some(),
            Err(e) => {
                warn!("cannot read remote {}: {}", REMOTE_NAME, e);
                false
            }
        };

        let divergence = if has_remote {
            self.divergence(dir)
        } else {
            Divergence::NoRemote
        };

        let state = RepositoryState {
            exists: true,
            is_repo: true,
            has_remote,
            dirty,
            divergence,
        };
        debug!("probe: {:?}", state);
        Ok(state)
    }

    /// Ahead/behind counts against `origin/main`, falling back to `origin/master`.
    fn divergence(&self, dir: &Path) -> Divergence {
        if let Err(e) = self.git.fetch(dir, REMOTE_NAME) {
            warn!("fetch from {} failed, comparing with last known state: {}", REMOTE_NAME, e);
        }

        for branch in PRIMARY_BRANCHES {
            let upstream = format!("{REMOTE_NAME}/{branch}");
            match self.git.ahead_behind(dir, &upstream) {
                Ok((ahead, behind)) => {
                    return Divergence::Known {
                        ahead,
                        behind,
                        branch: branch.to_string(),
                    }
                }
                Err(e) => debug!("divergence: cannot compare with {}: {}", upstream, e),
            }
        }
        Divergence::Unknown
    }

    /// Number of files in the catalog, excluding git metadata.
    pub fn count_files(&self, dir: &Path) -> usize {
        WalkDir::new(dir)
            .into_iter()
            .filter_entry(|e| e.file_name() != GIT_DIR)
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count()
    }

    /// Well-known catalog files present in `dir` (names only).
    pub fn present_catalog_files(&self, dir: &Path) -> Vec<&'static str> {
        WELL_KNOWN_FILES
            .into_iter()
            .filter(|name| self.fs.exists(&dir.join(name)))
            .collect()
    }
}
