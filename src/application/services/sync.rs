//! Catalog synchronization service
//!
//! Implements the five catalog operations on top of [`PathValidator`],
//! [`RepositoryProbe`] and a [`GitBackend`]:
//!
//! - `status`: report configuration and repository state (read-only)
//! - `init`: create the repository; a no-op when it already exists
//! - `push`: commit everything and publish to the remote's primary branch
//!   (`main`, else `master`, else the local branch when the remote is empty)
//! - `pull`: merge the remote's primary branch
//! - `full`: pull, then push; a failed pull skips the push

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, instrument, warn};

use crate::application::catalog_files::{
    commit_message, GITIGNORE_FILE, GITIGNORE_TEMPLATE, INITIAL_COMMIT_MESSAGE,
    PRIMARY_BRANCHES, README_FILE, README_TEMPLATE, REMOTE_NAME,
};
use crate::application::services::{PathValidator, RepositoryProbe};
use crate::application::{ApplicationResult, BackendResultExt, IoResultExt};
use crate::config::Settings;
use crate::domain::{CatalogDir, Divergence, DomainError, Operation, Outcome, SyncResult};
use crate::infrastructure::traits::{FileSystem, GitBackend};
use crate::infrastructure::InfraResult;

/// Catalog synchronization service.
pub struct SyncService {
    fs: Arc<dyn FileSystem>,
    git: Arc<dyn GitBackend>,
    settings: Arc<Settings>,
    validator: PathValidator,
    probe: RepositoryProbe,
}

impl SyncService {
    /// Create a new sync service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        git: Arc<dyn GitBackend>,
        settings: Arc<Settings>,
        validator: PathValidator,
    ) -> Self {
        let probe = RepositoryProbe::new(fs.clone(), git.clone());
        Self {
            fs,
            git,
            settings,
            validator,
            probe,
        }
    }

    /// Run `operation`; errors become a `Failure` result.
    pub fn run(&self, operation: Operation) -> SyncResult {
        info!("run: operation={}", operation);
        let result = match operation {
            Operation::Status => self.status(),
            Operation::Init => self.init(),
            Operation::Push => self.push(),
            Operation::Pull => self.pull(),
            Operation::Full => self.full(),
        };
        result.unwrap_or_else(|e| {
            warn!("{} failed: {}", operation, e);
            SyncResult::failure(operation, e.to_string())
        })
    }

    /// Report configuration and repository state without changing anything.
    #[instrument(skip(self))]
    pub fn status(&self) -> ApplicationResult<SyncResult> {
        let dir = &self.settings.catalog_dir;
        let mut details = vec![
            format!("Catalog directory: {}", dir.display()),
            format!("Configured remote: {}", self.settings.remote_display()),
        ];

        let state = self.probe.probe(dir)?;
        if !state.exists {
            return Ok(SyncResult::warning(
                Operation::Status,
                "catalog directory does not exist; run --init to create it",
            )
            .with_details(details));
        }
        if !state.is_repo {
            return Ok(SyncResult::warning(
                Operation::Status,
                "catalog directory is not a git repository; run --init to set it up",
            )
            .with_details(details));
        }

        details.push(format!("Files: {}", self.probe.count_files(dir)));
        let present = self.probe.present_catalog_files(dir);
        if !present.is_empty() {
            details.push(format!("Catalog data: {}", present.join(", ")));
        }

        let tree = if state.dirty {
            "uncommitted changes (run --push)"
        } else {
            "clean"
        };
        let (outcome, sync) = match &state.divergence {
            Divergence::NoRemote => (Outcome::Success, "no remote configured".to_string()),
            Divergence::Unknown => (
                Outcome::Warning,
                format!(
                    "sync state unknown: could not compare with {REMOTE_NAME}/main or {REMOTE_NAME}/master"
                ),
            ),
            Divergence::Known {
                ahead,
                behind,
                branch,
            } => (
                Outcome::Success,
                describe_divergence(*ahead, *behind, branch),
            ),
        };

        Ok(SyncResult::new(Operation::Status, outcome, format!("{tree}; {sync}")).with_details(details))
    }

    /// Create the catalog repository.
    ///
    /// Writes the README and `.gitignore` (unless present), commits them and
    /// registers the configured remote. Repositories with at least one commit
    /// are left untouched; one without commits (an interrupted init) is completed.
    #[instrument(skip(self))]
    pub fn init(&self) -> ApplicationResult<SyncResult> {
        let dir = self.validator.validate(&self.settings.catalog_dir)?;
        let path = dir.path();

        if self.probe.is_repository(path) {
            let has_commits = self
                .git
                .has_commits(path)
                .with_git_context("read catalog history")?;
            if has_commits {
                return Ok(SyncResult::noop(
                    Operation::Init,
                    format!("catalog repository already exists at {dir}"),
                ));
            }
            info!("completing initialization of {}: no commits yet", dir);
        } else {
            self.fs
                .create_dir_all(path)
                .with_path_context("create catalog directory", path)?;
            self.git.init(path).with_git_context("git init")?;
        }

        for (name, content) in [(README_FILE, README_TEMPLATE), (GITIGNORE_FILE, GITIGNORE_TEMPLATE)] {
            let file = path.join(name);
            if self.fs.exists(&file) {
                debug!("init: keeping existing {}", file.display());
                continue;
            }
            self.fs
                .write(&file, content)
                .with_path_context("write", &file)?;
        }

        self.git
            .add_paths(path, &[README_FILE, GITIGNORE_FILE])
            .with_git_context("stage initial files")?;
        self.git
            .commit(path, INITIAL_COMMIT_MESSAGE)
            .with_git_context("create initial commit")?;
        info!("initialized catalog repository at {}", dir);

        let mut message = format!("initialized catalog repository at {dir}");
        if let Some(url) = &self.settings.catalog_remote {
            match self.git.add_remote(path, REMOTE_NAME, url) {
                Ok(()) => message.push_str(&format!("; remote {REMOTE_NAME} set to {url}")),
                Err(e) => {
                    warn!("could not register remote {}: {}", REMOTE_NAME, e);
                    message.push_str(&format!("; remote {REMOTE_NAME} not registered ({e})"));
                }
            }
        }

        Ok(SyncResult::success(Operation::Init, message))
    }

    /// Commit all changes and push them.
    #[instrument(skip(self))]
    pub fn push(&self) -> ApplicationResult<SyncResult> {
        let dir = self.validator.validate(&self.settings.catalog_dir)?;
        self.push_in(&dir)
    }

    /// Pull the remote's primary branch.
    #[instrument(skip(self))]
    pub fn pull(&self) -> ApplicationResult<SyncResult> {
        let dir = self.validator.validate(&self.settings.catalog_dir)?;
        self.pull_in(&dir)
    }

    /// Pull, then push, against a single validated directory.
    #[instrument(skip(self))]
    pub fn full(&self) -> ApplicationResult<SyncResult> {
        let dir = self.validator.validate(&self.settings.catalog_dir)?;
        self.require_repository(&dir)?;

        let pulled = self.pull_in(&dir)?;
        if pulled.outcome.is_failure() {
            return Ok(SyncResult::failure(
                Operation::Full,
                format!("{}; push skipped", pulled.message),
            ));
        }

        let pushed = self.push_in(&dir)?;
        Ok(SyncResult::new(
            Operation::Full,
            pulled.outcome.combine(pushed.outcome),
            format!("pull: {}; push: {}", pulled.message, pushed.message),
        ))
    }

    fn push_in(&self, dir: &CatalogDir) -> ApplicationResult<SyncResult> {
        self.require_repository(dir)?;
        let path = dir.path();

        let changes = self
            .git
            .status_porcelain(path)
            .with_git_context("read catalog status")?;
        if changes.trim().is_empty() {
            return Ok(SyncResult::noop(Operation::Push, "no changes to commit"));
        }
        debug!("push_in: {} changed paths", changes.lines().count());

        let message = commit_message(Local::now());
        self.git.add_all(path).with_git_context("stage changes")?;
        self.git
            .commit(path, &message)
            .with_git_context("commit changes")?;
        info!("committed: {}", message);

        let remote = self
            .git
            .remote_url(path, REMOTE_NAME)
            .with_git_context("read remote")?;
        if remote.is_none() {
            return Ok(SyncResult::warning(
                Operation::Push,
                format!("committed locally ({message}); no remote configured"),
            ));
        }

        let pushed = self
            .push_target(path)
            .and_then(|branch| self.git.push(path, REMOTE_NAME, &branch).map(|()| branch));
        match pushed {
            Ok(branch) => Ok(SyncResult::success(
                Operation::Push,
                format!("committed and pushed to {REMOTE_NAME}/{branch} ({message})"),
            )),
            Err(e) => Ok(SyncResult::failure(
                Operation::Push,
                format!("committed locally but push to {REMOTE_NAME} failed: {e}"),
            )),
        }
    }

    fn pull_in(&self, dir: &CatalogDir) -> ApplicationResult<SyncResult> {
        self.require_repository(dir)?;
        let path = dir.path();

        let remote = self
            .git
            .remote_url(path, REMOTE_NAME)
            .with_git_context("read remote")?;
        if remote.is_none() {
            return Ok(SyncResult::warning(
                Operation::Pull,
                "no remote configured; nothing to pull",
            ));
        }

        let branch = match self.remote_primary_branch(path) {
            Ok(Some(branch)) => branch,
            Ok(None) => {
                return Ok(SyncResult::warning(
                    Operation::Pull,
                    format!("{REMOTE_NAME} has no main or master branch yet; nothing to pull"),
                ))
            }
            Err(e) => {
                return Ok(SyncResult::failure(
                    Operation::Pull,
                    format!("pull from {REMOTE_NAME} failed: {e}"),
                ))
            }
        };

        match self.git.pull(path, REMOTE_NAME, branch) {
            Ok(()) => Ok(SyncResult::success(
                Operation::Pull,
                format!("pulled from {REMOTE_NAME}/{branch}"),
            )),
            Err(e) => Ok(SyncResult::failure(
                Operation::Pull,
                format!("pull from {REMOTE_NAME} failed: {e}"),
            )),
        }
    }

    /// First of `main`, `master` that exists on the remote.
    fn remote_primary_branch(&self, path: &Path) -> InfraResult<Option<&'static str>> {
        for branch in PRIMARY_BRANCHES {
            if self.git.remote_has_branch(path, REMOTE_NAME, branch)? {
                return Ok(Some(branch));
            }
            debug!("remote_primary_branch: {}/{} absent", REMOTE_NAME, branch);
        }
        Ok(None)
    }

    /// Remote primary branch, or the local branch when the remote has neither.
    fn push_target(&self, path: &Path) -> InfraResult<String> {
        match self.remote_primary_branch(path)? {
            Some(branch) => Ok(branch.to_string()),
            None => self.git.current_branch(path),
        }
    }

    fn require_repository(&self, dir: &CatalogDir) -> ApplicationResult<()> {
        if self.probe.is_repository(dir.path()) {
            Ok(())
        } else {
            Err(DomainError::NotARepository(dir.path().to_path_buf()).into())
        }
    }
}

fn describe_divergence(ahead: u32, behind: u32, branch: &str) -> String {
    let upstream = format!("{REMOTE_NAME}/{branch}");
    match (ahead, behind) {
        (0, 0) => format!("up to date with {upstream}"),
        (0, n) => format!("behind {upstream} by {n} commit(s); run --pull"),
        (n, 0) => format!("ahead of {upstream} by {n} commit(s); run --push"),
        (a, b) => format!("diverged from {upstream}: ahead by {a}, behind by {b}; run --full"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, "up to date with origin/main")]
    #[case(0, 2, "behind origin/main by 2 commit(s); run --pull")]
    #[case(3, 0, "ahead of origin/main by 3 commit(s); run --push")]
    #[case(1, 4, "diverged from origin/main: ahead by 1, behind by 4; run --full")]
    fn given_counts_when_describing_divergence_then_suggests_action(
        #[case] ahead: u32,
        #[case] behind: u32,
        #[case] expected: &str,
    ) {
        assert_eq!(describe_divergence(ahead, behind, "main"), expected);
    }
}
