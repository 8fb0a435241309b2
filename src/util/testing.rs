//! Test support: logging setup and an in-memory git backend

use std::env;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::traits::GitBackend;
use crate::infrastructure::{InfraError, InfraResult};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["config::"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// State of the repository simulated by [`FakeGit`].
#[derive(Debug, Clone, Default)]
pub struct FakeRepo {
    pub initialized: bool,
    /// Commit messages, oldest first
    pub commits: Vec<String>,
    /// Uncommitted changes reported by status
    pub dirty: bool,
    pub remote_url: Option<String>,
    /// Branch that exists on the remote; `None` means the remote is empty
    pub remote_branch: Option<String>,
    /// Checked-out branch; `None` means `main`
    pub local_branch: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub fail_fetch: bool,
    pub fail_push: bool,
    pub fail_pull: bool,
    pub fail_status: bool,
    /// Commits fail, e.g. no author identity
    pub fail_commit: bool,
}

/// In-memory [`GitBackend`] for exercising the sync engine without git.
///
/// `init` creates the `.git` directory on disk so that repository detection
/// works; everything else lives in [`FakeRepo`]. Every call is recorded.
#[derive(Debug, Default)]
pub struct FakeGit {
    repo: Mutex<FakeRepo>,
    calls: Mutex<Vec<String>>,
}

impl FakeGit {
    pub fn new(repo: FakeRepo) -> Self {
        Self {
            repo: Mutex::new(repo),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Current simulated state.
    pub fn repo(&self) -> MutexGuard<'_, FakeRepo> {
        self.repo.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Recorded calls, e.g. `"push origin main"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// True if any recorded call starts with `prefix`.
    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn fail(command: &str, message: &str) -> InfraError {
        InfraError::git(command, message, Some(1))
    }
}

impl GitBackend for FakeGit {
    fn init(&self, dir: &Path) -> InfraResult<()> {
        self.record("init".into());
        std::fs::create_dir_all(dir.join(".git"))
            .map_err(|e| InfraError::io("create .git", e))?;
        self.repo().initialized = true;
        Ok(())
    }

    fn status_porcelain(&self, _dir: &Path) -> InfraResult<String> {
        self.record("status".into());
        let repo = self.repo();
        if repo.fail_status {
            return Err(Self::fail("status", "fatal: index file corrupt"));
        }
        Ok(if repo.dirty {
            "?? new.parquet\n".into()
        } else {
            String::new()
        })
    }

    fn add_paths(&self, _dir: &Path, paths: &[&str]) -> InfraResult<()> {
        self.record(format!("add {}", paths.join(" ")));
        Ok(())
    }

    fn add_all(&self, _dir: &Path) -> InfraResult<()> {
        self.record("add -A".into());
        Ok(())
    }

    fn commit(&self, _dir: &Path, message: &str) -> InfraResult<()> {
        self.record(format!("commit {message}"));
        let mut repo = self.repo();
        if repo.fail_commit {
            return Err(Self::fail("commit", "Author identity unknown"));
        }
        repo.commits.push(message.to_string());
        repo.dirty = false;
        repo.ahead += 1;
        Ok(())
    }

    fn push(&self, _dir: &Path, remote: &str, branch: &str) -> InfraResult<()> {
        self.record(format!("push {remote} {branch}"));
        let mut repo = self.repo();
        if repo.fail_push {
            return Err(Self::fail(
                "push",
                &format!("! [rejected] {branch} -> {branch} (fetch first)"),
            ));
        }
        match repo.remote_branch.as_deref() {
            // first push to an empty remote creates the branch
            None => repo.remote_branch = Some(branch.to_string()),
            Some(existing) if existing == branch => {}
            Some(_) => {
                return Err(Self::fail(
                    "push",
                    &format!("error: src refspec {branch} does not match any"),
                ))
            }
        }
        repo.ahead = 0;
        Ok(())
    }

    fn pull(&self, _dir: &Path, remote: &str, branch: &str) -> InfraResult<()> {
        self.record(format!("pull {remote} {branch}"));
        let mut repo = self.repo();
        if repo.fail_pull {
            return Err(Self::fail("pull", "CONFLICT (content): merge conflict in metadata.parquet"));
        }
        if repo.remote_branch.as_deref() != Some(branch) {
            return Err(Self::fail(
                "pull",
                &format!("fatal: couldn't find remote ref {branch}"),
            ));
        }
        repo.behind = 0;
        Ok(())
    }

    fn has_commits(&self, _dir: &Path) -> InfraResult<bool> {
        self.record("rev-parse HEAD".into());
        Ok(!self.repo().commits.is_empty())
    }

    fn current_branch(&self, _dir: &Path) -> InfraResult<String> {
        self.record("symbolic-ref HEAD".into());
        Ok(self
            .repo()
            .local_branch
            .clone()
            .unwrap_or_else(|| "main".to_string()))
    }

    fn remote_has_branch(&self, _dir: &Path, remote: &str, branch: &str) -> InfraResult<bool> {
        self.record(format!("ls-remote {remote} {branch}"));
        let repo = self.repo();
        if repo.fail_fetch {
            return Err(Self::fail("ls-remote", "fatal: unable to access remote"));
        }
        Ok(repo.remote_branch.as_deref() == Some(branch))
    }

    fn fetch(&self, _dir: &Path, remote: &str) -> InfraResult<()> {
        self.record(format!("fetch {remote}"));
        if self.repo().fail_fetch {
            return Err(Self::fail("fetch", "fatal: unable to access remote"));
        }
        Ok(())
    }

    fn ahead_behind(&self, _dir: &Path, upstream: &str) -> InfraResult<(u32, u32)> {
        self.record(format!("rev-list {upstream}"));
        let repo = self.repo();
        match &repo.remote_branch {
            Some(branch) if upstream == format!("origin/{branch}") => Ok((repo.ahead, repo.behind)),
            _ => Err(Self::fail(
                "rev-list",
                &format!("fatal: ambiguous argument 'HEAD...{upstream}'"),
            )),
        }
    }

    fn remote_url(&self, _dir: &Path, remote: &str) -> InfraResult<Option<String>> {
        self.record(format!("remote get-url {remote}"));
        Ok(self.repo().remote_url.clone())
    }

    fn add_remote(&self, _dir: &Path, remote: &str, url: &str) -> InfraResult<()> {
        self.record(format!("remote add {remote} {url}"));
        let mut repo = self.repo();
        if repo.remote_url.is_some() {
            return Err(Self::fail(
                "remote",
                &format!("error: remote {remote} already exists."),
            ));
        }
        repo.remote_url = Some(url.to_string());
        Ok(())
    }
}
