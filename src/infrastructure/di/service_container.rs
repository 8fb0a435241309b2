//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{PathValidator, SyncService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::AllowedRoots;
use crate::infrastructure::git::GitCli;
use crate::infrastructure::traits::{FileSystem, GitBackend, RealCommandRunner, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Where the catalog may live
    pub roots: AllowedRoots,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Version-control backend
    pub git: Arc<dyn GitBackend>,
}

impl ServiceContainer {
    /// Create a container for the current process: resolved settings, real I/O.
    pub fn from_environment() -> ApplicationResult<Self> {
        let (settings, sources) = Settings::load()?;
        let roots = AllowedRoots::standard(&sources.home);
        Ok(Self::new(settings, roots))
    }

    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, roots: AllowedRoots) -> Self {
        Self::with_deps(
            settings,
            roots,
            Arc::new(RealFileSystem),
            Arc::new(GitCli::new(Arc::new(RealCommandRunner))),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        roots: AllowedRoots,
        fs: Arc<dyn FileSystem>,
        git: Arc<dyn GitBackend>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            roots,
            fs,
            git,
        }
    }

    /// Build the sync service; the path validator is created fresh per call.
    pub fn sync_service(&self) -> SyncService {
        let validator = PathValidator::new(self.fs.clone(), self.roots.clone());
        SyncService::new(
            self.fs.clone(),
            self.git.clone(),
            self.settings.clone(),
            validator,
        )
    }
}
