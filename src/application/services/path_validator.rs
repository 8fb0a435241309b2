//! Catalog location validation
//!
//! Before any mutating operation the configured catalog directory is resolved
//! to its canonical form and checked against the allowed roots. The returned
//! [`CatalogDir`] is the only handle mutating operations accept.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{join_normalized, AllowedRoots, CatalogDir, DomainError};
use crate::infrastructure::traits::FileSystem;

/// Resolves and checks catalog directories against [`AllowedRoots`].
pub struct PathValidator {
    fs: Arc<dyn FileSystem>,
    roots: AllowedRoots,
}

impl PathValidator {
    /// Create a validator; roots are canonicalized when they exist.
    pub fn new(fs: Arc<dyn FileSystem>, roots: AllowedRoots) -> Self {
        let roots = AllowedRoots::new(
            roots
                .iter()
                .map(|root| fs.canonicalize(root).unwrap_or_else(|_| root.to_path_buf()))
                .collect(),
        );
        debug!("PathValidator: roots={}", roots);
        Self { fs, roots }
    }

    /// Resolve `candidate` and accept it only if it lies under an allowed root.
    #[instrument(skip(self))]
    pub fn validate(&self, candidate: &Path) -> ApplicationResult<CatalogDir> {
        let absolute = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.fs
                .current_dir()
                .with_path_context("resolve relative catalog directory", candidate)?
                .join(candidate)
        };

        let resolved = self.resolve(&absolute)?;
        if !self.roots.contains(&resolved) {
            warn!(
                "rejected catalog directory {} (resolved {})",
                candidate.display(),
                resolved.display()
            );
            return Err(DomainError::PathNotAllowed {
                path: candidate.to_path_buf(),
                resolved,
                roots: self.roots.to_string(),
            }
            .into());
        }

        debug!("validate: accepted {}", resolved.display());
        Ok(CatalogDir::new(resolved))
    }

    /// Canonicalize the longest existing ancestor and append the rest lexically.
    fn resolve(&self, absolute: &Path) -> ApplicationResult<PathBuf> {
        for ancestor in absolute.ancestors() {
            if self.fs.exists(ancestor) {
                let canonical = self
                    .fs
                    .canonicalize(ancestor)
                    .with_path_context("canonicalize catalog directory", ancestor)?;
                let tail = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
                return Ok(join_normalized(&canonical, tail));
            }
            if self.fs.is_symlink(ancestor) {
                return Err(DomainError::DanglingSymlink(ancestor.to_path_buf()).into());
            }
        }
        // Nothing exists, not even the root: keep the lexical form
        Ok(join_normalized(Path::new("/"), absolute))
    }
}
