//! Location policy for the catalog directory (pure path logic, no I/O)

use std::fmt;
use std::path::{Component, Path, PathBuf};

use itertools::Itertools;

/// Directories the catalog may live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedRoots(Vec<PathBuf>);

impl AllowedRoots {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self(roots)
    }

    /// Home directory plus the temporary-files root.
    pub fn standard(home: &Path) -> Self {
        Self(vec![home.to_path_buf(), std::env::temp_dir()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    /// True if `path` lies strictly beneath one of the roots.
    ///
    /// Both sides must already be canonical; the root itself is not accepted.
    pub fn contains(&self, path: &Path) -> bool {
        self.iter()
            .any(|root| path != root && path.starts_with(root))
    }
}

impl fmt::Display for AllowedRoots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().map(|p| p.display()).join(", "))
    }
}

/// Append `tail` to `base`, resolving `.` and `..` lexically.
///
/// Used for the not-yet-existing part of a catalog path whose existing
/// ancestor has already been canonicalized.
pub fn join_normalized(base: &Path, tail: &Path) -> PathBuf {
    let mut out = base.to_path_buf();
    for component in tail.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::Prefix(_) => {
                out = PathBuf::from(component.as_os_str());
            }
        }
    }
    out
}
