//! Configuration management with layered loading
//!
//! Precedence (lowest to highest), resolved per field:
//! 1. Compiled default: `~/data-catalog`, no remote
//! 2. Config file: `~/.deng-toolkit/config.yaml` (`catalog_dir`, `catalog_remote`)
//! 3. Environment: `DENG_CATALOG_DIR` (catalog directory only)
//!
//! Resolution never fails: a missing, unreadable or malformed config file and
//! empty values are treated as absent.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::{debug, warn};

use crate::application::ApplicationError;

/// Prefix of the environment overrides.
pub const ENV_PREFIX: &str = "DENG";

/// Environment variable overriding the catalog directory.
pub const CATALOG_DIR_ENV: &str = "DENG_CATALOG_DIR";

/// Catalog directory name under the home directory when nothing is configured.
pub const DEFAULT_CATALOG_DIR_NAME: &str = "data-catalog";

/// Toolkit config directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".deng-toolkit";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.yaml";

const KEY_CATALOG_DIR: &str = "catalog_dir";
const KEY_CATALOG_REMOTE: &str = "catalog_remote";

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Catalog directory (tilde-expanded, not yet validated)
    pub catalog_dir: PathBuf,
    /// Team remote URL; `None` when not configured
    pub catalog_remote: Option<String>,
}

/// Inputs to configuration resolution.
///
/// Captured once at startup so the rest of the program never reads
/// process-wide state.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    pub home: PathBuf,
    pub config_file: Option<PathBuf>,
    /// Environment variables; only exactly [`CATALOG_DIR_ENV`] is consulted
    pub env: HashMap<String, String>,
}

/// Path to the config file under `home`.
pub fn default_config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Values found in the config file; each is independently optional.
#[derive(Debug, Default)]
struct FileValues {
    catalog_dir: Option<String>,
    catalog_remote: Option<String>,
}

impl ConfigSources {
    /// Sources for a real invocation: user home, default config path, process env.
    pub fn from_process() -> Result<Self, ApplicationError> {
        let home = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or_else(|| ApplicationError::Config {
                message: "cannot determine home directory".into(),
            })?;
        let config_file = Some(default_config_path(&home));
        Ok(Self {
            home,
            config_file,
            env: utf8_env(std::env::vars_os()),
        })
    }

    /// Read the catalog directory override from the environment.
    fn env_catalog_dir(&self) -> Option<String> {
        // config matches prefixes case-insensitively; only the exact name counts
        let source: config::Map<String, String> = self
            .env
            .iter()
            .filter(|(key, _)| key.as_str() == CATALOG_DIR_ENV)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .source(Some(source));

        match Config::builder().add_source(env).build() {
            Ok(cfg) => non_empty(cfg.get_string(KEY_CATALOG_DIR).ok()),
            Err(e) => {
                warn!("ignoring {} environment: {}", ENV_PREFIX, e);
                None
            }
        }
    }
}

/// Keep the variables whose name and value are valid UTF-8.
fn utf8_env<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                debug!("utf8_env: skipping non UTF-8 variable {:?}", key);
                None
            }
        })
        .collect()
}

/// Load the config file; any problem yields empty values.
fn load_file_values(path: &Path) -> FileValues {
    if !path.is_file() {
        debug!("load_file_values: no config file at {}", path.display());
        return FileValues::default();
    }

    let built = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml).required(false))
        .build();
    let cfg = match built {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("ignoring unreadable config file {}: {}", path.display(), e);
            return FileValues::default();
        }
    };

    FileValues {
        catalog_dir: non_empty(cfg.get_string(KEY_CATALOG_DIR).ok()),
        catalog_remote: non_empty(cfg.get_string(KEY_CATALOG_REMOTE).ok()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Expand a leading `~` to `home`.
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    let home = home.to_string_lossy();
    PathBuf::from(shellexpand::tilde_with_context(raw, || Some(&*home)).as_ref())
}

impl Settings {
    /// Resolve settings from explicit sources.
    pub fn resolve(sources: &ConfigSources) -> Self {
        let file = sources
            .config_file
            .as_deref()
            .map(load_file_values)
            .unwrap_or_default();

        let catalog_dir = match sources.env_catalog_dir() {
            Some(dir) => {
                debug!("resolve: catalog_dir from {}", CATALOG_DIR_ENV);
                expand_home(&dir, &sources.home)
            }
            None => match file.catalog_dir {
                Some(dir) => {
                    debug!("resolve: catalog_dir from config file");
                    expand_home(&dir, &sources.home)
                }
                None => sources.home.join(DEFAULT_CATALOG_DIR_NAME),
            },
        };

        let settings = Self {
            catalog_dir,
            catalog_remote: file.catalog_remote,
        };
        debug!("resolve: {:?}", settings);
        settings
    }

    /// Resolve settings for the current process.
    pub fn load() -> Result<(Self, ConfigSources), ApplicationError> {
        let sources = ConfigSources::from_process()?;
        Ok((Self::resolve(&sources), sources))
    }

    /// Human-readable remote for reports.
    pub fn remote_display(&self) -> &str {
        self.catalog_remote.as_deref().unwrap_or("(not configured)")
    }
}
