//! Integration tests for catalog configuration resolution.
//!
//! Precedence, per field:
//! - catalog_dir: DENG_CATALOG_DIR > config file > ~/data-catalog
//! - catalog_remote: config file > none

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use catalog_sync::config::{default_config_path, ConfigSources, Settings};
use catalog_sync::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

/// Fake home with an optional `~/.deng-toolkit/config.yaml`.
fn fake_home(config_yaml: Option<&str>) -> TempDir {
    let home = TempDir::new().unwrap();
    if let Some(content) = config_yaml {
        let path = default_config_path(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
    }
    home
}

fn sources(home: &Path, env: &[(&str, &str)]) -> ConfigSources {
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ConfigSources {
        home: home.to_path_buf(),
        config_file: Some(default_config_path(home)),
        env,
    }
}

#[test]
fn given_no_config_file_when_resolving_then_returns_defaults() {
    // Arrange
    let home = fake_home(None);

    // Act
    let settings = Settings::resolve(&sources(home.path(), &[]));

    // Assert
    assert_eq!(settings.catalog_dir, home.path().join("data-catalog"));
    assert_eq!(settings.catalog_remote, None);
}

#[test]
fn given_config_file_when_resolving_then_reads_both_keys() {
    // Arrange
    let home = fake_home(Some(
        r#"
catalog_dir: /custom/catalog/path
catalog_remote: git@github.com:test/repo.git
"#,
    ));

    // Act
    let settings = Settings::resolve(&sources(home.path(), &[]));

    // Assert
    assert_eq!(settings.catalog_dir, PathBuf::from("/custom/catalog/path"));
    assert_eq!(
        settings.catalog_remote.as_deref(),
        Some("git@github.com:test/repo.git")
    );
}

#[test]
fn given_tilde_in_config_when_resolving_then_expands_to_home() {
    // Arrange
    let home = fake_home(Some("catalog_dir: ~/my-catalog\n"));

    // Act
    let settings = Settings::resolve(&sources(home.path(), &[]));

    // Assert
    assert_eq!(settings.catalog_dir, home.path().join("my-catalog"));
    assert!(!settings.catalog_dir.to_string_lossy().contains('~'));
}

#[test]
fn given_env_override_when_resolving_then_env_wins_over_config() {
    // Arrange
    let home = fake_home(Some("catalog_dir: /from/config\n"));

    // Act
    let settings = Settings::resolve(&sources(
        home.path(),
        &[("DENG_CATALOG_DIR", "/from/env")],
    ));

    // Assert
    assert_eq!(settings.catalog_dir, PathBuf::from("/from/env"));
}

#[test]
fn given_env_override_and_config_remote_when_resolving_then_fields_resolve_independently() {
    // Arrange: directory comes from env, remote only exists in the file
    let home = fake_home(Some(
        "catalog_dir: /from/config\ncatalog_remote: https://example.com/team/catalog.git\n",
    ));

    // Act
    let settings = Settings::resolve(&sources(
        home.path(),
        &[("DENG_CATALOG_DIR", "/from/env")],
    ));

    // Assert
    assert_eq!(settings.catalog_dir, PathBuf::from("/from/env"));
    assert_eq!(
        settings.catalog_remote.as_deref(),
        Some("https://example.com/team/catalog.git")
    );
}

#[test]
fn given_remote_env_var_when_resolving_then_not_an_override() {
    // Arrange
    let home = fake_home(None);

    // Act
    let settings = Settings::resolve(&sources(
        home.path(),
        &[("DENG_CATALOG_REMOTE", "https://example.com/nope.git")],
    ));

    // Assert
    assert_eq!(settings.catalog_remote, None);
}

#[test]
fn given_empty_remote_when_resolving_then_not_configured() {
    // Arrange
    let home = fake_home(Some("catalog_remote: \"\"\n"));

    // Act
    let settings = Settings::resolve(&sources(home.path(), &[]));

    // Assert
    assert_eq!(settings.catalog_remote, None);
}

#[test]
fn given_malformed_yaml_when_resolving_then_falls_back_to_defaults() {
    // Arrange
    let home = fake_home(Some("catalog_dir: [unterminated\n  : :\n"));

    // Act
    let settings = Settings::resolve(&sources(home.path(), &[]));

    // Assert
    assert_eq!(settings.catalog_dir, home.path().join("data-catalog"));
    assert_eq!(settings.catalog_remote, None);
}

#[test]
fn given_config_without_catalog_dir_when_resolving_then_default_dir_with_file_remote() {
    // Arrange
    let home = fake_home(Some("catalog_remote: git@example.com:team/catalog.git\n"));

    // Act
    let settings = Settings::resolve(&sources(home.path(), &[]));

    // Assert
    assert_eq!(settings.catalog_dir, home.path().join("data-catalog"));
    assert_eq!(
        settings.catalog_remote.as_deref(),
        Some("git@example.com:team/catalog.git")
    );
}

#[test]
fn given_directory_in_place_of_config_file_when_resolving_then_defaults() {
    // Arrange: config path exists but is not a readable file
    let home = fake_home(None);
    fs::create_dir_all(default_config_path(home.path())).unwrap();

    // Act
    let settings = Settings::resolve(&sources(home.path(), &[]));

    // Assert
    assert_eq!(settings.catalog_dir, home.path().join("data-catalog"));
}

#[test]
fn given_lowercase_override_name_when_resolving_then_config_file_wins() {
    // Arrange
    let home = fake_home(Some("catalog_dir: /from/config\n"));

    // Act
    let settings = Settings::resolve(&sources(
        home.path(),
        &[("deng_catalog_dir", "/etc/evil")],
    ));

    // Assert
    assert_eq!(settings.catalog_dir, PathBuf::from("/from/config"));
}
