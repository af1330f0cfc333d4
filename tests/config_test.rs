//! Tests for layered settings loading from real files and the environment
//!
//! The environment is process-wide, so every test here holds `ENV_LOCK`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

use rectree::application::ApplicationError;
use rectree::config::{Settings, LOCAL_CONFIG_FILE};
use rectree::domain::DeleteMode;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const ENV_KEYS: &[&str] = &[
    "RECTREE_DATA_FILE",
    "RECTREE_DELETE_MODE",
    "RECTREE_REPOSITION_ON_EDIT",
];

/// Clears `RECTREE_*` while held, sets the given variables, restores on drop.
struct ScopedEnv {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    fn with(vars: &[(&'static str, &str)]) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved = ENV_KEYS.iter().map(|k| (*k, env::var(k).ok())).collect();
        for key in ENV_KEYS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
        Self { saved, _lock: lock }
    }

    fn clean() -> Self {
        Self::with(&[])
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}

fn write_local(dir: &Path, content: &str) {
    fs::write(dir.join(LOCAL_CONFIG_FILE), content).unwrap();
}

#[test]
fn given_no_files_when_loading_then_defaults() {
    let _env = ScopedEnv::clean();
    let dir = TempDir::new().unwrap();

    let settings = Settings::load_layers(None, Some(dir.path())).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_file_when_loading_then_local_values_win() {
    // Arrange
    let _env = ScopedEnv::clean();
    let dir = TempDir::new().unwrap();
    write_local(
        dir.path(),
        "data_file = \"book.data\"\ndelete_mode = \"subtree\"\n",
    );

    // Act
    let settings = Settings::load_layers(None, Some(dir.path())).unwrap();

    // Assert
    assert_eq!(settings.data_file, PathBuf::from("book.data"));
    assert_eq!(settings.delete_mode, DeleteMode::Subtree);
    assert!(settings.reposition_on_edit);
}

#[test]
fn given_global_and_local_files_when_loading_then_local_overrides_global() {
    // Arrange
    let _env = ScopedEnv::clean();
    let global_dir = TempDir::new().unwrap();
    let global = global_dir.path().join("rectree.toml");
    fs::write(
        &global,
        "data_file = \"global.data\"\nreposition_on_edit = false\n",
    )
    .unwrap();
    let local_dir = TempDir::new().unwrap();
    write_local(local_dir.path(), "data_file = \"local.data\"\n");

    // Act
    let settings = Settings::load_layers(Some(&global), Some(local_dir.path())).unwrap();

    // Assert
    assert_eq!(settings.data_file, PathBuf::from("local.data"));
    assert!(!settings.reposition_on_edit);
    assert_eq!(settings.delete_mode, DeleteMode::Splice);
}

#[test]
fn given_missing_global_file_when_loading_then_it_is_skipped() {
    let _env = ScopedEnv::clean();
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("nope.toml");

    let settings = Settings::load_layers(Some(&absent), None).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_malformed_toml_when_loading_then_config_error() {
    let _env = ScopedEnv::clean();
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "data_file = \n");

    let result = Settings::load_layers(None, Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_unknown_key_when_loading_then_config_error() {
    let _env = ScopedEnv::clean();
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "colour = \"red\"\n");

    let result = Settings::load_layers(None, Some(dir.path()));

    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains("colour")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn given_file_flag_when_applied_then_replaces_configured_file() {
    let _env = ScopedEnv::clean();
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "data_file = \"book.data\"\n");
    let settings = Settings::load_layers(None, Some(dir.path())).unwrap();

    let settings = settings.with_data_file(PathBuf::from("other.data"));

    assert_eq!(settings.data_file, PathBuf::from("other.data"));
}

#[test]
fn given_effective_settings_when_rendered_then_toml_parses_back() {
    let _env = ScopedEnv::clean();
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "delete_mode = \"subtree\"\n");
    let settings = Settings::load_layers(None, Some(dir.path())).unwrap();

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert!(rendered.contains("delete_mode = \"subtree\""));
    assert_eq!(parsed, settings);
}

#[test]
fn given_env_vars_when_loading_then_they_override_files() {
    // Arrange
    let _env = ScopedEnv::with(&[
        ("RECTREE_DATA_FILE", "env.data"),
        ("RECTREE_DELETE_MODE", "subtree"),
        ("RECTREE_REPOSITION_ON_EDIT", "false"),
    ]);
    let global_dir = TempDir::new().unwrap();
    let global = global_dir.path().join("rectree.toml");
    fs::write(&global, "data_file = \"global.data\"\n").unwrap();
    let local_dir = TempDir::new().unwrap();
    write_local(
        local_dir.path(),
        "data_file = \"local.data\"\ndelete_mode = \"splice\"\nreposition_on_edit = true\n",
    );

    // Act
    let settings = Settings::load_layers(Some(&global), Some(local_dir.path())).unwrap();

    // Assert
    assert_eq!(settings.data_file, PathBuf::from("env.data"));
    assert_eq!(settings.delete_mode, DeleteMode::Subtree);
    assert!(!settings.reposition_on_edit);
}

#[test]
fn given_single_env_var_when_loading_then_other_layers_kept() {
    let _env = ScopedEnv::with(&[("RECTREE_DELETE_MODE", "subtree")]);
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "data_file = \"local.data\"\n");

    let settings = Settings::load_layers(None, Some(dir.path())).unwrap();

    assert_eq!(settings.delete_mode, DeleteMode::Subtree);
    assert_eq!(settings.data_file, PathBuf::from("local.data"));
    assert!(settings.reposition_on_edit);
}

#[test]
fn given_invalid_env_delete_mode_when_loading_then_config_error() {
    let _env = ScopedEnv::with(&[("RECTREE_DELETE_MODE", "recursive")]);

    let result = Settings::load_layers(None, None);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_env_data_file_when_file_flag_applied_then_flag_wins() {
    let _env = ScopedEnv::with(&[("RECTREE_DATA_FILE", "env.data")]);

    let settings = Settings::load_layers(None, None)
        .unwrap()
        .with_data_file(PathBuf::from("flag.data"));

    assert_eq!(settings.data_file, PathBuf::from("flag.data"));
}
