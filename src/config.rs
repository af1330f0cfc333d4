//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rectree/rectree.toml`
//! 3. Local config: `<dir>/.rectree.toml`
//! 4. Environment variables: `RECTREE_*` prefix
//!
//! The `--file` flag is applied on top by the CLI.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::DeleteMode;

/// Default name of the backing data file.
pub const DEFAULT_DATA_FILE: &str = "contacts.data";

/// Name of the per-directory config file.
pub const LOCAL_CONFIG_FILE: &str = ".rectree.toml";

/// Raw settings for intermediate parsing.
///
/// Every field is optional so a layer only overrides what it names.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub delete_mode: Option<DeleteMode>,
    pub reposition_on_edit: Option<bool>,
}

/// Unified configuration for rectree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Backing data file (default: `contacts.data` in the working directory)
    pub data_file: PathBuf,
    /// What delete removes: the matched node only, or its whole subtree
    pub delete_mode: DeleteMode,
    /// Move a node when an edit changes its sort key
    pub reposition_on_edit: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            delete_mode: DeleteMode::default(),
            reposition_on_edit: true,
        }
    }
}

/// Get the XDG config directory for rectree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rectree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rectree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_delete_mode(value: &str) -> Result<DeleteMode, ApplicationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "splice" => Ok(DeleteMode::Splice),
        "subtree" => Ok(DeleteMode::Subtree),
        other => Err(ApplicationError::Config {
            message: format!("delete_mode must be 'splice' or 'subtree', got '{other}'"),
        }),
    }
}

impl Settings {
    /// Expand shell variables and tilde in the data file path.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax. Unknown variables leave
    /// the path untouched.
    fn expand_paths(&mut self) {
        let raw = self.data_file.to_string_lossy().to_string();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.data_file = PathBuf::from(expanded.as_ref());
        }
    }

    /// Overlay wins where it names a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_file: overlay
                .data_file
                .clone()
                .unwrap_or_else(|| self.data_file.clone()),
            delete_mode: overlay.delete_mode.unwrap_or(self.delete_mode),
            reposition_on_edit: overlay
                .reposition_on_edit
                .unwrap_or(self.reposition_on_edit),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.rectree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path();
        Self::load_layers(global.as_deref(), local_dir)
    }

    /// Same as [`Settings::load`] with an explicit global config file.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(path) = global_path.filter(|p| p.exists()) {
            debug!("global config: {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let path = local_config_path(dir);
            if path.exists() {
                debug!("local config: {}", path.display());
                current = current.merge_with(&load_raw_settings(&path)?);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply RECTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RECTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("delete_mode") {
            settings.delete_mode = parse_delete_mode(&val)?;
        }
        if let Ok(val) = config.get_bool("reposition_on_edit") {
            settings.reposition_on_edit = val;
        }

        Ok(settings)
    }

    /// Replace the data file, e.g. from a command line flag.
    pub fn with_data_file(mut self, path: PathBuf) -> Self {
        self.data_file = path;
        self.expand_paths();
        self
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rectree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rectree/rectree.toml
#   Local:  <dir>/.rectree.toml (directory given with -C)
#   Env:    RECTREE_* environment variables

# Backing data file; ~ and $VAR are expanded
data_file = "contacts.data"

# "splice" removes only the matched contact, "subtree" everything below it too
delete_mode = "splice"

# Move a contact inside the tree when an edit changes its name or number
reposition_on_edit = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.data_file, PathBuf::from("contacts.data"));
        assert_eq!(settings.delete_mode, DeleteMode::Splice);
        assert!(settings.reposition_on_edit);
    }

    #[test]
    fn given_tilde_in_data_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_file: PathBuf::from("~/contacts.data"),
            ..Settings::default()
        };

        settings.expand_paths();

        assert!(!settings.data_file.to_string_lossy().starts_with('~'));
        assert!(settings.data_file.ends_with("contacts.data"));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unnamed_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            delete_mode: Some(DeleteMode::Subtree),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.delete_mode, DeleteMode::Subtree);
        assert_eq!(merged.data_file, base.data_file);
        assert!(merged.reposition_on_edit);
    }

    #[test]
    fn given_template_when_parsed_then_matches_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        let parsed = Settings::default().merge_with(&raw);
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn given_unknown_delete_mode_when_parsing_then_config_error() {
        assert!(parse_delete_mode("Subtree").is_ok());
        assert!(matches!(
            parse_delete_mode("recursive"),
            Err(ApplicationError::Config { .. })
        ));
    }
}
