use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::keybindings::KeybindingsConfig;
use crate::services::directory::SortKey;
use crate::services::search::DEFAULT_SEARCH_LIMIT;
use crate::ui::theme::DEFAULT_THEME_NAME;

/// Listing layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Grid,
            ViewMode::Grid => ViewMode::List,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::List => "List",
            ViewMode::Grid => "Icons",
        }
    }
}

/// Theme settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSettings {
    #[serde(default = "default_theme_name")]
    pub name: String,
}

fn default_theme_name() -> String {
    DEFAULT_THEME_NAME.to_string()
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            name: default_theme_name(),
        }
    }
}

fn default_show_hidden() -> bool {
    true
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

/// Application settings, stored as `~/.nimbus/settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: ThemeSettings,
    /// Absolute directory to open when no path is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_path: Option<String>,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default = "default_show_hidden")]
    pub show_hidden: bool,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeSettings::default(),
            start_path: None,
            sort_by: SortKey::default(),
            view_mode: ViewMode::default(),
            show_hidden: default_show_hidden(),
            search_limit: default_search_limit(),
            keybindings: KeybindingsConfig::default(),
        }
    }
}

impl Settings {
    /// Returns the config directory path (~/.nimbus)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".nimbus"))
    }

    /// Returns the config file path (~/.nimbus/settings.json)
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.json"))
    }

    /// Loads settings, falling back to defaults when the file is missing or
    /// invalid. The reason for a fallback is logged.
    pub fn load() -> Self {
        match Self::load_with_error() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "using default settings");
                Self::default()
            }
        }
    }

    /// Loads settings from the config file with error information.
    /// A missing file yields the defaults.
    pub fn load_with_error() -> Result<Self, String> {
        let config_path = Self::config_path()
            .ok_or_else(|| "Could not determine config path".to_string())?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file: {}", e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))
    }

    /// Saves settings to the config file using atomic write pattern
    pub fn save(&self) -> io::Result<()> {
        let Some(config_dir) = Self::config_dir() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            ));
        };
        self.save_to(&config_dir)
    }

    pub fn save_to(&self, config_dir: &Path) -> io::Result<()> {
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            // Set directory permissions to user-only on Unix
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = fs::Permissions::from_mode(0o700);
                let _ = fs::set_permissions(config_dir, perms);
            }
        }

        let config_path = config_dir.join("settings.json");
        let temp_path = config_dir.join("settings.json.tmp");
        let content = serde_json::to_string_pretty(self)?;

        // Atomic write: write to temp file first, then rename
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &config_path)?;

        tracing::debug!(path = %config_path.display(), "saved settings");
        Ok(())
    }

    /// Directory to open at startup: the command-line path if it is a
    /// directory, else `start_path` if it is an absolute directory, else home.
    pub fn resolve_start_path(&self, cli_path: Option<&Path>) -> PathBuf {
        let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));

        if let Some(path) = cli_path {
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            };
            if let Ok(canonical) = absolute.canonicalize() {
                if canonical.is_dir() {
                    return canonical;
                }
            }
            tracing::warn!(path = %path.display(), "start path is not a directory");
        }

        if let Some(path_str) = &self.start_path {
            let path = PathBuf::from(path_str);
            // Relative paths in the config file are ignored
            if path.is_absolute() {
                if let Ok(canonical) = path.canonicalize() {
                    if canonical.is_dir() {
                        return canonical;
                    }
                }
            }
        }

        home()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.theme.name, DEFAULT_THEME_NAME);
        assert_eq!(settings.sort_by, SortKey::Name);
        assert_eq!(settings.view_mode, ViewMode::List);
        assert!(settings.show_hidden);
        assert_eq!(settings.search_limit, 1000);
    }

    #[test]
    fn test_parse_partial_json() {
        let json = r#"{"sort_by":"modified","view_mode":"grid"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.sort_by, SortKey::Modified);
        assert_eq!(settings.view_mode, ViewMode::Grid);
        assert!(settings.show_hidden);
        assert_eq!(settings.search_limit, DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("cfg");
        let mut settings = Settings::default();
        settings.sort_by = SortKey::Size;
        settings.theme.name = "light".to_string();
        settings.save_to(&dir).unwrap();

        assert!(!dir.join("settings.json.tmp").exists());
        let loaded = Settings::load_from(&dir.join("settings.json")).unwrap();
        assert_eq!(loaded.sort_by, SortKey::Size);
        assert_eq!(loaded.theme.name, "light");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let loaded = Settings::load_from(&temp.path().join("nope.json")).unwrap();
        assert_eq!(loaded.sort_by, SortKey::Name);
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.starts_with("Invalid JSON"));
    }

    #[test]
    fn test_resolve_start_path_prefers_cli() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            start_path: Some("/definitely/not/here".to_string()),
            ..Settings::default()
        };
        let resolved = settings.resolve_start_path(Some(temp.path()));
        assert_eq!(resolved, temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_start_path_uses_config_then_home() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            start_path: Some(temp.path().display().to_string()),
            ..Settings::default()
        };
        let missing = temp.path().join("missing");
        assert_eq!(
            settings.resolve_start_path(Some(&missing)),
            temp.path().canonicalize().unwrap()
        );

        let relative = Settings {
            start_path: Some("relative/dir".to_string()),
            ..Settings::default()
        };
        let fallback = relative.resolve_start_path(None);
        assert!(fallback.is_absolute());
    }
}
