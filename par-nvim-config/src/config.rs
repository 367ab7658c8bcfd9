//! The `Config` struct, its loading and validation.

use std::fs;
use std::path::{Path, PathBuf};

use par_nvim_fonts::FontSpec;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ConfigError;
use crate::types::LogLevel;

/// Bridge configuration, read from `~/.config/par-nvim/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Editor executable spawned when no other connection mode is requested.
    #[serde(default = "defaults::nvim_path")]
    pub nvim_path: String,

    /// Extra arguments for the editor, in shell syntax (e.g. `-u NONE --noplugin`).
    /// Forwarded ahead of any `-- ...` arguments given on the command line.
    #[serde(default)]
    pub extra_args: Option<String>,

    /// Font requested at startup, in `family:h<size>:b:i` form.
    #[serde(default)]
    pub font: Option<String>,

    /// Extra per-line pixel spacing requested at startup.
    #[serde(default)]
    pub linespace: Option<i64>,

    /// Hide the mouse pointer while typing.
    #[serde(default)]
    pub mouse_hide: Option<bool>,

    /// Request a maximized window at startup.
    #[serde(default)]
    pub maximized: bool,

    /// Request a fullscreen window at startup (wins over `maximized`).
    #[serde(default)]
    pub fullscreen: bool,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Milliseconds to wait for the editor to exit on close before killing it.
    #[serde(default = "defaults::close_timeout_ms")]
    pub close_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nvim_path: defaults::nvim_path(),
            extra_args: None,
            font: None,
            linespace: None,
            mouse_hide: None,
            maximized: false,
            fullscreen: false,
            log_level: LogLevel::default(),
            close_timeout_ms: defaults::close_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, or defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load and validate configuration from `path`.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path)?;
        let config: Config = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check field values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nvim_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "nvim_path must not be empty".to_string(),
            ));
        }
        if self.close_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "close_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(font) = &self.font {
            FontSpec::parse(font)
                .map_err(|e| ConfigError::Validation(format!("font '{font}': {e}")))?;
        }
        self.extra_args_list()?;
        Ok(())
    }

    /// `extra_args` split into words.
    pub fn extra_args_list(&self) -> Result<Vec<String>, ConfigError> {
        match &self.extra_args {
            Some(args) => shell_words::split(args)
                .map_err(|e| ConfigError::Validation(format!("extra_args: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Directory holding par-nvim configuration.
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("par-nvim")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // XDG convention on all Unix platforms: ~/.config/par-nvim
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("par-nvim")
            } else {
                PathBuf::from(".")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.nvim_path, "nvim");
        assert_eq!(config.close_timeout_ms, 2000);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "nvim_path: /opt/nvim/bin/nvim\nfont: \"Hack:h11\"\nlinespace: 2\nlog_level: debug\n",
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.nvim_path, "/opt/nvim/bin/nvim");
        assert_eq!(config.font.as_deref(), Some("Hack:h11"));
        assert_eq!(config.linespace, Some(2));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.maximized);
        assert_eq!(config.close_timeout_ms, 2000);
    }

    #[test]
    fn test_invalid_font_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "font: \"Hack:hbig\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "linespace: [not, a, number\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_extra_args_are_shell_split() {
        let config = Config {
            extra_args: Some("-u NONE --cmd 'set shortmess+=I'".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.extra_args_list().unwrap(),
            vec!["-u", "NONE", "--cmd", "set shortmess+=I"]
        );
    }

    #[test]
    fn test_unbalanced_extra_args_fail_validation() {
        let config = Config {
            extra_args: Some("--cmd 'oops".to_string()),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_blank_nvim_path_fails_validation() {
        let config = Config {
            nvim_path: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_close_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "close_timeout_ms: 0\n").unwrap();
        match Config::load_from(&path) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("close_timeout_ms")),
            other => panic!("expected validation error, got {other:?}"),
        }

        let config = Config {
            close_timeout_ms: 1,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
