use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::core::constants::{DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE};

/// A user-defined role added through the config file. Custom roles are
/// merged into the registry after the built-ins and may shadow a built-in
/// of the same name.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomRole {
    pub name: String,
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat completion model; CLI -m overrides this.
    pub chat_model: Option<String>,
    /// Image generation model.
    pub image_model: Option<String>,
    /// Size string sent with image requests (e.g. "1024x1024").
    pub image_size: Option<String>,
    /// Role selected at startup; defaults to the first built-in.
    pub default_role: Option<String>,
    /// Whether image generation starts enabled.
    pub image_generation: Option<bool>,
    /// HTTP timeout for provider calls, in seconds. Unset means no timeout.
    pub request_timeout_secs: Option<u64>,
    /// Directory where generated images are written; defaults to the
    /// current directory.
    pub image_dir: Option<PathBuf>,
    #[serde(default)]
    pub custom_roles: Vec<CustomRole>,
}

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from_path(&Self::config_path())
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            })?;
            let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: config_path.to_path_buf(),
                source,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn StdError>> {
        self.save_to_path(&Self::config_path())
    }

    /// Write the config atomically: serialize into a temp file in the same
    /// directory, then persist over the target.
    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let contents = toml::to_string_pretty(self)?;
        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(config_path)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "studiolo")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    pub fn chat_model(&self) -> &str {
        self.chat_model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL)
    }

    pub fn image_model(&self) -> &str {
        self.image_model.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL)
    }

    pub fn image_size(&self) -> &str {
        self.image_size.as_deref().unwrap_or(DEFAULT_IMAGE_SIZE)
    }

    pub fn image_generation_enabled(&self) -> bool {
        self.image_generation.unwrap_or(false)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.image_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.chat_model(), DEFAULT_CHAT_MODEL);
        assert_eq!(config.image_model(), DEFAULT_IMAGE_MODEL);
        assert_eq!(config.image_size(), DEFAULT_IMAGE_SIZE);
        assert!(!config.image_generation_enabled());
        assert!(config.custom_roles.is_empty());
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn parses_custom_roles_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
chat_model = "gpt-4o"
image_size = "512x512"
default_role = "Poet"
request_timeout_secs = 30

[[custom_roles]]
name = "Poet"
prompt = "You are a poet."
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.chat_model(), "gpt-4o");
        assert_eq!(config.image_size(), "512x512");
        assert_eq!(config.default_role.as_deref(), Some("Poet"));
        assert_eq!(config.request_timeout_secs, Some(30));
        assert_eq!(config.custom_roles.len(), 1);
        assert_eq!(config.custom_roles[0].name, "Poet");
    }

    #[test]
    fn invalid_toml_reports_parse_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "chat_model = [not toml").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            chat_model: Some("gpt-4o".to_string()),
            default_role: Some("Film Critic".to_string()),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.chat_model(), "gpt-4o");
        assert_eq!(loaded.default_role.as_deref(), Some("Film Critic"));
    }
}
