//! Compiler configuration, loaded from an optional TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::stream::StreamConfig;
use crate::theme::ThemeInfo;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub theme: ThemeInfo,
    pub stream: StreamConfig,
}

impl ThemeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.theme.name.trim().is_empty() {
            return Err(ConfigError::Invalid("theme.name must not be empty".into()));
        }
        if self.stream.chunk_size == 0 {
            return Err(ConfigError::Invalid("stream.chunk_size must be > 0".into()));
        }
        if self.stream.buffer_chunks == 0 {
            return Err(ConfigError::Invalid("stream.buffer_chunks must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ThemeConfig::from_toml_str("").unwrap();
        assert_eq!(config, ThemeConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ThemeConfig::from_toml_str(
            r#"
            [theme]
            name = "Acme"
            version = "2.1.0"

            [stream]
            chunk_size = 1024
            "#,
        )
        .unwrap();
        assert_eq!(config.theme.name, "Acme");
        assert_eq!(config.theme.version, semver::Version::new(2, 1, 0));
        assert_eq!(config.theme.author, "AI Builder");
        assert_eq!(config.stream.chunk_size, 1024);
        assert_eq!(config.stream.buffer_chunks, 4);
    }

    #[test]
    fn test_rejects_bad_version_and_zero_chunk() {
        assert!(matches!(
            ThemeConfig::from_toml_str("[theme]\nversion = \"one\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ThemeConfig::from_toml_str("[stream]\nchunk_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.toml");
        fs::write(&path, "[theme]\nauthor = \"Studio\"\n").unwrap();
        assert_eq!(ThemeConfig::load(&path).unwrap().theme.author, "Studio");
    }
}
