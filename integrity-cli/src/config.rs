//! Configuration management
//!
//! Handles storing and loading the hashing defaults used by the CLI.
//! Config directory: ~/.integrity-hash/ (cross-platform)
//!
//! Config file format (~/.integrity-hash/config.toml):
//! ```toml
//! [segment]
//! size = 16777216
//! strategy = "parallel"
//!
//! [erasure]
//! data_shards = 4
//! parity_shards = 2
//! ```
//!
//! Missing fields fall back to environment variables, then built-in defaults.

use anyhow::{Context, Result};
use integrity_core::{
    ErasureConfig, HashConfig, Strategy, DEFAULT_DATA_SHARDS, DEFAULT_PARITY_SHARDS,
    DEFAULT_SEGMENT_SIZE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Structure of ~/.integrity-hash/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntegrityConfig {
    /// Segmentation settings
    #[serde(default)]
    pub segment: SegmentSettings,

    /// Shard layout settings
    #[serde(default)]
    pub erasure: ErasureSettings,
}

impl IntegrityConfig {
    /// Validated per-computation parameters
    pub fn hash_config(&self) -> Result<HashConfig> {
        let config = HashConfig {
            segment_size: self.segment.size,
            erasure: ErasureConfig {
                data_shards: self.erasure.data_shards,
                parity_shards: self.erasure.parity_shards,
            },
        };
        config.validate().context("Invalid hashing configuration")?;
        Ok(config)
    }
}

/// Segmentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSettings {
    /// Segment size in bytes
    #[serde(default = "default_segment_size")]
    pub size: usize,

    /// Execution strategy for bulk hashing
    #[serde(default)]
    pub strategy: Strategy,
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self {
            size: default_segment_size(),
            strategy: Strategy::default(),
        }
    }
}

/// Shard layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErasureSettings {
    /// Number of data shards
    #[serde(default = "default_data_shards")]
    pub data_shards: usize,

    /// Number of parity shards
    #[serde(default = "default_parity_shards")]
    pub parity_shards: usize,
}

impl Default for ErasureSettings {
    fn default() -> Self {
        Self {
            data_shards: default_data_shards(),
            parity_shards: default_parity_shards(),
        }
    }
}

fn env_or(key: &str, fallback: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(fallback)
}

fn default_segment_size() -> usize {
    env_or("INTEGRITY_SEGMENT_SIZE", DEFAULT_SEGMENT_SIZE)
}

fn default_data_shards() -> usize {
    env_or("INTEGRITY_DATA_SHARDS", DEFAULT_DATA_SHARDS)
}

fn default_parity_shards() -> usize {
    env_or("INTEGRITY_PARITY_SHARDS", DEFAULT_PARITY_SHARDS)
}

/// Get the config directory path (~/.integrity-hash/)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".integrity-hash"))
}

/// Get the config file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Parse a config file
pub fn read_config(path: &Path) -> Result<IntegrityConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Load configuration from `path`, or from the default location.
/// Falls back to defaults if the default file doesn't exist or is unreadable;
/// an explicitly given file must load.
pub fn load_config(path: Option<&Path>) -> Result<IntegrityConfig> {
    if let Some(path) = path {
        return read_config(path);
    }

    match config_file_path() {
        Ok(path) if path.exists() => match read_config(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!("Warning: {:#}", e);
                Ok(IntegrityConfig::default())
            }
        },
        _ => Ok(IntegrityConfig::default()),
    }
}

/// Save configuration to file, creating its directory
pub fn save_config(config: &IntegrityConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).context("Failed to write config file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = IntegrityConfig::default();
        let hash_config = config.hash_config().unwrap();
        assert!(hash_config.segment_size > 0);
        assert!(hash_config.erasure.data_shards > 0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: IntegrityConfig = toml::from_str(
            r#"
            [erasure]
            data_shards = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.erasure.data_shards, 6);
        assert_eq!(config.erasure.parity_shards, default_parity_shards());
        assert_eq!(config.segment.size, default_segment_size());
        assert_eq!(config.segment.strategy, Strategy::Parallel);
    }

    #[test]
    fn test_strategy_parses_lowercase() {
        let config: IntegrityConfig = toml::from_str(
            r#"
            [segment]
            size = 1024
            strategy = "serial"
            "#,
        )
        .unwrap();

        assert_eq!(config.segment.strategy, Strategy::Serial);
        assert_eq!(config.hash_config().unwrap().segment_size, 1024);
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let mut config = IntegrityConfig::default();
        config.erasure.data_shards = 0;
        assert!(config.hash_config().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = IntegrityConfig::default();
        config.segment.size = 4096;
        config.erasure.parity_shards = 0;
        save_config(&config, &path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.segment.size, 4096);
        assert_eq!(loaded.erasure.parity_shards, 0);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&IntegrityConfig::default()).unwrap();
        assert!(toml_str.contains("[segment]"));
        assert!(toml_str.contains("[erasure]"));
        assert!(toml_str.contains("data_shards"));
        assert!(toml_str.contains("strategy = \"parallel\""));
    }
}
