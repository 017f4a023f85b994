//! Configuration module

use crate::archive::{Compression, UnzipOptions, ZipOptions};
use crate::extension::ExtensionPolicy;
use crate::progress::ProgressUnit;
use crate::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Packing settings
    #[serde(default)]
    pub compression: CompressionConfig,
    /// Unpacking settings
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Progress accounting
    #[serde(default)]
    pub progress: ProgressConfig,
    /// Additional archive extensions
    #[serde(default)]
    pub extensions: ExtensionsConfig,
}

/// Compression configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Compression method: deflated or stored
    pub method: Compression,
    /// Compression level (codec default if unset)
    pub level: Option<i64>,
    /// Record permissions and modification times
    pub preserve_metadata: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            method: Compression::Deflated,
            level: None,
            preserve_metadata: true,
        }
    }
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Replace existing files by default
    pub overwrite: bool,
    pub preserve_permissions: bool,
    pub preserve_timestamps: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            preserve_permissions: true,
            preserve_timestamps: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// entries or bytes
    pub unit: ProgressUnit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// Extensions accepted in addition to the built-in ones
    pub custom: Vec<String>,
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| Error::Config("Unable to determine config directory".to_string()))?;

        Ok(config_dir.join("ziplet").join("config.toml"))
    }

    /// Get default configuration content with comments
    pub fn default_config_content() -> String {
        r#"# Ziplet Configuration File

[compression]
# Compression method for file entries: deflated, stored
method = "deflated"
# Compression level (omit for the codec default)
# level = 6
# Record unix permissions and modification times
preserve_metadata = true

[extraction]
# Replace existing files when unpacking
overwrite = false
preserve_permissions = true
preserve_timestamps = true

[progress]
# Progress unit: entries (one per entry) or bytes (weighted by size)
unit = "entries"

[extensions]
# Archive extensions accepted in addition to zip and cbz
custom = []
"#
        .to_string()
    }

    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, Self::default_config_content())?;
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, contents)?;
        Ok(())
    }

    pub fn zip_options(&self) -> ZipOptions {
        ZipOptions {
            compression: self.compression.method,
            level: self.compression.level,
            unit: self.progress.unit,
            preserve_permissions: self.compression.preserve_metadata,
            preserve_timestamps: self.compression.preserve_metadata,
        }
    }

    pub fn unzip_options(&self) -> UnzipOptions {
        UnzipOptions {
            unit: self.progress.unit,
            preserve_permissions: self.extraction.preserve_permissions,
            preserve_timestamps: self.extraction.preserve_timestamps,
        }
    }

    /// Register the configured custom extensions into `policy`
    pub fn register_extensions(&self, policy: &ExtensionPolicy) {
        for extension in &self.extensions.custom {
            policy.add_custom(extension);
        }
    }
}
