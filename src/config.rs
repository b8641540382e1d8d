use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::chart::ChartFormat;
use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where and how outputs are written
    pub output: OutputSettings,

    /// Chart canvas settings
    pub chart: ChartSettings,

    /// Logging settings
    pub logging: LogConfig,
}

/// Output file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory for generated files; next to the input when unset
    pub directory: Option<PathBuf>,

    /// Default chart format
    pub chart_format: ChartFormat,

    /// Write a chart alongside every plan in `generate`
    pub charts_enabled: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: None,
            chart_format: ChartFormat::Png,
            charts_enabled: true,
        }
    }
}

/// Chart canvas size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 800,
        }
    }
}

impl ChartSettings {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config.check()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("planrs")
            .join("config.toml")
    }

    /// Load the default configuration file, falling back to defaults when it is missing.
    ///
    /// A file that exists but cannot be parsed is an error rather than silently ignored.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path();

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    fn check(&self) -> Result<()> {
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(crate::error::PlanError::Configuration(format!(
                "chart size must be positive, got {}x{}",
                self.chart.width, self.chart.height
            ))
            .into());
        }
        Ok(())
    }
}
