//! Persisted user defaults.
//!
//! Settings live in a JSON file under the user config directory and seed the
//! wizards' input fields. The settings object is constructed once at startup
//! and passed into each wizard; nothing in the wizard core writes it back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_OUTPUT_FORMAT: &str = "png";
pub const DEFAULT_DENSITY: u32 = 180;
pub const DEFAULT_QUALITY: u32 = 90;
pub const DEFAULT_PREFIX: &str = "Page-";
pub const DEFAULT_COMPRESS_PERCENT: u32 = 75;

/// Density limits for PDF conversion.
pub const MIN_DENSITY: u32 = 72;
pub const MAX_DENSITY: u32 = 600;

/// Formats offered for image conversion.
pub const IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "avif", "bmp", "tiff", "gif"];

/// Formats offered for PDF page export.
pub const PDF_OUTPUT_FORMATS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "gif"];

/// User-tunable defaults consulted when a wizard initializes its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default output format for PDF page export.
    pub output_format: String,
    /// Default DPI for PDF rasterization.
    pub density: u32,
    /// Default output quality (1-100).
    pub quality: u32,
    /// Default filename prefix for exported pages.
    pub prefix: String,
    /// Default compression target as a percentage of the original size.
    pub compress_percent: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            density: DEFAULT_DENSITY,
            quality: DEFAULT_QUALITY,
            prefix: DEFAULT_PREFIX.to_string(),
            compress_percent: DEFAULT_COMPRESS_PERCENT,
        }
    }
}

impl Settings {
    /// Load settings from the default config path. A missing file yields
    /// defaults; a corrupt file is logged and also yields defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(d) => d,
            Err(_) => return Self::default(),
        };

        let mut settings: Settings = match serde_json::from_str(&data) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings file corrupt, using defaults");
                return Self::default();
            }
        };
        settings.clamp();
        settings
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Force every persisted value back into its documented domain.
    fn clamp(&mut self) {
        self.density = self.density.clamp(MIN_DENSITY, MAX_DENSITY);
        self.quality = self.quality.clamp(1, 100);
        self.compress_percent = self.compress_percent.clamp(1, 100);
        if self.prefix.is_empty() {
            self.prefix = DEFAULT_PREFIX.to_string();
        }
        if self.output_format.is_empty() {
            self.output_format = DEFAULT_OUTPUT_FORMAT.to_string();
        }
    }
}

/// Path of the settings file: `<config_dir>/imgforge/config.json`.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Application directory under the platform config dir, with a working-dir
/// fallback when the platform offers none.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("imgforge")
}
