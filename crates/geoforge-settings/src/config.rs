//! Configuration for GeoForge
//!
//! Supports JSON and TOML files. Configuration is organized into sections:
//! - Sync settings (thresholds, parse policy, document defaults)
//! - Map settings (fit-to-extent animation)
//! - Extra projections registered on top of the built-in ones

use std::path::{Path, PathBuf};

use geoforge_core::{ParsePolicy, ProjectionRegistry, WktDisplayMode, DEFAULT_CRS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SettingsError, SettingsResult};

/// Maximum decimals a coordinate can meaningfully carry in an f64
const MAX_DECIMALS: u32 = 15;

/// Synchronization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// GeoJSON length (characters) above which WKT is not regenerated
    pub large_document_threshold: usize,
    /// Handling of malformed WKT elements
    pub parse_policy: ParsePolicy,
    /// Projection of a fresh document
    pub default_projection: String,
    /// WKT layout of a fresh document
    pub default_wkt_display_mode: WktDisplayMode,
    /// Decimals kept in written coordinates
    pub coordinate_decimals: u32,
    /// Analysis results larger than this log a warning
    pub large_result_warning: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            large_document_threshold: 1_000_000,
            parse_policy: ParsePolicy::Lenient,
            default_projection: DEFAULT_CRS.to_string(),
            default_wkt_display_mode: WktDisplayMode::Collection,
            coordinate_decimals: 9,
            large_result_warning: 10_000,
        }
    }
}

/// Map view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Padding around a fitted extent, in pixels
    pub padding: f64,
    /// Fit animation length after a document change
    pub duration_ms: u64,
    /// Highest zoom a fit may reach
    pub max_zoom: f64,
    /// Fit animation length after an analysis preview
    pub analysis_duration_ms: u64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            padding: 40.0,
            duration_ms: 300,
            max_zoom: 16.0,
            analysis_duration_ms: 350,
        }
    }
}

/// An extra CRS registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSetting {
    /// Identifier, e.g. `EPSG:32631`
    pub code: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// PROJ.4-style definition
    pub definition: String,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncSettings,
    pub map: MapSettings,
    pub projections: Vec<ProjectionSetting>,
}

enum FileFormat {
    Json,
    Toml,
}

fn file_format(path: &Path) -> SettingsResult<FileFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(FileFormat::Json),
        Some("toml") => Ok(FileFormat::Toml),
        _ => Err(SettingsError::UnsupportedFormat(
            path.display().to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = file_format(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match file_format(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)?;
        debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.sync.large_document_threshold == 0 {
            return Err(SettingsError::invalid(
                "sync.large_document_threshold",
                "must be > 0",
            ));
        }

        if self.sync.coordinate_decimals > MAX_DECIMALS {
            return Err(SettingsError::invalid(
                "sync.coordinate_decimals",
                format!("must be at most {}", MAX_DECIMALS),
            ));
        }

        if self.sync.default_projection.trim().is_empty() {
            return Err(SettingsError::invalid(
                "sync.default_projection",
                "must not be empty",
            ));
        }

        if self.map.padding.is_nan() || self.map.padding < 0.0 {
            return Err(SettingsError::invalid("map.padding", "must be >= 0"));
        }

        if self.map.max_zoom.is_nan() || self.map.max_zoom <= 0.0 {
            return Err(SettingsError::invalid("map.max_zoom", "must be > 0"));
        }

        for projection in &self.projections {
            if projection.code.trim().is_empty() {
                return Err(SettingsError::invalid("projections.code", "must not be empty"));
            }
        }

        Ok(())
    }

    /// Built-in projections plus the configured ones
    ///
    /// Fails when a configured definition cannot be parsed or when the
    /// default projection ends up unregistered.
    pub fn build_registry(&self) -> SettingsResult<ProjectionRegistry> {
        let mut registry = ProjectionRegistry::with_defaults();
        for projection in &self.projections {
            let name = projection.name.as_deref().unwrap_or(&projection.code);
            registry.register_named(&projection.code, name, &projection.definition)?;
        }
        registry.get(&self.sync.default_projection)?;
        Ok(registry)
    }
}

/// Platform configuration file path (`<config dir>/geoforge/config.toml`)
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let mut path = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| SettingsError::ConfigDirectory("no config or home directory".to_string()))?;
    path.push("geoforge");
    path.push("config.toml");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sync.large_document_threshold, 1_000_000);
        assert_eq!(config.sync.default_projection, "EPSG:4326");
        assert_eq!(config.map.padding, 40.0);
        assert_eq!(config.map.max_zoom, 16.0);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.sync.large_document_threshold = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.coordinate_decimals = 16;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.default_projection = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.map.padding = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: Config = toml::from_str("[sync]\nparse_policy = \"strict\"\n").unwrap();
        assert_eq!(config.sync.parse_policy, ParsePolicy::Strict);
        assert_eq!(config.sync.coordinate_decimals, 9);
        assert_eq!(config.map, MapSettings::default());
    }

    #[test]
    fn test_build_registry() {
        let mut config = Config::default();
        config.projections.push(ProjectionSetting {
            code: "EPSG:900913".to_string(),
            name: Some("Google Mercator".to_string()),
            definition: "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs".to_string(),
        });
        let registry = config.build_registry().unwrap();
        assert!(registry.contains("EPSG:900913"));
        assert!(registry.contains("EPSG:2154"));

        config.sync.default_projection = "EPSG:27700".to_string();
        assert!(matches!(
            config.build_registry(),
            Err(SettingsError::Projection(_))
        ));
    }
}
