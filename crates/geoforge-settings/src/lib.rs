//! GeoForge Settings Crate
//!
//! Configuration files, defaults and validation.

pub mod config;
pub mod error;

pub use config::{default_config_path, Config, MapSettings, ProjectionSetting, SyncSettings};
pub use error::{SettingsError, SettingsResult};
