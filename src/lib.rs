//! # GeoForge
//!
//! Spatial-data editor engine keeping a GeoJSON buffer, a WKT buffer and a
//! map renderer's features consistent.
//!
//! ## Architecture
//!
//! 1. **geoforge-core** - Feature model, errors, projections, event bus
//! 2. **geoforge-codec** - GeoJSON and WKT codecs, mode detection, styles
//! 3. **geoforge-settings** - Configuration files and validation
//! 4. **geoforge-store** - Synchronization store, map binding, analysis
//! 5. **geoforge** - Logging setup and the conversion binary

pub mod convert;

pub use convert::{guess_format, Conversion};

pub use geoforge_codec::{Codec, CodecOptions, Format};
pub use geoforge_core::{
    Coord, DocumentBus, DocumentEvent, DocumentMode, Error, EventFilter, Extent, Feature,
    Geometry, ParsePolicy, ProjectionRegistry, Result, SyncError, TextFormat, UpdateOrigin,
    WktDisplayMode, ANALYSIS_CRS, WORKING_CRS,
};
pub use geoforge_settings::{Config, SettingsError};
pub use geoforge_store::{
    AnalysisError, AnalysisTool, DerivedView, EditingSession, MapBinding, Renderer, SyncReport,
    SyncStore,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// `RUST_LOG` directives are honoured on top of the `info` default. Logs
/// go to stderr so converted documents can be piped from stdout.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
