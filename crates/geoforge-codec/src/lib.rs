//! # GeoForge Codec
//!
//! Conversions between the canonical feature list and the two text
//! representations of a document, plus the helpers that sit next to them:
//! document mode detection and style metadata preservation.
//!
//! Decoded features are always in the working CRS (`WORKING_CRS`); text is
//! always in the document's active projection.

pub mod geojson;
pub mod mode;
pub mod number;
pub mod style;
pub mod wkt;

use std::sync::Arc;

use geoforge_core::{
    DocumentMode, Feature, FeatureList, ParsePolicy, ProjectionRegistry, SyncError,
    WktDisplayMode, WORKING_CRS,
};
use serde_json::Value;
use tracing::debug;

use number::round_to;

pub use mode::detect;
pub use style::{extract_style, merge_feature_styles, merge_style, strip_style_text, STYLE_KEYS};

/// Default number of decimals kept in written coordinates
pub const DEFAULT_DECIMALS: u32 = 9;

/// Text format and, for WKT, its layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    GeoJson,
    Wkt(WktDisplayMode),
}

/// Tunables for decoding and encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// How WKT elements that fail to parse are handled
    pub policy: ParsePolicy,
    /// Decimals kept in written coordinates; `None` writes full precision
    pub decimals: Option<u32>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            policy: ParsePolicy::Lenient,
            decimals: Some(DEFAULT_DECIMALS),
        }
    }
}

/// Geometry codec bound to a projection registry
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<ProjectionRegistry>,
    options: CodecOptions,
}

impl Codec {
    /// Create a codec with default options
    pub fn new(registry: Arc<ProjectionRegistry>) -> Self {
        Self::with_options(registry, CodecOptions::default())
    }

    /// Create a codec with explicit options
    pub fn with_options(registry: Arc<ProjectionRegistry>, options: CodecOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &ProjectionRegistry {
        &self.registry
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Decode text in `projection` into working-CRS features
    pub fn decode(
        &self,
        text: &str,
        format: Format,
        projection: &str,
    ) -> Result<FeatureList, SyncError> {
        match format {
            Format::GeoJson => self.decode_geojson(text, projection),
            Format::Wkt(mode) => self.decode_wkt(text, mode, projection),
        }
    }

    /// Encode working-CRS features as text in `projection`
    ///
    /// `mode` only matters for GeoJSON.
    pub fn encode(
        &self,
        features: &[Feature],
        format: Format,
        projection: &str,
        mode: DocumentMode,
    ) -> Result<String, SyncError> {
        match format {
            Format::GeoJson => self.encode_geojson(features, projection, mode),
            Format::Wkt(wkt_mode) => self.encode_wkt(features, wkt_mode, projection),
        }
    }

    pub fn decode_geojson(&self, text: &str, projection: &str) -> Result<FeatureList, SyncError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value = geojson::parse_text(text)?;
        self.decode_geojson_value(&value, projection)
    }

    /// Decode an already parsed GeoJSON tree
    pub fn decode_geojson_value(
        &self,
        value: &Value,
        projection: &str,
    ) -> Result<FeatureList, SyncError> {
        let features = geojson::read_document(value)?;
        debug!(count = features.len(), projection, "Decoded GeoJSON");
        self.reproject(features, projection, WORKING_CRS, None)
    }

    pub fn decode_wkt(
        &self,
        text: &str,
        mode: WktDisplayMode,
        projection: &str,
    ) -> Result<FeatureList, SyncError> {
        let features = wkt::read_document(text, mode, self.options.policy)?;
        debug!(count = features.len(), projection, ?mode, "Decoded WKT");
        self.reproject(features, projection, WORKING_CRS, None)
    }

    pub fn encode_geojson(
        &self,
        features: &[Feature],
        projection: &str,
        mode: DocumentMode,
    ) -> Result<String, SyncError> {
        let value = self.encode_geojson_value(features, projection, mode)?;
        Ok(geojson::to_pretty_text(&value))
    }

    /// Encode into a GeoJSON tree rather than text
    pub fn encode_geojson_value(
        &self,
        features: &[Feature],
        projection: &str,
        mode: DocumentMode,
    ) -> Result<Value, SyncError> {
        let projected = self.project_out(features, projection)?;
        Ok(geojson::write_document(&projected, mode))
    }

    pub fn encode_wkt(
        &self,
        features: &[Feature],
        mode: WktDisplayMode,
        projection: &str,
    ) -> Result<String, SyncError> {
        let projected = self.project_out(features, projection)?;
        Ok(wkt::write_document(&projected, mode))
    }

    /// Move working-CRS features into `projection`, rounded for output
    pub fn project_out(
        &self,
        features: &[Feature],
        projection: &str,
    ) -> Result<FeatureList, SyncError> {
        self.reproject(
            features.to_vec(),
            WORKING_CRS,
            projection,
            self.options.decimals,
        )
    }

    fn reproject(
        &self,
        mut features: FeatureList,
        from: &str,
        to: &str,
        decimals: Option<u32>,
    ) -> Result<FeatureList, SyncError> {
        for feature in &mut features {
            if let Some(geometry) = feature.geometry.take() {
                let moved = self.registry.reproject_geometry(&geometry, from, to)?;
                let moved = match decimals {
                    Some(_) => moved.try_map_coords(&mut |mut c| {
                        c.x = round_to(c.x, decimals);
                        c.y = round_to(c.y, decimals);
                        c.z = c.z.map(|z| round_to(z, decimals));
                        Ok::<_, SyncError>(c)
                    })?,
                    None => moved,
                };
                feature.geometry = Some(moved);
            }
        }
        Ok(features)
    }
}
