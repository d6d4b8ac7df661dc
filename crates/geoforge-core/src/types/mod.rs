//! Document-level enums shared across the engine.
//!
//! These are the small vocabulary types every crate agrees on: which text
//! format a buffer holds, how a single-feature document is serialized, how
//! WKT is laid out, where an update came from, and how forgiving parsers are.

use serde::{Deserialize, Serialize};

/// The engine's working CRS. Every decoded feature lives in it.
pub const WORKING_CRS: &str = "EPSG:3857";

/// CRS that analysis tools consume and produce.
pub const ANALYSIS_CRS: &str = "EPSG:4326";

/// Projection a fresh document starts in.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Text formats held by the document buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextFormat {
    /// RFC 7946 shaped JSON
    GeoJson,
    /// OGC Well-Known Text
    Wkt,
}

impl std::fmt::Display for TextFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GeoJson => write!(f, "GeoJSON"),
            Self::Wkt => write!(f, "WKT"),
        }
    }
}

/// How a GeoJSON document is shaped
///
/// Only matters when the document holds exactly one feature; anything else
/// is always written as a FeatureCollection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentMode {
    /// A bare geometry object
    Geometry,
    /// A single Feature object
    Feature,
    /// A FeatureCollection
    #[default]
    FeatureCollection,
}

impl std::fmt::Display for DocumentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geometry => write!(f, "Geometry"),
            Self::Feature => write!(f, "Feature"),
            Self::FeatureCollection => write!(f, "FeatureCollection"),
        }
    }
}

/// Layout of the WKT buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WktDisplayMode {
    /// One literal for the whole document
    #[default]
    Collection,
    /// One literal per geometry, separated by blank lines
    Elements,
}

impl std::fmt::Display for WktDisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => write!(f, "collection"),
            Self::Elements => write!(f, "elements"),
        }
    }
}

/// Where a document mutation originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UpdateOrigin {
    /// A text buffer, an analysis action, or any other caller
    #[default]
    External,
    /// Written back from the renderer's own feature set
    FromRenderer,
}

impl UpdateOrigin {
    /// True when the renderer produced this update
    pub fn is_renderer(self) -> bool {
        matches!(self, Self::FromRenderer)
    }
}

/// How parsers treat individually malformed pieces of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Any malformed piece fails the whole document
    Strict,
    /// Malformed pieces are dropped, the rest is kept
    #[default]
    Lenient,
}
