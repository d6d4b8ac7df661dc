//! Analysis boundary
//!
//! Analysis tools are pure functions over GeoJSON values in WGS84. The
//! store hands them its document reprojected to `ANALYSIS_CRS` and brings
//! their output back into the active projection.

use geoforge_codec::geojson;
use geoforge_core::{
    features_extent, Coord, DocumentMode, Feature, FeatureList, Geometry, SyncError, TextFormat,
    ANALYSIS_CRS,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{SyncReport, SyncStore};

/// Errors raised while running or applying an analysis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The document is empty
    #[error("No input document")]
    NoInput,

    /// The document does not decode
    #[error("Input document is invalid: {0}")]
    InvalidInput(SyncError),

    /// The document decodes to zero features
    #[error("Input document has no features")]
    NoFeatures,

    /// The tool rejected its input
    #[error("{tool} failed: {reason}")]
    Tool { tool: String, reason: String },

    /// The tool returned something that is not GeoJSON
    #[error("Analysis output is invalid: {0}")]
    InvalidOutput(SyncError),

    /// Conversion of the result failed or produced nothing
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl AnalysisError {
    pub fn tool(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// A spatial analysis operation
pub trait AnalysisTool {
    /// Display name, also used in error messages
    fn name(&self) -> &str;

    /// Run on a WGS84 FeatureCollection and return GeoJSON in WGS84
    fn run(&self, input: &Value) -> Result<Value, AnalysisError>;
}

/// Output of a tool, ready to preview or apply
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub tool: String,
    /// Result as GeoJSON text in the active projection
    pub text: String,
    /// Result features in the working CRS, for preview
    pub features: FeatureList,
    pub feature_count: usize,
}

/// What applying a result did
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyResult {
    pub report: SyncReport,
    pub feature_count: usize,
    /// More features than the large-result warning allows
    pub large: bool,
}

impl SyncStore {
    /// The document as a WGS84 FeatureCollection
    pub fn analysis_input(&self) -> Result<Value, AnalysisError> {
        if self.geojson_text().trim().is_empty() {
            return Err(AnalysisError::NoInput);
        }
        let features = self.features().map_err(AnalysisError::InvalidInput)?;
        if features.is_empty() {
            return Err(AnalysisError::NoFeatures);
        }
        Ok(self.codec.encode_geojson_value(
            &features,
            ANALYSIS_CRS,
            DocumentMode::FeatureCollection,
        )?)
    }

    /// Run a tool on the document
    ///
    /// A single result feature is written as a Feature object, anything
    /// else as a FeatureCollection.
    pub fn run_analysis(
        &self,
        tool: &dyn AnalysisTool,
    ) -> Result<AnalysisResult, AnalysisError> {
        let input = self.analysis_input()?;
        let output = tool.run(&input)?;
        let features = self
            .codec
            .decode_geojson_value(&output, ANALYSIS_CRS)
            .map_err(AnalysisError::InvalidOutput)?;
        if features.is_empty() {
            return Err(SyncError::EmptyResult {
                operation: tool.name().to_string(),
            }
            .into());
        }

        let mode = if features.len() == 1 {
            DocumentMode::Feature
        } else {
            DocumentMode::FeatureCollection
        };
        let text = self
            .codec
            .encode_geojson(&features, self.projection(), mode)?;
        info!(tool = tool.name(), count = features.len(), "Analysis finished");
        Ok(AnalysisResult {
            tool: tool.name().to_string(),
            text,
            feature_count: features.len(),
            features,
        })
    }

    /// Replace the document with a result
    pub fn replace_with_result(&mut self, result: &AnalysisResult) -> ApplyResult {
        info!(
            tool = %result.tool,
            count = result.feature_count,
            "Replacing document with analysis result"
        );
        let report = self.set_geojson_text(&result.text);
        self.apply_result(report, result.feature_count)
    }

    /// Append a result's features to the document
    ///
    /// Both documents are normalised to feature arrays at the JSON level,
    /// so properties and ids pass through untouched.
    pub fn merge_result(
        &mut self,
        result: &AnalysisResult,
    ) -> Result<ApplyResult, AnalysisError> {
        let mut features = if self.geojson_text().trim().is_empty() {
            Vec::new()
        } else {
            let existing = self.geojson_value().map_err(AnalysisError::InvalidInput)?;
            feature_values(existing).map_err(AnalysisError::InvalidInput)?
        };
        let incoming = geojson::parse_text(&result.text).map_err(AnalysisError::InvalidOutput)?;
        features.extend(feature_values(incoming).map_err(AnalysisError::InvalidOutput)?);

        let count = features.len();
        let merged = json!({
            "type": "FeatureCollection",
            "features": features,
        });
        info!(tool = %result.tool, count, "Merging analysis result into document");
        let report = self.set_geojson_text(&geojson::to_pretty_text(&merged));
        Ok(self.apply_result(report, count))
    }

    fn apply_result(&self, report: SyncReport, feature_count: usize) -> ApplyResult {
        let limit = self.config.sync.large_result_warning;
        let large = feature_count > limit;
        if large {
            warn!(feature_count, limit, "Large analysis result");
        }
        ApplyResult {
            report,
            feature_count,
            large,
        }
    }
}

/// Normalise a FeatureCollection, Feature or bare geometry to Feature values
fn feature_values(value: Value) -> Result<Vec<Value>, SyncError> {
    let kind = value.get("type").and_then(Value::as_str).map(str::to_string);
    match kind.as_deref() {
        Some("FeatureCollection") => match value {
            Value::Object(mut object) => match object.remove("features") {
                Some(Value::Array(features)) => Ok(features),
                _ => Err(SyncError::unsupported_shape(
                    TextFormat::GeoJson,
                    "FeatureCollection without a features array",
                )),
            },
            _ => Ok(Vec::new()),
        },
        Some("Feature") => Ok(vec![value]),
        Some(_) => Ok(vec![json!({
            "type": "Feature",
            "geometry": value,
            "properties": {},
        })]),
        None => Err(SyncError::unsupported_shape(
            TextFormat::GeoJson,
            "object without a type",
        )),
    }
}

fn collect_points(tool: &str, input: &Value) -> Result<Vec<Coord>, AnalysisError> {
    let features = geojson::read_document(input).map_err(AnalysisError::InvalidInput)?;
    let mut points = Vec::new();
    for feature in &features {
        match &feature.geometry {
            Some(Geometry::Point(c)) => points.push(*c),
            Some(Geometry::MultiPoint(cs)) => points.extend(cs.iter().copied()),
            Some(other) => {
                return Err(AnalysisError::tool(
                    tool,
                    format!("expected points, found {}", other.type_name()),
                ))
            }
            None => {}
        }
    }
    Ok(points)
}

fn point_collection(c: Coord) -> Value {
    geojson::write_collection(&[Feature::new(Geometry::Point(c))])
}

/// Geodesic midpoint of exactly two points
#[derive(Debug, Default, Clone, Copy)]
pub struct MidpointTool;

impl AnalysisTool for MidpointTool {
    fn name(&self) -> &str {
        "Midpoint"
    }

    fn run(&self, input: &Value) -> Result<Value, AnalysisError> {
        let points = collect_points(self.name(), input)?;
        let [a, b] = points.as_slice() else {
            return Err(AnalysisError::tool(
                self.name(),
                format!("needs exactly two points, got {}", points.len()),
            ));
        };

        let (lon1, lat1) = (a.x.to_radians(), a.y.to_radians());
        let (lon2, lat2) = (b.x.to_radians(), b.y.to_radians());
        let d_lon = lon2 - lon1;
        let bx = lat2.cos() * d_lon.cos();
        let by = lat2.cos() * d_lon.sin();
        let lat = (lat1.sin() + lat2.sin())
            .atan2(((lat1.cos() + bx).powi(2) + by.powi(2)).sqrt());
        let lon = lon1 + by.atan2(lat1.cos() + bx);

        Ok(point_collection(Coord::new(lon.to_degrees(), lat.to_degrees())))
    }
}

/// Centre of the bounding box of every feature
#[derive(Debug, Default, Clone, Copy)]
pub struct CenterTool;

impl AnalysisTool for CenterTool {
    fn name(&self) -> &str {
        "Center"
    }

    fn run(&self, input: &Value) -> Result<Value, AnalysisError> {
        let features = geojson::read_document(input).map_err(AnalysisError::InvalidInput)?;
        let extent = features_extent(&features)
            .ok_or_else(|| AnalysisError::tool(self.name(), "no coordinates"))?;
        Ok(point_collection(extent.center()))
    }
}
