//! GeoJSON reading and writing
//!
//! The object model comes from the `geojson` crate. This module maps it to
//! and from the feature list, picks the output shape from the document mode
//! and keeps one stable key order for every buffer. It works in whatever CRS
//! the caller hands in; reprojection and rounding are the codec's job.

use geoforge_core::{Coord, DocumentMode, Feature, FeatureId, Geometry, SyncError, TextFormat};
use geojson::feature::Id;
use geojson::{FeatureCollection, GeoJson, Value as Shape};
use serde_json::{Map, Value};

use crate::number::json_number;

/// Output key order; anything else follows in its original order
const KEY_ORDER: [&str; 7] = [
    "type",
    "id",
    "geometry",
    "coordinates",
    "geometries",
    "properties",
    "features",
];

fn unsupported(found: impl Into<String>) -> SyncError {
    SyncError::unsupported_shape(TextFormat::GeoJson, found)
}

/// Parse GeoJSON text into a JSON tree
pub fn parse_text(text: &str) -> Result<Value, SyncError> {
    serde_json::from_str(text)
        .map_err(|e| SyncError::invalid_syntax(TextFormat::GeoJson, e.to_string()))
}

/// Read a FeatureCollection, Feature or bare geometry into features
pub fn read_document(value: &Value) -> Result<Vec<Feature>, SyncError> {
    let document =
        GeoJson::from_json_value(value.clone()).map_err(|e| unsupported(e.to_string()))?;
    match document {
        GeoJson::FeatureCollection(collection) => {
            collection.features.iter().map(read_feature).collect()
        }
        GeoJson::Feature(feature) => Ok(vec![read_feature(&feature)?]),
        GeoJson::Geometry(geometry) => Ok(vec![Feature {
            geometry: Some(read_geometry(&geometry)?),
            ..Feature::default()
        }]),
    }
}

/// Map one `geojson` feature
pub fn read_feature(feature: &geojson::Feature) -> Result<Feature, SyncError> {
    Ok(Feature {
        id: feature.id.as_ref().map(|id| match id {
            Id::String(s) => FeatureId::String(s.clone()),
            Id::Number(n) => FeatureId::Number(n.clone()),
        }),
        geometry: feature.geometry.as_ref().map(read_geometry).transpose()?,
        properties: feature.properties.clone().unwrap_or_default(),
    })
}

fn position(p: &[f64]) -> Option<Coord> {
    match p {
        [x, y] => Some(Coord::new(*x, *y)),
        [x, y, z, ..] => Some(Coord::with_z(*x, *y, *z)),
        _ => None,
    }
}

fn positions(ps: &[Vec<f64>]) -> Option<Vec<Coord>> {
    ps.iter().map(|p| position(p)).collect()
}

fn rings(rs: &[Vec<Vec<f64>>]) -> Option<Vec<Vec<Coord>>> {
    rs.iter().map(|r| positions(r)).collect()
}

/// Map one `geojson` geometry
pub fn read_geometry(geometry: &geojson::Geometry) -> Result<Geometry, SyncError> {
    let bad = |kind: &str| unsupported(format!("invalid coordinates for {}", kind));
    Ok(match &geometry.value {
        Shape::Point(p) => Geometry::Point(position(p).ok_or_else(|| bad("Point"))?),
        Shape::MultiPoint(ps) => {
            Geometry::MultiPoint(positions(ps).ok_or_else(|| bad("MultiPoint"))?)
        }
        Shape::LineString(ps) => {
            Geometry::LineString(positions(ps).ok_or_else(|| bad("LineString"))?)
        }
        Shape::MultiLineString(ls) => {
            Geometry::MultiLineString(rings(ls).ok_or_else(|| bad("MultiLineString"))?)
        }
        Shape::Polygon(rs) => Geometry::Polygon(rings(rs).ok_or_else(|| bad("Polygon"))?),
        Shape::MultiPolygon(polygons) => Geometry::MultiPolygon(
            polygons
                .iter()
                .map(|p| rings(p))
                .collect::<Option<_>>()
                .ok_or_else(|| bad("MultiPolygon"))?,
        ),
        Shape::GeometryCollection(members) => Geometry::GeometryCollection(
            members.iter().map(read_geometry).collect::<Result<_, _>>()?,
        ),
    })
}

fn to_position(c: &Coord) -> Vec<f64> {
    match c.z {
        Some(z) => vec![c.x, c.y, z],
        None => vec![c.x, c.y],
    }
}

fn to_positions(cs: &[Coord]) -> Vec<Vec<f64>> {
    cs.iter().map(to_position).collect()
}

fn to_rings(rings: &[Vec<Coord>]) -> Vec<Vec<Vec<f64>>> {
    rings.iter().map(|r| to_positions(r)).collect()
}

/// Build the `geojson` geometry for a feature-model geometry
pub fn to_geometry(geometry: &Geometry) -> geojson::Geometry {
    geojson::Geometry::new(match geometry {
        Geometry::Point(c) => Shape::Point(to_position(c)),
        Geometry::MultiPoint(cs) => Shape::MultiPoint(to_positions(cs)),
        Geometry::LineString(cs) => Shape::LineString(to_positions(cs)),
        Geometry::MultiLineString(lines) => Shape::MultiLineString(to_rings(lines)),
        Geometry::Polygon(rings) => Shape::Polygon(to_rings(rings)),
        Geometry::MultiPolygon(polygons) => {
            Shape::MultiPolygon(polygons.iter().map(|p| to_rings(p)).collect())
        }
        Geometry::GeometryCollection(members) => {
            Shape::GeometryCollection(members.iter().map(to_geometry).collect())
        }
    })
}

/// Build the `geojson` feature for a feature-model feature
pub fn to_feature(feature: &Feature) -> geojson::Feature {
    geojson::Feature {
        bbox: None,
        geometry: feature.geometry.as_ref().map(to_geometry),
        id: feature.id.as_ref().map(|id| match id {
            FeatureId::String(s) => Id::String(s.clone()),
            FeatureId::Number(n) => Id::Number(n.clone()),
        }),
        properties: Some(feature.properties.clone()),
        foreign_members: None,
    }
}

/// Pick the output shape: a lone feature follows the mode, anything else is
/// a FeatureCollection
pub fn to_document(features: &[Feature], mode: DocumentMode) -> GeoJson {
    match (mode, features) {
        (DocumentMode::Geometry, [Feature {
            geometry: Some(geometry),
            ..
        }]) => GeoJson::Geometry(to_geometry(geometry)),
        (DocumentMode::Feature, [only]) => GeoJson::Feature(to_feature(only)),
        _ => GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features: features.iter().map(to_feature).collect(),
            foreign_members: None,
        }),
    }
}

fn integral_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => json_number(f),
            None => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(integral_numbers).collect()),
        other => other,
    }
}

/// Reorder keys and print integral coordinates without a fraction
///
/// Property values and ids are left exactly as they are.
fn canonical(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            let mut ordered = Map::new();
            for key in KEY_ORDER {
                if let Some(v) = object.remove(key) {
                    let v = match key {
                        "coordinates" => integral_numbers(v),
                        "properties" | "id" => v,
                        _ => canonical(v),
                    };
                    ordered.insert(key.to_string(), v);
                }
            }
            ordered.extend(object);
            Value::Object(ordered)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonical).collect()),
        other => other,
    }
}

// Serializing the geojson types cannot fail: every map key is a string.
fn to_tree(document: &GeoJson) -> Value {
    canonical(serde_json::to_value(document).unwrap_or_default())
}

/// Write a geometry object
pub fn write_geometry(geometry: &Geometry) -> Value {
    to_tree(&GeoJson::Geometry(to_geometry(geometry)))
}

/// Write a Feature object
pub fn write_feature(feature: &Feature) -> Value {
    to_tree(&GeoJson::Feature(to_feature(feature)))
}

/// Write a FeatureCollection object
pub fn write_collection(features: &[Feature]) -> Value {
    to_tree(&to_document(features, DocumentMode::FeatureCollection))
}

/// Write a document honouring the mode for single-feature documents
///
/// Zero or several features always produce a FeatureCollection.
pub fn write_document(features: &[Feature], mode: DocumentMode) -> Value {
    to_tree(&to_document(features, mode))
}

/// Pretty-print with the stable two-space layout used by every buffer
pub fn to_pretty_text(value: &Value) -> String {
    // Serializing a Value cannot fail: every map key is a string.
    serde_json::to_string_pretty(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_bare_geometry() {
        let value = json!({"type": "Point", "coordinates": [1, 2]});
        let features = read_document(&value).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(
            features[0].geometry,
            Some(Geometry::Point(Coord::new(1.0, 2.0)))
        );
        assert!(features[0].properties.is_empty());
    }

    #[test]
    fn test_read_feature_with_null_geometry_and_id() {
        let value = json!({"type": "Feature", "id": "a", "geometry": null, "properties": {"k": 1}});
        let features = read_document(&value).unwrap();
        assert_eq!(features[0].id, Some(FeatureId::String("a".to_string())));
        assert!(features[0].geometry.is_none());
        assert_eq!(features[0].properties["k"], json!(1));
    }

    #[test]
    fn test_read_3d_positions() {
        let value = json!({"type": "LineString", "coordinates": [[0, 0, 5], [1, 1, 6]]});
        let features = read_document(&value).unwrap();
        assert!(features[0].geometry.as_ref().unwrap().has_z());
    }

    #[test]
    fn test_unsupported_shapes() {
        for value in [
            json!([1, 2]),
            json!({"features": []}),
            json!({"type": "Circle", "coordinates": [0, 0]}),
            json!({"type": "Point", "coordinates": [0]}),
            json!({"type": "FeatureCollection"}),
            json!({"type": "FeatureCollection", "features": [{"type": "Point", "coordinates": [0, 0]}]}),
            json!({"type": "Feature", "geometry": null, "properties": [1]}),
        ] {
            let err = read_document(&value).unwrap_err();
            assert!(
                matches!(err, SyncError::UnsupportedShape { .. }),
                "{value} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_text_syntax_error() {
        let err = parse_text("{not json").unwrap_err();
        assert!(matches!(err, SyncError::InvalidSyntax { .. }));
    }

    #[test]
    fn test_write_document_modes() {
        let features = vec![Feature::new(Geometry::Point(Coord::new(1.0, 2.0)))];
        assert_eq!(
            write_document(&features, DocumentMode::Geometry)["type"],
            "Point"
        );
        assert_eq!(
            write_document(&features, DocumentMode::Feature)["type"],
            "Feature"
        );
        assert_eq!(
            write_document(&features, DocumentMode::FeatureCollection)["type"],
            "FeatureCollection"
        );

        let two = vec![features[0].clone(), features[0].clone()];
        assert_eq!(
            write_document(&two, DocumentMode::Feature)["type"],
            "FeatureCollection"
        );
        assert_eq!(
            write_document(&[], DocumentMode::Geometry)["type"],
            "FeatureCollection"
        );

        let no_geometry = vec![Feature::default()];
        assert_eq!(
            write_document(&no_geometry, DocumentMode::Geometry)["type"],
            "FeatureCollection"
        );
    }

    #[test]
    fn test_write_feature_key_order_and_integers() {
        let mut feature = Feature::new(Geometry::Point(Coord::new(1.0, 2.5)))
            .with_property("stroke", json!("#ff0000"));
        feature.id = Some(FeatureId::String("a".to_string()));
        let value = write_feature(&feature);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["type", "id", "geometry", "properties"]);
        assert_eq!(value["geometry"]["coordinates"].to_string(), "[1,2.5]");
        assert_eq!(value["properties"]["stroke"], "#ff0000");
    }

    #[test]
    fn test_pretty_layout() {
        let text = to_pretty_text(&write_collection(&[]));
        assert_eq!(text, "{\n  \"type\": \"FeatureCollection\",\n  \"features\": []\n}");
    }
}
