//! WKT reading and writing
//!
//! Like the GeoJSON module this works in whatever CRS the caller hands in.
//! Two document layouts are supported: a single literal covering every
//! feature (`Collection`) and one literal per geometry separated by blank
//! lines (`Elements`).

mod convert;

pub use convert::{from_wkt, parse_literal, to_wkt, write_literal};

use ::wkt::types::GeometryCollection;
use ::wkt::Wkt;
use geoforge_core::{Feature, Geometry, ParsePolicy, SyncError, WktDisplayMode};
use tracing::{debug, warn};

use convert::{empty_point, render};

/// Split text into literals, one per run of non-blank lines
pub fn split_literals(text: &str) -> Vec<String> {
    let mut literals = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                literals.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        literals.push(current.join("\n"));
    }
    literals
}

fn literal_feature(value: &Wkt<f64>) -> Feature {
    Feature {
        geometry: from_wkt(value),
        ..Feature::default()
    }
}

/// Turn one parsed literal into features
///
/// A top-level collection yields one feature per member. `POINT EMPTY`
/// yields a feature without geometry, at the top level or as a member.
fn literal_features(value: Wkt<f64>) -> Vec<Feature> {
    match value {
        Wkt::GeometryCollection(members) => members.0.iter().map(literal_feature).collect(),
        other => vec![literal_feature(&other)],
    }
}

fn feature_value(feature: &Feature) -> Wkt<f64> {
    feature.geometry.as_ref().map(to_wkt).unwrap_or_else(empty_point)
}

/// Read the whole text as a single literal
pub fn read_collection(text: &str) -> Result<Vec<Feature>, SyncError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    parse_literal(text).map(literal_features)
}

/// Read blank-line separated literals
///
/// With `ParsePolicy::Lenient` a literal that fails to parse is dropped,
/// unless every literal fails, in which case the first error is returned.
/// With `ParsePolicy::Strict` the first failure is returned.
pub fn read_elements(text: &str, policy: ParsePolicy) -> Result<Vec<Feature>, SyncError> {
    let literals = split_literals(text);
    let mut features = Vec::new();
    let mut first_error = None;
    let mut parsed = 0usize;

    for (index, literal) in literals.iter().enumerate() {
        match parse_literal(literal) {
            Ok(value) => {
                parsed += 1;
                features.extend(literal_features(value));
            }
            Err(err) if policy == ParsePolicy::Strict => return Err(err),
            Err(err) => {
                warn!(index, error = %err, "Dropping unparsable WKT element");
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) if parsed == 0 => Err(err),
        _ => {
            debug!(
                literals = literals.len(),
                parsed,
                features = features.len(),
                "Read WKT elements"
            );
            Ok(features)
        }
    }
}

/// Read a WKT document in the given layout
pub fn read_document(
    text: &str,
    mode: WktDisplayMode,
    policy: ParsePolicy,
) -> Result<Vec<Feature>, SyncError> {
    match mode {
        WktDisplayMode::Collection => read_collection(text),
        WktDisplayMode::Elements => read_elements(text, policy),
    }
}

/// Write all features as one literal
///
/// The inverse of `read_collection`: a lone feature holding a collection is
/// wrapped in one more collection so it reads back as a single feature.
/// Features without geometry are written as `POINT EMPTY`.
pub fn write_collection(features: &[Feature]) -> String {
    let value = match features {
        [] => return "GEOMETRYCOLLECTION EMPTY".to_string(),
        [only] => match &only.geometry {
            Some(inner @ Geometry::GeometryCollection(_)) => {
                Wkt::GeometryCollection(GeometryCollection(vec![to_wkt(inner)]))
            }
            _ => feature_value(only),
        },
        _ => Wkt::GeometryCollection(GeometryCollection(
            features.iter().map(feature_value).collect(),
        )),
    };
    render(&value)
}

/// Write one literal per geometry, collections flattened
///
/// Flattening means a feature holding a collection reads back as one
/// feature per member.
pub fn write_elements(features: &[Feature]) -> String {
    let mut literals = Vec::new();
    for feature in features {
        match &feature.geometry {
            Some(geometry) => literals.extend(geometry.flatten().into_iter().map(write_literal)),
            None => literals.push(render(&empty_point())),
        }
    }
    literals.join("\n\n")
}

/// Write a WKT document in the given layout
pub fn write_document(features: &[Feature], mode: WktDisplayMode) -> String {
    match mode {
        WktDisplayMode::Collection => write_collection(features),
        WktDisplayMode::Elements => write_elements(features),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoforge_core::Coord;

    #[test]
    fn test_split_literals() {
        let text = "POINT (1 2)\n\n\nLINESTRING (0 0,\n 1 1)\n   \nPOINT (3 4)\n";
        assert_eq!(
            split_literals(text),
            vec!["POINT (1 2)", "LINESTRING (0 0,\n 1 1)", "POINT (3 4)"]
        );
        assert!(split_literals("  \n\n").is_empty());
    }

    #[test]
    fn test_collection_splits_members() {
        let features =
            read_collection("GEOMETRYCOLLECTION (POINT (1 2), LINESTRING (0 0, 1 1))").unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(
            features[0].geometry,
            Some(Geometry::Point(Coord::new(1.0, 2.0)))
        );
        assert!(read_collection("GEOMETRYCOLLECTION EMPTY").unwrap().is_empty());
        assert!(read_collection("   ").unwrap().is_empty());
    }

    #[test]
    fn test_point_empty_has_no_geometry() {
        let features = read_collection("POINT EMPTY").unwrap();
        assert_eq!(features.len(), 1);
        assert!(features[0].geometry.is_none());
    }

    #[test]
    fn test_collection_keeps_empty_members_as_features() {
        let features = read_collection("GEOMETRYCOLLECTION (POINT EMPTY, POINT (1 2))").unwrap();
        assert_eq!(features.len(), 2);
        assert!(features[0].geometry.is_none());
        assert!(features[1].geometry.is_some());
    }

    #[test]
    fn test_write_collection_shapes() {
        assert_eq!(write_collection(&[]), "GEOMETRYCOLLECTION EMPTY");
        let point = Feature::new(Geometry::Point(Coord::new(1.0, 2.0)));
        assert_eq!(write_collection(&[point.clone()]), "POINT (1 2)");
        assert_eq!(
            write_collection(&[point.clone(), point.clone()]),
            "GEOMETRYCOLLECTION (POINT (1 2), POINT (1 2))"
        );
        assert_eq!(write_collection(&[Feature::default()]), "POINT EMPTY");
        assert_eq!(
            write_collection(&[Feature::default(), point]),
            "GEOMETRYCOLLECTION (POINT EMPTY, POINT (1 2))"
        );
    }

    #[test]
    fn test_lone_collection_feature_is_wrapped() {
        let pair = Geometry::GeometryCollection(vec![
            Geometry::Point(Coord::new(1.0, 2.0)),
            Geometry::Point(Coord::new(3.0, 4.0)),
        ]);
        let text = write_collection(&[Feature::new(pair.clone())]);
        assert_eq!(
            text,
            "GEOMETRYCOLLECTION (GEOMETRYCOLLECTION (POINT (1 2), POINT (3 4)))"
        );

        let features = read_collection(&text).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].geometry, Some(pair));
    }

    #[test]
    fn test_collection_write_then_read_keeps_feature_count() {
        let features = vec![
            Feature::new(Geometry::GeometryCollection(vec![Geometry::Point(Coord::new(
                0.0, 0.0,
            ))])),
            Feature::default(),
            Feature::new(Geometry::LineString(vec![
                Coord::new(0.0, 0.0),
                Coord::new(1.0, 1.0),
            ])),
        ];
        let reread = read_collection(&write_collection(&features)).unwrap();
        let shapes: Vec<_> = reread.iter().map(|f| f.geometry.clone()).collect();
        let expected: Vec<_> = features.iter().map(|f| f.geometry.clone()).collect();
        assert_eq!(shapes, expected);
    }

    #[test]
    fn test_write_elements_flattens() {
        let features = vec![
            Feature::new(Geometry::GeometryCollection(vec![
                Geometry::Point(Coord::new(1.0, 2.0)),
                Geometry::Point(Coord::new(3.0, 4.0)),
            ])),
            Feature::new(Geometry::LineString(vec![
                Coord::new(0.0, 0.0),
                Coord::new(1.0, 1.0),
            ])),
        ];
        assert_eq!(
            write_elements(&features),
            "POINT (1 2)\n\nPOINT (3 4)\n\nLINESTRING (0 0, 1 1)"
        );
        assert_eq!(write_elements(&[]), "");
        assert_eq!(write_elements(&[Feature::default()]), "POINT EMPTY");
    }
}
