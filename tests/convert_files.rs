use std::fs;

use geoforge::{Config, Conversion, TextFormat, WktDisplayMode};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_geojson_file_to_wkt() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "point.geojson",
        r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{}}"#,
    );
    let output = Conversion::new(input, TextFormat::Wkt)
        .run(Config::default())
        .unwrap();
    assert_eq!(output, "POINT (1 2)");
}

#[test]
fn test_wkt_file_to_geojson_in_mercator() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "origin.wkt", "POINT (0 0)");
    let mut conversion = Conversion::new(input, TextFormat::GeoJson);
    conversion.target_projection = Some("EPSG:3857".to_string());

    let output = conversion.run(Config::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["type"], "FeatureCollection");
    assert_eq!(
        value["features"][0]["geometry"]["coordinates"],
        serde_json::json!([0, 0])
    );
}

#[test]
fn test_elements_layout() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "two.json",
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[3,4]},"properties":{}}
        ]}"#,
    );
    let mut conversion = Conversion::new(input, TextFormat::Wkt);
    conversion.wkt_display_mode = Some(WktDisplayMode::Elements);
    assert_eq!(
        conversion.run(Config::default()).unwrap(),
        "POINT (1 2)\n\nPOINT (3 4)"
    );
}

#[test]
fn test_invalid_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bad.geojson", "{ nope");
    assert!(Conversion::new(input, TextFormat::Wkt)
        .run(Config::default())
        .is_err());

    let input = write(&dir, "bad.wkt", "POINT (1");
    assert!(Conversion::new(input, TextFormat::GeoJson)
        .run(Config::default())
        .is_err());
}

#[test]
fn test_unknown_projection_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "p.wkt", "POINT (1 2)");
    let mut conversion = Conversion::new(input, TextFormat::GeoJson);
    conversion.target_projection = Some("EPSG:1".to_string());
    let err = conversion.run(Config::default()).unwrap_err();
    assert!(err.to_string().contains("EPSG:1"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = Conversion::new(dir.path().join("absent.geojson"), TextFormat::Wkt)
        .run(Config::default())
        .unwrap_err();
    assert!(err.to_string().contains("Cannot read"));
}
