use geoforge_core::{Coord, ProjectionRegistry};
use proptest::prelude::*;

const EPSILON_DEGREES: f64 = 1e-6;

fn round_trip(registry: &ProjectionRegistry, c: Coord, via: &str) -> Coord {
    let projected = registry.reproject(c, "EPSG:4326", via).unwrap();
    registry.reproject(projected, via, "EPSG:4326").unwrap()
}

#[test]
fn test_web_mercator_origin() {
    let registry = ProjectionRegistry::with_defaults();
    let c = registry
        .reproject(Coord::new(0.0, 0.0), "EPSG:4326", "EPSG:3857")
        .unwrap();
    assert!(c.x.abs() < 1e-9);
    assert!(c.y.abs() < 1e-9);
}

#[test]
fn test_nad83_is_coincident_with_wgs84() {
    let registry = ProjectionRegistry::with_defaults();
    let c = registry
        .reproject(Coord::new(-77.0365, 38.8977), "EPSG:4326", "EPSG:4269")
        .unwrap();
    assert!((c.x + 77.0365).abs() < 1e-12);
    assert!((c.y - 38.8977).abs() < 1e-12);
}

#[test]
fn test_lambert93_to_web_mercator_chain() {
    let registry = ProjectionRegistry::with_defaults();
    let paris = Coord::new(2.3499, 48.853);
    let lambert = registry.reproject(paris, "EPSG:4326", "EPSG:2154").unwrap();
    let merc = registry.reproject(lambert, "EPSG:2154", "EPSG:3857").unwrap();
    let back = registry.reproject(merc, "EPSG:3857", "EPSG:4326").unwrap();
    assert!((back.x - paris.x).abs() < EPSILON_DEGREES);
    assert!((back.y - paris.y).abs() < EPSILON_DEGREES);
}

proptest! {
    #[test]
    fn prop_web_mercator_round_trip(lon in -180.0f64..180.0, lat in -85.0f64..85.0) {
        let registry = ProjectionRegistry::with_defaults();
        let back = round_trip(&registry, Coord::new(lon, lat), "EPSG:3857");
        prop_assert!((back.x - lon).abs() < EPSILON_DEGREES);
        prop_assert!((back.y - lat).abs() < EPSILON_DEGREES);
    }

    #[test]
    fn prop_lambert93_round_trip(lon in -10.0f64..15.0, lat in 35.0f64..60.0) {
        let registry = ProjectionRegistry::with_defaults();
        let back = round_trip(&registry, Coord::new(lon, lat), "EPSG:2154");
        prop_assert!((back.x - lon).abs() < EPSILON_DEGREES);
        prop_assert!((back.y - lat).abs() < EPSILON_DEGREES);
    }
}
