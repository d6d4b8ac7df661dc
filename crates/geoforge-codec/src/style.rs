//! Style metadata preservation
//!
//! Style keys are simplestyle-like presentation properties. They live in
//! the canonical document but are hidden from the display copy of the
//! GeoJSON buffer, and are carried forward when a feature is rewritten
//! from a source that does not know about them (the display copy, WKT).

use geoforge_core::{Feature, GeometryFamily};
use serde_json::{json, Map, Value};

use crate::geojson;

/// Property keys treated as presentation styling
pub const STYLE_KEYS: [&str; 8] = [
    "marker-color",
    "marker-size",
    "stroke",
    "stroke-width",
    "stroke-opacity",
    "stroke-dasharray",
    "fill",
    "fill-opacity",
];

/// True when `key` is a style key
pub fn is_style_key(key: &str) -> bool {
    STYLE_KEYS.contains(&key)
}

/// The style subset of a property map
pub fn extract_style(properties: &Map<String, Value>) -> Map<String, Value> {
    properties
        .iter()
        .filter(|(k, _)| is_style_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// The property map without style keys
pub fn strip_style(properties: &Map<String, Value>) -> Map<String, Value> {
    properties
        .iter()
        .filter(|(k, _)| !is_style_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Copy style keys from `old_style` that `properties` does not set
pub fn merge_style(
    mut properties: Map<String, Value>,
    old_style: &Map<String, Value>,
) -> Map<String, Value> {
    for (key, value) in old_style {
        if is_style_key(key) && !properties.contains_key(key) {
            properties.insert(key.clone(), value.clone());
        }
    }
    properties
}

/// Carry styles from `old` features onto `new` ones
///
/// A feature with an id is matched to the old feature with the same id;
/// otherwise, or when no old feature has that id, it is matched to the
/// old feature at the same position. Reordering features without ids
/// therefore moves styles with the position, not the feature.
pub fn merge_feature_styles(new: &mut [Feature], old: &[Feature]) {
    for (index, feature) in new.iter_mut().enumerate() {
        let by_id = feature
            .id
            .as_ref()
            .and_then(|id| old.iter().find(|o| o.id.as_ref() == Some(id)));
        let Some(counterpart) = by_id.or_else(|| old.get(index)) else {
            continue;
        };
        let style = extract_style(&counterpart.properties);
        if !style.is_empty() {
            let properties = std::mem::take(&mut feature.properties);
            feature.properties = merge_style(properties, &style);
        }
    }
}

fn strip_value(value: &mut Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    match object.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            if let Some(Value::Array(features)) = object.get_mut("features") {
                features.iter_mut().for_each(strip_value);
            }
        }
        Some("Feature") => {
            if let Some(Value::Object(properties)) = object.get_mut("properties") {
                properties.retain(|k, _| !is_style_key(k));
            }
        }
        _ => {}
    }
}

/// Display copy of a GeoJSON buffer with style keys removed
///
/// Text that is not valid JSON is returned verbatim so an in-progress
/// edit stays visible.
pub fn strip_style_text(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(mut value) => {
            strip_value(&mut value);
            geojson::to_pretty_text(&value)
        }
        Err(_) => text.to_string(),
    }
}

/// Default style for a geometry family
pub fn default_style(family: GeometryFamily) -> Map<String, Value> {
    let defaults = match family {
        GeometryFamily::Point => json!({
            "marker-color": "#22d3ee",
            "marker-size": 6,
            "stroke": "#0ea5e9",
            "stroke-width": 1.5,
        }),
        GeometryFamily::LineString => json!({
            "stroke": "#3b82f6",
            "stroke-width": 3,
            "stroke-opacity": 1,
            "stroke-dasharray": "none",
        }),
        GeometryFamily::Polygon => json!({
            "stroke": "#3b82f6",
            "stroke-width": 2,
            "stroke-opacity": 1,
            "fill": "#3b82f6",
            "fill-opacity": 0.3,
        }),
    };
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Effective style of a feature for a renderer
///
/// Features without geometry use the polygon defaults.
pub fn resolve_style(feature: &Feature) -> Map<String, Value> {
    let family = feature
        .geometry
        .as_ref()
        .map(|g| g.family())
        .unwrap_or(GeometryFamily::Polygon);
    let mut style = default_style(family);
    for (key, value) in extract_style(&feature.properties) {
        style.insert(key, value);
    }
    style
}

/// Dash pattern for a `stroke-dasharray` name; `None` means solid
pub fn dash_pattern(name: &str) -> Option<&'static [f64]> {
    match name {
        "dash" => Some(&[12.0, 8.0][..]),
        "dot" => Some(&[2.0, 6.0][..]),
        "dashdot" => Some(&[12.0, 6.0, 2.0, 6.0][..]),
        _ => None,
    }
}

/// Convert `#rrggbb` (or `#rgb`) plus an opacity into `rgba(r, g, b, a)`
pub fn hex_to_rgba(hex: &str, opacity: f64) -> Option<String> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some(format!(
        "rgba({}, {}, {}, {})",
        channel(0)?,
        channel(2)?,
        channel(4)?,
        opacity
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoforge_core::{Coord, FeatureId, Geometry};

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_extract_and_strip() {
        let p = props(json!({"name": "a", "stroke": "#ff0000", "fill-opacity": 0.5}));
        assert_eq!(
            extract_style(&p),
            props(json!({"stroke": "#ff0000", "fill-opacity": 0.5}))
        );
        assert_eq!(strip_style(&p), props(json!({"name": "a"})));
    }

    #[test]
    fn test_merge_style_does_not_override() {
        let merged = merge_style(
            props(json!({"stroke": "#00ff00"})),
            &props(json!({"stroke": "#ff0000", "fill": "#0000ff"})),
        );
        assert_eq!(merged["stroke"], "#00ff00");
        assert_eq!(merged["fill"], "#0000ff");
    }

    #[test]
    fn test_merge_feature_styles_by_id_then_index() {
        let point = Geometry::Point(Coord::new(0.0, 0.0));
        let old = vec![
            Feature::new(point.clone())
                .with_id(FeatureId::String("a".into()))
                .with_property("stroke", json!("#aaaaaa")),
            Feature::new(point.clone()).with_property("stroke", json!("#bbbbbb")),
        ];
        let mut new = vec![
            Feature::new(point.clone()),
            Feature::new(point.clone()).with_id(FeatureId::String("a".into())),
            Feature::new(point),
        ];
        merge_feature_styles(&mut new, &old);
        assert_eq!(new[0].properties["stroke"], "#aaaaaa");
        assert_eq!(new[1].properties["stroke"], "#aaaaaa");
        assert!(new[2].properties.is_empty());
    }

    #[test]
    fn test_strip_style_text() {
        let text = r##"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null,"properties":{"name":"x","stroke":"#ff0000"}}]}"##;
        let stripped = strip_style_text(text);
        assert!(!stripped.contains("stroke"));
        assert!(stripped.contains("\"name\": \"x\""));
        assert_eq!(strip_style_text("{not json"), "{not json");
    }

    #[test]
    fn test_resolve_style_defaults() {
        let line = Feature::new(Geometry::MultiLineString(vec![]))
            .with_property("stroke", json!("#ff0000"));
        let style = resolve_style(&line);
        assert_eq!(style["stroke"], "#ff0000");
        assert_eq!(style["stroke-width"], 3);
        assert_eq!(style["stroke-dasharray"], "none");

        let point = resolve_style(&Feature::new(Geometry::Point(Coord::new(0.0, 0.0))));
        assert_eq!(point["marker-color"], "#22d3ee");
        assert_eq!(resolve_style(&Feature::default())["fill-opacity"], 0.3);
    }

    #[test]
    fn test_hex_to_rgba() {
        assert_eq!(
            hex_to_rgba("#3b82f6", 0.3).as_deref(),
            Some("rgba(59, 130, 246, 0.3)")
        );
        assert_eq!(hex_to_rgba("fff", 1.0).as_deref(), Some("rgba(255, 255, 255, 1)"));
        assert_eq!(hex_to_rgba("#12", 1.0), None);
        assert_eq!(hex_to_rgba("#zzzzzz", 1.0), None);
        assert_eq!(dash_pattern("dot"), Some(&[2.0, 6.0][..]));
        assert_eq!(dash_pattern("none"), None);
    }
}
