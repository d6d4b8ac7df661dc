//! Document mode detection
//!
//! Only the top-level `type` member is inspected; the document is not
//! validated as GeoJSON.

use geoforge_core::DocumentMode;
use serde_json::Value;

/// Detect how a GeoJSON document is shaped
///
/// Returns `None` when the text does not parse or carries no string
/// `type`. Callers keep the previously known mode in that case.
pub fn detect(text: &str) -> Option<DocumentMode> {
    let value: Value = serde_json::from_str(text).ok()?;
    detect_value(&value)
}

/// Detect the mode of an already parsed document
pub fn detect_value(value: &Value) -> Option<DocumentMode> {
    match value.as_object()?.get("type")?.as_str()? {
        "FeatureCollection" => Some(DocumentMode::FeatureCollection),
        "Feature" => Some(DocumentMode::Feature),
        _ => Some(DocumentMode::Geometry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(
            detect(r#"{"type":"FeatureCollection","features":[]}"#),
            Some(DocumentMode::FeatureCollection)
        );
        assert_eq!(
            detect(r#"{"type":"Feature","geometry":null}"#),
            Some(DocumentMode::Feature)
        );
        assert_eq!(
            detect(r#"{"type":"Point","coordinates":[1,2]}"#),
            Some(DocumentMode::Geometry)
        );
        // Any other string counts as a bare geometry
        assert_eq!(detect(r#"{"type":"Banana"}"#), Some(DocumentMode::Geometry));
    }

    #[test]
    fn test_detect_unknown() {
        for text in [
            "",
            "{not json",
            "[1, 2]",
            r#"{"features":[]}"#,
            r#"{"type":7}"#,
            r#""Feature""#,
        ] {
            assert_eq!(detect(text), None, "{text:?}");
        }
    }
}
