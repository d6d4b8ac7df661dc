mod common;

use std::sync::Arc;

use common::{assert_close, RecordingRenderer, POINT_FEATURE, TWO_POINTS};
use geoforge_core::{ProjectionRegistry, SyncError};
use geoforge_settings::Config;
use geoforge_store::{
    AnalysisError, AnalysisTool, CenterTool, EditingSession, MidpointTool, SyncStore,
};
use serde_json::{json, Value};

fn session_with(text: &str) -> EditingSession<RecordingRenderer> {
    let mut store = SyncStore::default();
    store.set_geojson_text(text);
    EditingSession::new(store, RecordingRenderer::new())
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

/// Returns a fixed document regardless of input
struct FixedTool(Value);

impl AnalysisTool for FixedTool {
    fn name(&self) -> &str {
        "fixed"
    }

    fn run(&self, _input: &Value) -> Result<Value, AnalysisError> {
        Ok(self.0.clone())
    }
}

fn points(n: usize) -> Value {
    let features: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [i as f64 * 0.01, 0.0]},
                "properties": {"i": i},
            })
        })
        .collect();
    json!({"type": "FeatureCollection", "features": features})
}

#[test]
fn test_midpoint_of_two_points() {
    let mut session = session_with(TWO_POINTS);
    let result = session.run_analysis(&MidpointTool).unwrap();
    assert_eq!(result.tool, "Midpoint");
    assert_eq!(result.feature_count, 1);

    let value = parse(&result.text);
    assert_eq!(value["type"], "Feature");
    let coords = &value["geometry"]["coordinates"];
    assert_close(coords[0].as_f64().unwrap(), 5.0, 1e-9);
    assert_close(coords[1].as_f64().unwrap(), 0.0, 1e-9);

    // Previewed on its own layer, the document is untouched
    let renderer = session.renderer();
    assert_eq!(renderer.previews.len(), 1);
    assert_eq!(renderer.fits.len(), 2);
    assert_eq!(renderer.fits[1].1.duration_ms, 350);
    assert_eq!(parse(session.store().geojson_text()), parse(TWO_POINTS));
}

#[test]
fn test_analysis_in_projected_document() {
    let mut store = SyncStore::default();
    store.set_geojson_text(TWO_POINTS);
    store.set_projection("EPSG:3857");
    let result = store.run_analysis(&MidpointTool).unwrap();

    // Result comes back in the active projection
    let value = parse(&result.text);
    assert_close(
        value["geometry"]["coordinates"][0].as_f64().unwrap(),
        556_597.453_966_367_8,
        1e-3,
    );
}

#[test]
fn test_replace_runs_on_next_tick() {
    let mut session = session_with(TWO_POINTS);
    let result = session.run_analysis(&MidpointTool).unwrap();

    session.queue_replace(result.clone());
    assert!(session.is_processing());
    assert_eq!(parse(session.store().geojson_text()), parse(TWO_POINTS));

    let outcomes = session.run_deferred();
    assert!(!session.is_processing());
    assert_eq!(outcomes.len(), 1);
    let applied = outcomes[0].as_ref().unwrap();
    assert_eq!(applied.feature_count, 1);
    assert!(!applied.large);

    assert_eq!(session.store().geojson_text(), result.text);
    assert_eq!(session.store().wkt_text(), "POINT (5 0)");
    assert_eq!(session.renderer().features.len(), 1);
}

#[test]
fn test_merge_appends_features() {
    let mut session = session_with(TWO_POINTS);
    let result = session.run_analysis(&CenterTool).unwrap();
    session.queue_merge(result);
    let outcomes = session.run_deferred();
    assert_eq!(outcomes[0].as_ref().unwrap().feature_count, 3);

    let value = parse(session.store().geojson_text());
    let features = value["features"].as_array().unwrap();
    assert_eq!(features.len(), 3);
    assert_eq!(features[2]["geometry"]["coordinates"], json!([5, 0]));
    assert_eq!(session.renderer().features.len(), 3);
}

#[test]
fn test_merge_keeps_properties_and_ids() {
    let mut store = SyncStore::default();
    store.set_geojson_text(
        r#"{"type":"Feature","id":7,"geometry":{"type":"Point","coordinates":[1,1]},"properties":{"name":"keep"}}"#,
    );
    let tool = FixedTool(json!({"type": "Point", "coordinates": [2, 2]}));
    let result = store.run_analysis(&tool).unwrap();
    store.merge_result(&result).unwrap();

    let value = parse(store.geojson_text());
    assert_eq!(value["type"], "FeatureCollection");
    assert_eq!(value["features"][0]["id"], 7);
    assert_eq!(value["features"][0]["properties"]["name"], "keep");
    assert_eq!(value["features"][1]["geometry"]["coordinates"], json!([2, 2]));
}

#[test]
fn test_deferred_actions_run_in_order() {
    let mut session = session_with(TWO_POINTS);
    let midpoint = session.run_analysis(&MidpointTool).unwrap();
    let center = session.run_analysis(&CenterTool).unwrap();
    session.queue_replace(midpoint);
    session.queue_merge(center);
    let outcomes = session.run_deferred();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[1].as_ref().unwrap().feature_count, 2);
    assert!(!session.is_processing());
}

#[test]
fn test_empty_document_is_rejected() {
    let mut store = SyncStore::default();
    assert_eq!(
        store.run_analysis(&MidpointTool).unwrap_err(),
        AnalysisError::NoFeatures
    );
    store.set_geojson_text("   ");
    assert_eq!(
        store.run_analysis(&MidpointTool).unwrap_err(),
        AnalysisError::NoInput
    );
    store.set_geojson_text("{ nope");
    assert!(matches!(
        store.run_analysis(&MidpointTool),
        Err(AnalysisError::InvalidInput(SyncError::InvalidSyntax { .. }))
    ));
}

#[test]
fn test_tool_errors_surface() {
    let store = {
        let mut store = SyncStore::default();
        store.set_geojson_text(POINT_FEATURE);
        store
    };
    assert!(matches!(
        store.run_analysis(&MidpointTool),
        Err(AnalysisError::Tool { .. })
    ));

    let empty = FixedTool(json!({"type": "FeatureCollection", "features": []}));
    assert!(matches!(
        store.run_analysis(&empty),
        Err(AnalysisError::Sync(SyncError::EmptyResult { .. }))
    ));

    let garbage = FixedTool(json!({"type": "Circle"}));
    assert!(matches!(
        store.run_analysis(&garbage),
        Err(AnalysisError::InvalidOutput(_))
    ));
}

#[test]
fn test_large_result_is_flagged() {
    let mut config = Config::default();
    config.sync.large_result_warning = 5;
    let mut store = SyncStore::new(config, Arc::new(ProjectionRegistry::with_defaults()));
    store.set_geojson_text(POINT_FEATURE);

    let result = store.run_analysis(&FixedTool(points(6))).unwrap();
    assert_eq!(result.feature_count, 6);
    let applied = store.replace_with_result(&result);
    assert!(applied.large);
    assert!(applied.report.is_clean());

    let small = store.run_analysis(&FixedTool(points(2))).unwrap();
    assert!(!store.replace_with_result(&small).large);
}
