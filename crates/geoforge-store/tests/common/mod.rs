#![allow(dead_code)]

use geoforge_core::{Coord, Extent, Feature, Geometry};
use geoforge_store::{FitOptions, Renderer, RendererEvent};

/// Renderer double that records every call
///
/// Like a real map source it raises events for its own programmatic
/// changes, which the binding has to discard.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub features: Vec<Feature>,
    pub events: Vec<RendererEvent>,
    pub replace_count: usize,
    pub fits: Vec<(Extent, FitOptions)>,
    pub previews: Vec<Vec<Feature>>,
    pub preview_clears: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user dragging the first position of feature `index`
    pub fn drag(&mut self, index: usize, to: Coord) {
        if let Some(Some(geometry)) = self.features.get_mut(index).map(|f| f.geometry.as_mut()) {
            match geometry {
                Geometry::Point(c) => *c = to,
                Geometry::LineString(cs) | Geometry::MultiPoint(cs) => {
                    if let Some(first) = cs.first_mut() {
                        *first = to;
                    }
                }
                _ => {}
            }
        }
        self.events.push(RendererEvent::Modified);
    }

    /// Simulate the user drawing a new feature
    pub fn draw(&mut self, feature: Feature) {
        self.features.push(feature);
        self.events.push(RendererEvent::Added);
    }

    /// Simulate the user deleting feature `index`
    pub fn delete(&mut self, index: usize) {
        self.features.remove(index);
        self.events.push(RendererEvent::Removed);
    }
}

impl Renderer for RecordingRenderer {
    fn replace_features(&mut self, features: Vec<Feature>) {
        self.replace_count += 1;
        if !self.features.is_empty() {
            self.events.push(RendererEvent::Removed);
        }
        if !features.is_empty() {
            self.events.push(RendererEvent::Added);
        }
        self.features = features;
    }

    fn features(&self) -> &[Feature] {
        &self.features
    }

    fn take_events(&mut self) -> Vec<RendererEvent> {
        std::mem::take(&mut self.events)
    }

    fn fit_view(&mut self, extent: Extent, options: FitOptions) {
        self.fits.push((extent, options));
    }

    fn show_preview(&mut self, features: &[Feature]) {
        self.previews.push(features.to_vec());
    }

    fn clear_preview(&mut self) {
        self.preview_clears += 1;
    }
}

pub const POINT_FEATURE: &str =
    r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{}}"#;

pub const TWO_POINTS: &str = r#"{"type":"FeatureCollection","features":[
  {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{}},
  {"type":"Feature","geometry":{"type":"Point","coordinates":[10,0]},"properties":{}}
]}"#;

pub fn assert_close(a: f64, b: f64, eps: f64) {
    let diff = (a - b).abs();
    assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
}
