//! Map binding
//!
//! Keeps a renderer's live feature set and the store's GeoJSON buffer in
//! step, in both directions, without feedback loops:
//! - text to renderer: only when the text (or projection) differs from
//!   what was last applied, and without a camera refit when the renderer
//!   itself produced the update;
//! - renderer to text: only when the re-encoded features differ from the
//!   buffer, tagged `UpdateOrigin::FromRenderer`.

use geoforge_core::{features_extent, Extent, Feature, UpdateOrigin};
use geoforge_settings::MapSettings;
use tracing::{debug, warn};

use crate::store::SyncStore;

/// Options for fitting the view to an extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Padding in pixels: top, right, bottom, left
    pub padding: [f64; 4],
    pub duration_ms: u64,
    pub max_zoom: f64,
}

impl FitOptions {
    /// Fit used after a document change
    pub fn from_settings(map: &MapSettings) -> Self {
        Self {
            padding: [map.padding; 4],
            duration_ms: map.duration_ms,
            max_zoom: map.max_zoom,
        }
    }

    /// Fit used when previewing an analysis result
    pub fn for_analysis(map: &MapSettings) -> Self {
        Self {
            duration_ms: map.analysis_duration_ms,
            ..Self::from_settings(map)
        }
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::from_settings(&MapSettings::default())
    }
}

/// Change notifications buffered by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererEvent {
    Added,
    Modified,
    Removed,
}

/// The rendering surface the binding drives
///
/// Features are exchanged in the working CRS.
pub trait Renderer {
    /// Replace the entire feature set
    fn replace_features(&mut self, features: Vec<Feature>);

    /// Current feature set
    fn features(&self) -> &[Feature];

    /// Drain change events raised since the last call
    fn take_events(&mut self) -> Vec<RendererEvent>;

    /// Move the camera to show `extent`
    fn fit_view(&mut self, extent: Extent, options: FitOptions);

    /// Show features on a separate, non-editable layer
    fn show_preview(&mut self, _features: &[Feature]) {}

    /// Remove the preview layer
    fn clear_preview(&mut self) {}
}

/// Result of pushing the document into the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Text matched what was last applied
    Unchanged,
    /// The renderer now shows `count` features
    Applied { count: usize, fitted: bool },
    /// The text did not decode and the renderer was cleared
    Cleared,
}

/// Sets the suppress flag for as long as it lives
struct SuppressGuard<'a>(&'a mut bool);

impl<'a> SuppressGuard<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for SuppressGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Two-way binding between a store and a renderer
#[derive(Debug, Default)]
pub struct MapBinding {
    /// Trimmed text and projection last pushed to (or read from) the renderer
    last_applied: Option<(String, String)>,
    suppress_sync: bool,
    fit: FitOptions,
}

impl MapBinding {
    pub fn new(fit: FitOptions) -> Self {
        Self {
            fit,
            ..Self::default()
        }
    }

    /// True while a programmatic replace is in progress
    pub fn is_suppressed(&self) -> bool {
        self.suppress_sync
    }

    /// Text and projection most recently synchronized
    pub fn last_applied(&self) -> Option<(&str, &str)> {
        self.last_applied
            .as_ref()
            .map(|(text, projection)| (text.as_str(), projection.as_str()))
    }

    fn is_last_applied(&self, text: &str, projection: &str) -> bool {
        matches!(&self.last_applied, Some((t, p)) if t == text && p == projection)
    }

    /// Push the store's GeoJSON into the renderer
    pub fn apply_document<R: Renderer + ?Sized>(
        &mut self,
        store: &SyncStore,
        renderer: &mut R,
        origin: UpdateOrigin,
    ) -> ApplyOutcome {
        let text = store.geojson_text().trim();
        let projection = store.projection();
        if self.is_last_applied(text, projection) {
            debug!("Renderer already shows this text");
            return ApplyOutcome::Unchanged;
        }

        let decoded = store.codec().decode_geojson(text, projection);
        let cleared = decoded.is_err();
        let features = decoded.unwrap_or_else(|err| {
            warn!(kind = err.kind(), "Clearing renderer: {}", err);
            Vec::new()
        });
        let count = features.len();
        let extent = features_extent(&features);

        self.replace_suppressed(renderer, features);
        self.last_applied = Some((text.to_string(), projection.to_string()));

        if cleared {
            return ApplyOutcome::Cleared;
        }

        let fitted = match extent {
            Some(extent) if !origin.is_renderer() && count > 0 => {
                renderer.fit_view(extent, self.fit);
                true
            }
            _ => false,
        };
        debug!(count, fitted, "Applied document to renderer");
        ApplyOutcome::Applied { count, fitted }
    }

    /// Replace renderer features with syncing suppressed, discarding echoes
    fn replace_suppressed<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        features: Vec<Feature>,
    ) {
        let _guard = SuppressGuard::new(&mut self.suppress_sync);
        renderer.clear_preview();
        renderer.replace_features(features);
        let echoes = renderer.take_events();
        if !echoes.is_empty() {
            debug!(count = echoes.len(), "Discarded renderer echo events");
        }
    }

    /// Write the renderer's features back into the store
    ///
    /// Returns true when the store was updated.
    pub fn handle_renderer_event<R: Renderer + ?Sized>(
        &mut self,
        event: RendererEvent,
        store: &mut SyncStore,
        renderer: &R,
    ) -> bool {
        if self.suppress_sync {
            debug!(?event, "Ignoring renderer event during replace");
            return false;
        }

        let encoded = store
            .codec()
            .encode_geojson(renderer.features(), store.projection(), store.mode());
        let text = match encoded {
            Ok(text) => text,
            Err(err) => {
                warn!(kind = err.kind(), "Cannot encode renderer features: {}", err);
                return false;
            }
        };
        if text == store.geojson_text() {
            return false;
        }

        self.last_applied = Some((text.trim().to_string(), store.projection().to_string()));
        store.set_geojson_text_from(&text, UpdateOrigin::FromRenderer);
        debug!(?event, "Wrote renderer features back to the store");
        true
    }
}
