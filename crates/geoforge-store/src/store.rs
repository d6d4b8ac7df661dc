//! Synchronization store
//!
//! Owns the canonical GeoJSON buffer, the derived WKT buffer and the
//! settings that govern how one is derived from the other. Every mutator
//! runs to completion and reports what it changed; conversion failures are
//! absorbed and leave the derived buffer at its last good value.

use std::sync::Arc;

use geoforge_codec::{geojson, mode, style, wkt, Codec, CodecOptions};
use geoforge_core::{
    Coord, DocumentBus, DocumentEvent, DocumentMode, EventFilter, FeatureList, ProjectionError,
    ProjectionRegistry, SubscriptionId, SyncError, TextFormat, UpdateOrigin, WktDisplayMode,
};
use geoforge_settings::{Config, SettingsResult};
use serde_json::Value;
use tracing::{debug, info, warn};

/// State of the WKT buffer relative to the GeoJSON buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivedView {
    /// WKT describes the current GeoJSON
    Current,
    /// The last conversion failed; WKT holds its last good value
    Frozen,
    /// The document is too large, WKT was not generated
    Skipped { length: usize, limit: usize },
}

/// The logical document: both text buffers plus how they are read
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    geojson_text: String,
    wkt_text: String,
    mode: DocumentMode,
    wkt_display_mode: WktDisplayMode,
    projection: String,
    wkt_view: DerivedView,
}

impl Document {
    pub fn geojson_text(&self) -> &str {
        &self.geojson_text
    }

    pub fn wkt_text(&self) -> &str {
        &self.wkt_text
    }

    pub fn mode(&self) -> DocumentMode {
        self.mode
    }

    pub fn wkt_display_mode(&self) -> WktDisplayMode {
        self.wkt_display_mode
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn wkt_view(&self) -> &DerivedView {
        &self.wkt_view
    }
}

/// What a mutator did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub geojson_changed: bool,
    pub wkt_changed: bool,
    pub mode_changed: bool,
    pub projection_changed: bool,
    /// Conversion failure absorbed by the store, if any
    pub error: Option<SyncError>,
}

impl SyncReport {
    /// True when nothing failed
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }

    /// True when any buffer or setting changed
    pub fn changed(&self) -> bool {
        self.geojson_changed || self.wkt_changed || self.mode_changed || self.projection_changed
    }

    pub(crate) fn absorb(&mut self, other: SyncReport) {
        self.geojson_changed |= other.geojson_changed;
        self.wkt_changed |= other.wkt_changed;
        self.mode_changed |= other.mode_changed;
        self.projection_changed |= other.projection_changed;
        if other.error.is_some() {
            self.error = other.error;
        }
    }
}

/// Synchronization store for one document session
pub struct SyncStore {
    pub(crate) document: Document,
    pub(crate) codec: Codec,
    pub(crate) config: Config,
    bus: DocumentBus,
    display_draft: Option<String>,
    cursor_location: Option<Coord>,
}

impl SyncStore {
    /// Create a store with an empty FeatureCollection
    pub fn new(config: Config, registry: Arc<ProjectionRegistry>) -> Self {
        let options = CodecOptions {
            policy: config.sync.parse_policy,
            decimals: Some(config.sync.coordinate_decimals),
        };
        let wkt_display_mode = config.sync.default_wkt_display_mode;
        let document = Document {
            geojson_text: geojson::to_pretty_text(&geojson::write_collection(&[])),
            wkt_text: wkt::write_document(&[], wkt_display_mode),
            mode: DocumentMode::FeatureCollection,
            wkt_display_mode,
            projection: config.sync.default_projection.clone(),
            wkt_view: DerivedView::Current,
        };
        Self {
            document,
            codec: Codec::with_options(registry, options),
            config,
            bus: DocumentBus::new(),
            display_draft: None,
            cursor_location: None,
        }
    }

    /// Create a store whose registry includes the configured projections
    pub fn from_config(config: Config) -> SettingsResult<Self> {
        let registry = config.build_registry()?;
        Ok(Self::new(config, Arc::new(registry)))
    }

    /// Use an existing bus, e.g. one shared with other views
    pub fn with_bus(mut self, bus: DocumentBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn geojson_text(&self) -> &str {
        &self.document.geojson_text
    }

    pub fn wkt_text(&self) -> &str {
        &self.document.wkt_text
    }

    pub fn mode(&self) -> DocumentMode {
        self.document.mode
    }

    pub fn wkt_display_mode(&self) -> WktDisplayMode {
        self.document.wkt_display_mode
    }

    pub fn projection(&self) -> &str {
        &self.document.projection
    }

    pub fn wkt_view(&self) -> &DerivedView {
        &self.document.wkt_view
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bus(&self) -> &DocumentBus {
        &self.bus
    }

    /// `(code, name)` pairs of every known projection
    pub fn projections(&self) -> Vec<(String, String)> {
        self.codec.registry().catalog()
    }

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&DocumentEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(filter, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Map pointer position in the active projection
    pub fn cursor_location(&self) -> Option<Coord> {
        self.cursor_location
    }

    pub fn set_cursor_location(&mut self, location: Option<Coord>) {
        self.cursor_location = location;
    }

    /// Canonical features in the working CRS
    pub fn features(&self) -> Result<FeatureList, SyncError> {
        self.codec
            .decode_geojson(&self.document.geojson_text, &self.document.projection)
    }

    /// Replace the GeoJSON buffer from a text editor or any other caller
    pub fn set_geojson_text(&mut self, text: &str) -> SyncReport {
        self.set_geojson_text_from(text, UpdateOrigin::External)
    }

    /// Replace the GeoJSON buffer, tagging where the update came from
    ///
    /// The text is stored verbatim even when it does not parse; the WKT
    /// buffer is then left untouched.
    pub fn set_geojson_text_from(&mut self, text: &str, origin: UpdateOrigin) -> SyncReport {
        let mut report = SyncReport::default();
        self.display_draft = None;

        if let Some(detected) = mode::detect(text) {
            self.update_mode(detected, &mut report);
        }

        if self.document.geojson_text != text {
            self.document.geojson_text = text.to_string();
            report.geojson_changed = true;
            self.publish(DocumentEvent::GeojsonChanged {
                origin,
                length: text.chars().count(),
            });
        }

        self.refresh_wkt(origin, &mut report);
        report
    }

    /// Replace the WKT buffer and rewrite GeoJSON from it
    ///
    /// Style keys of the previous features are carried onto the decoded
    /// ones by position. On a decode failure GeoJSON is left untouched.
    pub fn set_wkt_text(&mut self, text: &str) -> SyncReport {
        let mut report = SyncReport::default();
        if self.document.wkt_text != text {
            self.document.wkt_text = text.to_string();
            report.wkt_changed = true;
            self.publish(DocumentEvent::WktChanged {
                origin: UpdateOrigin::External,
            });
        }

        let decoded = self.codec.decode_wkt(
            text,
            self.document.wkt_display_mode,
            &self.document.projection,
        );
        let mut features = match decoded {
            Ok(features) => features,
            Err(err) => {
                self.document.wkt_view = DerivedView::Frozen;
                self.fail(TextFormat::Wkt, err, &mut report);
                return report;
            }
        };

        if let Ok(previous) = self.features() {
            style::merge_feature_styles(&mut features, &previous);
        }

        match self.codec.encode_geojson(
            &features,
            &self.document.projection,
            self.document.mode,
        ) {
            Ok(geojson) => {
                self.display_draft = None;
                self.document.wkt_view = DerivedView::Current;
                if geojson != self.document.geojson_text {
                    let length = geojson.chars().count();
                    self.document.geojson_text = geojson;
                    report.geojson_changed = true;
                    self.publish(DocumentEvent::GeojsonChanged {
                        origin: UpdateOrigin::External,
                        length,
                    });
                }
            }
            Err(err) => self.fail(TextFormat::Wkt, err, &mut report),
        }
        report
    }

    /// Change the WKT layout and re-derive WKT from GeoJSON
    pub fn set_wkt_display_mode(&mut self, wkt_mode: WktDisplayMode) -> SyncReport {
        let mut report = SyncReport::default();
        if self.document.wkt_display_mode != wkt_mode {
            self.document.wkt_display_mode = wkt_mode;
            self.publish(DocumentEvent::WktDisplayModeChanged { mode: wkt_mode });
        }
        self.refresh_wkt(UpdateOrigin::External, &mut report);
        report
    }

    /// Move the document to another projection
    ///
    /// An unknown projection is rejected and nothing changes. When the
    /// GeoJSON cannot be reprojected it is left as is and WKT is frozen.
    pub fn set_projection(&mut self, projection: &str) -> SyncReport {
        let mut report = SyncReport::default();
        if projection == self.document.projection {
            return report;
        }
        if !self.codec.registry().contains(projection) {
            let err = SyncError::Projection(ProjectionError::UnknownCrs {
                id: projection.to_string(),
            });
            self.fail(TextFormat::GeoJson, err, &mut report);
            return report;
        }

        let reprojected = self.features().and_then(|features| {
            self.codec
                .encode_geojson(&features, projection, self.document.mode)
        });

        let from = std::mem::replace(&mut self.document.projection, projection.to_string());
        report.projection_changed = true;
        self.display_draft = None;
        info!("Projection changed {} -> {}", from, projection);
        self.publish(DocumentEvent::ProjectionChanged {
            from,
            to: projection.to_string(),
        });

        match reprojected {
            Ok(geojson) => {
                if geojson != self.document.geojson_text {
                    let length = geojson.chars().count();
                    self.document.geojson_text = geojson;
                    report.geojson_changed = true;
                    self.publish(DocumentEvent::GeojsonChanged {
                        origin: UpdateOrigin::External,
                        length,
                    });
                }
                self.refresh_wkt(UpdateOrigin::External, &mut report);
            }
            Err(err) => {
                self.document.wkt_view = DerivedView::Frozen;
                self.fail(TextFormat::GeoJson, err, &mut report);
            }
        }
        report
    }

    /// GeoJSON as shown in the editor: style keys stripped
    ///
    /// While an invalid display edit is pending it is returned instead.
    pub fn display_geojson_text(&self) -> String {
        match &self.display_draft {
            Some(draft) => draft.clone(),
            None => style::strip_style_text(&self.document.geojson_text),
        }
    }

    /// Pending display edit that did not parse
    pub fn display_draft(&self) -> Option<&str> {
        self.display_draft.as_deref()
    }

    /// Write an edit of the display copy back into the canonical buffer
    ///
    /// Style keys of the previous features are merged back in, matched by
    /// id and otherwise by position. Text that does not decode is kept as
    /// a draft and the canonical buffer is left alone.
    pub fn apply_display_edit(&mut self, text: &str) -> SyncReport {
        let mut report = SyncReport::default();
        let parsed = if text.trim().is_empty() {
            Ok(None)
        } else {
            geojson::parse_text(text).map(Some)
        };

        let decoded = parsed.and_then(|value| match value {
            Some(value) => self
                .codec
                .decode_geojson_value(&value, &self.document.projection)
                .map(|features| (mode::detect_value(&value), features)),
            None => Ok((None, Vec::new())),
        });

        let (detected, mut features) = match decoded {
            Ok(decoded) => decoded,
            Err(err) => {
                self.display_draft = Some(text.to_string());
                self.fail(TextFormat::GeoJson, err, &mut report);
                return report;
            }
        };

        if let Ok(previous) = self.features() {
            style::merge_feature_styles(&mut features, &previous);
        }
        let target_mode = detected.unwrap_or(self.document.mode);
        match self
            .codec
            .encode_geojson(&features, &self.document.projection, target_mode)
        {
            Ok(canonical) => report.absorb(self.set_geojson_text(&canonical)),
            Err(err) => {
                self.display_draft = Some(text.to_string());
                self.fail(TextFormat::GeoJson, err, &mut report);
            }
        }
        report
    }

    fn update_mode(&mut self, detected: DocumentMode, report: &mut SyncReport) {
        if detected != self.document.mode {
            let from = std::mem::replace(&mut self.document.mode, detected);
            report.mode_changed = true;
            debug!("Document mode {} -> {}", from, detected);
            self.publish(DocumentEvent::ModeChanged { from, to: detected });
        }
    }

    /// Regenerate WKT from the current GeoJSON buffer
    fn refresh_wkt(&mut self, origin: UpdateOrigin, report: &mut SyncReport) {
        let length = self.document.geojson_text.chars().count();
        let limit = self.config.sync.large_document_threshold;
        if length > limit {
            warn!(length, limit, "Document too large, skipping WKT");
            if !self.document.wkt_text.is_empty() {
                self.document.wkt_text.clear();
                report.wkt_changed = true;
                self.publish(DocumentEvent::WktChanged { origin });
            }
            self.document.wkt_view = DerivedView::Skipped { length, limit };
            self.publish(DocumentEvent::DerivedViewSkipped { length, limit });
            report.error = Some(SyncError::ThresholdExceeded { length, limit });
            return;
        }

        let encoded = self.features().and_then(|features| {
            self.codec.encode_wkt(
                &features,
                self.document.wkt_display_mode,
                &self.document.projection,
            )
        });
        match encoded {
            Ok(text) => {
                self.document.wkt_view = DerivedView::Current;
                if text != self.document.wkt_text {
                    self.document.wkt_text = text;
                    report.wkt_changed = true;
                    self.publish(DocumentEvent::WktChanged { origin });
                }
            }
            Err(err) => {
                self.document.wkt_view = DerivedView::Frozen;
                self.fail(TextFormat::GeoJson, err, report);
            }
        }
    }

    fn fail(&self, format: TextFormat, err: SyncError, report: &mut SyncReport) {
        warn!(kind = err.kind(), "{} conversion failed: {}", format, err);
        self.publish(DocumentEvent::ConversionFailed {
            format,
            kind: err.kind().to_string(),
            message: err.to_string(),
        });
        report.error = Some(err);
    }

    pub(crate) fn publish(&self, event: DocumentEvent) {
        debug!("{}", event.description());
        self.bus.publish(event);
    }

    /// Parse the canonical buffer as JSON
    pub(crate) fn geojson_value(&self) -> Result<Value, SyncError> {
        geojson::parse_text(&self.document.geojson_text)
    }
}

impl Default for SyncStore {
    fn default() -> Self {
        Self::new(
            Config::default(),
            Arc::new(ProjectionRegistry::with_defaults()),
        )
    }
}

impl std::fmt::Debug for SyncStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncStore")
            .field("document", &self.document)
            .field("display_draft", &self.display_draft)
            .field("cursor_location", &self.cursor_location)
            .finish_non_exhaustive()
    }
}
