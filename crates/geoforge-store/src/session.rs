//! Editing session
//!
//! Owns one store, its map binding and the renderer, and routes every
//! mutation through both so the renderer always follows the document.
//! Replace and merge of analysis results are queued and run on the next
//! `run_deferred` call, which lets a caller paint a busy indicator first.

use std::collections::VecDeque;

use geoforge_core::{features_extent, UpdateOrigin, WktDisplayMode};
use tracing::debug;

use crate::analysis::{AnalysisError, AnalysisResult, AnalysisTool, ApplyResult};
use crate::map_binding::{ApplyOutcome, FitOptions, MapBinding, Renderer};
use crate::store::{SyncReport, SyncStore};

/// Action queued for the next tick
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    Replace(AnalysisResult),
    Merge(AnalysisResult),
}

pub struct EditingSession<R: Renderer> {
    store: SyncStore,
    binding: MapBinding,
    renderer: R,
    pending: VecDeque<DeferredAction>,
}

impl<R: Renderer> EditingSession<R> {
    /// Bind `renderer` to `store` and show the current document
    pub fn new(store: SyncStore, renderer: R) -> Self {
        let binding = MapBinding::new(FitOptions::from_settings(&store.config().map));
        let mut session = Self {
            store,
            binding,
            renderer,
            pending: VecDeque::new(),
        };
        session.sync_renderer(UpdateOrigin::External);
        session
    }

    pub fn store(&self) -> &SyncStore {
        &self.store
    }

    pub fn binding(&self) -> &MapBinding {
        &self.binding
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Direct access for simulating user interaction on the map
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_parts(self) -> (SyncStore, R) {
        (self.store, self.renderer)
    }

    fn sync_renderer(&mut self, origin: UpdateOrigin) -> ApplyOutcome {
        self.binding
            .apply_document(&self.store, &mut self.renderer, origin)
    }

    pub fn set_geojson_text(&mut self, text: &str) -> SyncReport {
        let report = self.store.set_geojson_text(text);
        self.sync_renderer(UpdateOrigin::External);
        report
    }

    pub fn set_wkt_text(&mut self, text: &str) -> SyncReport {
        let report = self.store.set_wkt_text(text);
        self.sync_renderer(UpdateOrigin::External);
        report
    }

    pub fn set_wkt_display_mode(&mut self, mode: WktDisplayMode) -> SyncReport {
        self.store.set_wkt_display_mode(mode)
    }

    pub fn set_projection(&mut self, projection: &str) -> SyncReport {
        let report = self.store.set_projection(projection);
        self.sync_renderer(UpdateOrigin::External);
        report
    }

    pub fn apply_display_edit(&mut self, text: &str) -> SyncReport {
        let report = self.store.apply_display_edit(text);
        self.sync_renderer(UpdateOrigin::External);
        report
    }

    /// Feed buffered renderer events back into the store
    ///
    /// Returns how many events caused a write-back.
    pub fn pump_renderer_events(&mut self) -> usize {
        let events = self.renderer.take_events();
        let mut written = 0;
        for event in events {
            if self
                .binding
                .handle_renderer_event(event, &mut self.store, &self.renderer)
            {
                written += 1;
                self.sync_renderer(UpdateOrigin::FromRenderer);
            }
        }
        written
    }

    /// Run a tool and preview its result on the map
    pub fn run_analysis(
        &mut self,
        tool: &dyn AnalysisTool,
    ) -> Result<AnalysisResult, AnalysisError> {
        let result = self.store.run_analysis(tool)?;
        self.renderer.show_preview(&result.features);
        if let Some(extent) = features_extent(&result.features) {
            self.renderer
                .fit_view(extent, FitOptions::for_analysis(&self.store.config().map));
        }
        Ok(result)
    }

    pub fn queue_replace(&mut self, result: AnalysisResult) {
        self.pending.push_back(DeferredAction::Replace(result));
    }

    pub fn queue_merge(&mut self, result: AnalysisResult) {
        self.pending.push_back(DeferredAction::Merge(result));
    }

    /// True while deferred actions are waiting
    pub fn is_processing(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Run every queued action in order
    pub fn run_deferred(&mut self) -> Vec<Result<ApplyResult, AnalysisError>> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        while let Some(action) = self.pending.pop_front() {
            let outcome = match &action {
                DeferredAction::Replace(result) => Ok(self.store.replace_with_result(result)),
                DeferredAction::Merge(result) => self.store.merge_result(result),
            };
            self.sync_renderer(UpdateOrigin::External);
            debug!(?outcome, "Deferred action finished");
            outcomes.push(outcome);
        }
        outcomes
    }
}
