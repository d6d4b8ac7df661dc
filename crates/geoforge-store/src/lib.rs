//! # GeoForge Store
//!
//! The synchronization engine: a store keeping the GeoJSON and WKT views
//! of one document consistent, the binding that keeps a map renderer in
//! step with it, and the boundary through which analysis tools read and
//! write the document.

pub mod analysis;
pub mod map_binding;
pub mod session;
pub mod store;

pub use analysis::{
    AnalysisError, AnalysisResult, AnalysisTool, ApplyResult, CenterTool, MidpointTool,
};
pub use map_binding::{ApplyOutcome, FitOptions, MapBinding, Renderer, RendererEvent};
pub use session::{DeferredAction, EditingSession};
pub use store::{DerivedView, Document, SyncReport, SyncStore};
