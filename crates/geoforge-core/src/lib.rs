//! # GeoForge Core
//!
//! Core types shared by every GeoForge crate: the feature/geometry model,
//! the error taxonomy, the projection service and the per-document event
//! bus.

pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod projection;
pub mod types;

pub use error::{Error, ProjectionError, Result, SyncError};

pub use event_bus::{
    DocumentBus, DocumentEvent, EventBusConfig, EventCategory, EventFilter, SubscriptionId,
};

pub use geometry::{
    features_extent, Coord, Extent, Feature, FeatureId, FeatureList, Geometry, GeometryFamily,
};

pub use projection::{CrsDefinition, CrsEntry, Ellipsoid, ProjectionRegistry};

pub use types::{
    DocumentMode, ParsePolicy, TextFormat, UpdateOrigin, WktDisplayMode, ANALYSIS_CRS,
    DEFAULT_CRS, WORKING_CRS,
};
