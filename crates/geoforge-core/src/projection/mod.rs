//! # Projection Service
//!
//! Registers named coordinate reference systems and moves coordinates
//! between them. Every transform is routed through geographic coordinates
//! on a common datum, which is exact for the systems the editor ships with
//! (WGS84 and NAD83 are treated as coincident).
//!
//! ```rust,ignore
//! use geoforge_core::projection::ProjectionRegistry;
//! use geoforge_core::geometry::Coord;
//!
//! let registry = ProjectionRegistry::with_defaults();
//! let merc = registry.reproject(Coord::new(2.35, 48.85), "EPSG:4326", "EPSG:3857")?;
//! ```

mod definition;
mod registry;

pub use definition::{CrsDefinition, Ellipsoid, LambertConformalConic};
pub use registry::{CrsEntry, ProjectionRegistry};
