//! Named CRS registry

use std::collections::HashMap;

use super::definition::CrsDefinition;
use crate::error::ProjectionError;
use crate::geometry::{Coord, Geometry};

/// Built-in systems: (code, display name, PROJ.4 definition)
const BUILTIN_CRS: [(&str, &str, &str); 4] = [
    (
        "EPSG:4326",
        "WGS84",
        "+proj=longlat +datum=WGS84 +no_defs +type=crs",
    ),
    (
        "EPSG:3857",
        "Web Mercator",
        "+proj=merc +lon_0=0 +k=1 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs +type=crs",
    ),
    (
        "EPSG:4269",
        "NAD83",
        "+proj=longlat +datum=NAD83 +no_defs +type=crs",
    ),
    (
        "EPSG:2154",
        "Lambert-93",
        "+proj=lcc +lat_1=49 +lat_2=44 +lat_0=46.5 +lon_0=3 +x_0=700000 +y_0=6600000 +ellps=GRS80 +units=m +no_defs +type=crs",
    ),
];

/// A registered coordinate reference system
#[derive(Debug, Clone, PartialEq)]
pub struct CrsEntry {
    /// Identifier, e.g. `EPSG:4326`
    pub code: String,
    /// Human readable name for pickers
    pub name: String,
    /// Parsed definition
    pub definition: CrsDefinition,
}

/// Registry of coordinate reference systems
#[derive(Debug, Clone, Default)]
pub struct ProjectionRegistry {
    entries: HashMap<String, CrsEntry>,
    /// Registration order, for a stable catalog
    order: Vec<String>,
}

impl ProjectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding WGS84, Web Mercator, NAD83 and Lambert-93
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (code, name, definition) in BUILTIN_CRS {
            if let Err(e) = registry.register_named(code, name, definition) {
                tracing::error!("Built-in CRS {} failed to register: {}", code, e);
            }
        }
        registry
    }

    /// Register a CRS under its own code as display name
    pub fn register_crs(&mut self, id: &str, definition: &str) -> Result<(), ProjectionError> {
        self.register_named(id, id, definition)
    }

    /// Register (or replace) a CRS with a display name
    pub fn register_named(
        &mut self,
        id: &str,
        name: &str,
        definition: &str,
    ) -> Result<(), ProjectionError> {
        let definition = CrsDefinition::from_proj4(id, definition)?;
        if !self.entries.contains_key(id) {
            self.order.push(id.to_string());
        }
        self.entries.insert(
            id.to_string(),
            CrsEntry {
                code: id.to_string(),
                name: name.to_string(),
                definition,
            },
        );
        tracing::debug!("Registered CRS {} ({})", id, name);
        Ok(())
    }

    /// Check whether an identifier is registered
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Look up a registered CRS
    pub fn get(&self, id: &str) -> Result<&CrsEntry, ProjectionError> {
        self.entries
            .get(id)
            .ok_or_else(|| ProjectionError::UnknownCrs { id: id.to_string() })
    }

    /// `(code, name)` pairs in registration order
    pub fn catalog(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|code| self.entries.get(code))
            .map(|entry| (entry.code.clone(), entry.name.clone()))
            .collect()
    }

    /// Move a coordinate from one CRS to another
    ///
    /// Identical identifiers return the input untouched.
    pub fn reproject(&self, coord: Coord, from: &str, to: &str) -> Result<Coord, ProjectionError> {
        if from == to {
            self.get(from)?;
            return Ok(coord);
        }
        let source = self.get(from)?;
        let target = self.get(to)?;
        let geographic = source.definition.to_geographic(from, coord)?;
        target.definition.from_geographic(to, geographic)
    }

    /// Move every position of a geometry from one CRS to another
    pub fn reproject_geometry(
        &self,
        geometry: &Geometry,
        from: &str,
        to: &str,
    ) -> Result<Geometry, ProjectionError> {
        if from == to {
            self.get(from)?;
            return Ok(geometry.clone());
        }
        let source = self.get(from)?;
        let target = self.get(to)?;
        geometry.try_map_coords(&mut |c| {
            let geographic = source.definition.to_geographic(from, c)?;
            target.definition.from_geographic(to, geographic)
        })
    }
}
