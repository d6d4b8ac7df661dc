//! Features: a geometry plus free-form properties.

use serde_json::{Map, Value};

use super::{Extent, Geometry};

/// Explicit feature identifier
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureId {
    String(String),
    Number(serde_json::Number),
}

impl FeatureId {
    /// Read an id from a JSON value; only strings and numbers qualify
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
        }
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A geometry with its properties and optional id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    pub id: Option<FeatureId>,
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

impl Feature {
    /// A feature with a geometry and no properties
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: Map::new(),
        }
    }

    /// Builder-style id assignment
    pub fn with_id(mut self, id: FeatureId) -> Self {
        self.id = Some(id);
        self
    }

    /// Builder-style property assignment
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn extent(&self) -> Option<Extent> {
        self.geometry.as_ref().and_then(Geometry::extent)
    }
}

/// An ordered list of features, the in-memory form of a whole document
pub type FeatureList = Vec<Feature>;

/// Combined extent of a feature list
pub fn features_extent(features: &[Feature]) -> Option<Extent> {
    features
        .iter()
        .filter_map(Feature::extent)
        .reduce(|mut acc, e| {
            acc.merge(&e);
            acc
        })
}
