//! Geometry and feature model
//!
//! The canonical in-memory representation every text buffer is parsed into.
//! Features are plain values: they are rebuilt wholesale on each re-parse
//! and carry no identity beyond an optional explicit id.

mod feature;

pub use feature::{features_extent, Feature, FeatureId, FeatureList};

/// A single position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    /// X / easting / longitude
    pub x: f64,
    /// Y / northing / latitude
    pub y: f64,
    /// Optional height, carried through untouched by reprojection
    pub z: Option<f64>,
}

impl Coord {
    /// Create a 2D coordinate
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Create a coordinate with a height
    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_none_or(f64::is_finite)
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

/// Broad geometry family, used to pick presentation defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryFamily {
    /// Point / MultiPoint
    Point,
    /// LineString / MultiLineString
    LineString,
    /// Polygon / MultiPolygon, and anything else
    Polygon,
}

/// A typed geometry
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A single position
    Point(Coord),
    /// Several independent positions
    MultiPoint(Vec<Coord>),
    /// A connected sequence of positions
    LineString(Vec<Coord>),
    /// Several line strings
    MultiLineString(Vec<Vec<Coord>>),
    /// An exterior ring followed by optional holes
    Polygon(Vec<Vec<Coord>>),
    /// Several polygons
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
    /// A heterogeneous list of geometries
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// The GeoJSON `type` name of this geometry
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::MultiPoint(_) => "MultiPoint",
            Self::LineString(_) => "LineString",
            Self::MultiLineString(_) => "MultiLineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
            Self::GeometryCollection(_) => "GeometryCollection",
        }
    }

    /// Geometry family with the `Multi` prefix dropped
    pub fn family(&self) -> GeometryFamily {
        match self {
            Self::Point(_) | Self::MultiPoint(_) => GeometryFamily::Point,
            Self::LineString(_) | Self::MultiLineString(_) => GeometryFamily::LineString,
            Self::GeometryCollection(members) => members
                .first()
                .map(Geometry::family)
                .unwrap_or(GeometryFamily::Polygon),
            Self::Polygon(_) | Self::MultiPolygon(_) => GeometryFamily::Polygon,
        }
    }

    /// True for a geometry with no positions at all
    pub fn is_empty(&self) -> bool {
        let mut empty = true;
        self.for_each_coord(&mut |_| empty = false);
        empty
    }

    /// True when any position carries a height
    pub fn has_z(&self) -> bool {
        let mut has_z = false;
        self.for_each_coord(&mut |c| has_z |= c.z.is_some());
        has_z
    }

    /// Number of positions in the geometry
    pub fn coord_count(&self) -> usize {
        let mut count = 0;
        self.for_each_coord(&mut |_| count += 1);
        count
    }

    /// Visit every position in document order
    pub fn for_each_coord(&self, f: &mut dyn FnMut(&Coord)) {
        match self {
            Self::Point(c) => f(c),
            Self::MultiPoint(cs) | Self::LineString(cs) => cs.iter().for_each(f),
            Self::MultiLineString(lines) | Self::Polygon(lines) => {
                lines.iter().flatten().for_each(f)
            }
            Self::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(f),
            Self::GeometryCollection(members) => {
                for member in members {
                    member.for_each_coord(f);
                }
            }
        }
    }

    /// Rebuild the geometry with every position mapped through `f`
    pub fn try_map_coords<E>(
        &self,
        f: &mut impl FnMut(Coord) -> Result<Coord, E>,
    ) -> Result<Geometry, E> {
        fn ring<E>(
            cs: &[Coord],
            f: &mut impl FnMut(Coord) -> Result<Coord, E>,
        ) -> Result<Vec<Coord>, E> {
            cs.iter().map(|c| f(*c)).collect()
        }

        Ok(match self {
            Self::Point(c) => Self::Point(f(*c)?),
            Self::MultiPoint(cs) => Self::MultiPoint(ring(cs, f)?),
            Self::LineString(cs) => Self::LineString(ring(cs, f)?),
            Self::MultiLineString(lines) => Self::MultiLineString(
                lines.iter().map(|l| ring(l, f)).collect::<Result<_, _>>()?,
            ),
            Self::Polygon(rings) => {
                Self::Polygon(rings.iter().map(|r| ring(r, f)).collect::<Result<_, _>>()?)
            }
            Self::MultiPolygon(polygons) => Self::MultiPolygon(
                polygons
                    .iter()
                    .map(|p| p.iter().map(|r| ring(r, f)).collect::<Result<_, _>>())
                    .collect::<Result<_, _>>()?,
            ),
            Self::GeometryCollection(members) => Self::GeometryCollection(
                members
                    .iter()
                    .map(|m| m.try_map_coords(f))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Flatten nested collections into their constituent geometries
    pub fn flatten(&self) -> Vec<&Geometry> {
        match self {
            Self::GeometryCollection(members) => {
                members.iter().flat_map(Geometry::flatten).collect()
            }
            other => vec![other],
        }
    }

    /// Bounding extent, `None` for an empty geometry
    pub fn extent(&self) -> Option<Extent> {
        let mut extent: Option<Extent> = None;
        self.for_each_coord(&mut |c| match extent.as_mut() {
            Some(e) => e.extend(c),
            None => extent = Some(Extent::from_coord(c)),
        });
        extent
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Degenerate extent covering one coordinate
    pub fn from_coord(c: &Coord) -> Self {
        Self {
            min_x: c.x,
            min_y: c.y,
            max_x: c.x,
            max_y: c.y,
        }
    }

    /// Grow to include a coordinate
    pub fn extend(&mut self, c: &Coord) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    /// Grow to include another extent
    pub fn merge(&mut self, other: &Extent) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Centre point
    pub fn center(&self) -> Coord {
        Coord::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}
