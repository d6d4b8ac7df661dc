//! Mapping between `wkt` crate values and the feature model.

use std::str::FromStr;

use geoforge_core::{Coord, Geometry, SyncError, TextFormat};
use wkt::types::{
    Coord as WktCoord, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use wkt::Wkt;

/// Curve and surface types the feature model has no shape for
const UNSUPPORTED_TYPES: &[&str] = &[
    "CIRCULARSTRING",
    "COMPOUNDCURVE",
    "CURVEPOLYGON",
    "MULTICURVE",
    "MULTISURFACE",
    "POLYHEDRALSURFACE",
    "TIN",
    "TRIANGLE",
];

fn syntax(reason: impl Into<String>) -> SyncError {
    SyncError::invalid_syntax(TextFormat::Wkt, reason)
}

/// Text after the first balanced parenthesised body, trimmed
fn trailing(body: &str) -> &str {
    let mut depth = 0usize;
    for (i, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return body[i + 1..].trim();
                }
            }
            _ => {}
        }
    }
    ""
}

/// Parse a single WKT literal
///
/// An optional `SRID=n;` prefix is accepted and ignored.
pub fn parse_literal(text: &str) -> Result<Wkt<f64>, SyncError> {
    let mut body = text.trim();
    if body
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("SRID="))
    {
        body = body
            .split_once(';')
            .map(|(_, rest)| rest.trim())
            .ok_or_else(|| syntax("SRID prefix without ';'"))?;
    }
    if body.is_empty() {
        return Err(syntax("empty literal"));
    }

    let keyword = body
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    if let Some(kind) = UNSUPPORTED_TYPES
        .iter()
        .find(|kind| keyword.eq_ignore_ascii_case(kind))
    {
        return Err(SyncError::unsupported_shape(TextFormat::Wkt, *kind));
    }

    let rest = trailing(body);
    if !rest.is_empty() {
        return Err(syntax(format!("unexpected trailing text '{}'", rest)));
    }
    Wkt::<f64>::from_str(body).map_err(|e| syntax(e.to_string()))
}

fn coord(c: &WktCoord<f64>) -> Coord {
    match c.z {
        Some(z) => Coord::with_z(c.x, c.y, z),
        None => Coord::new(c.x, c.y),
    }
}

fn line(l: &LineString<f64>) -> Vec<Coord> {
    l.0.iter().map(coord).collect()
}

fn rings(p: &Polygon<f64>) -> Vec<Vec<Coord>> {
    p.0.iter().map(line).collect()
}

/// Convert a parsed value; `POINT EMPTY` has no coordinate and gives `None`
///
/// Empty points inside a collection or multipoint are dropped.
pub fn from_wkt(value: &Wkt<f64>) -> Option<Geometry> {
    Some(match value {
        Wkt::Point(p) => Geometry::Point(coord(p.0.as_ref()?)),
        Wkt::LineString(l) => Geometry::LineString(line(l)),
        Wkt::Polygon(p) => Geometry::Polygon(rings(p)),
        Wkt::MultiPoint(points) => Geometry::MultiPoint(
            points
                .0
                .iter()
                .filter_map(|p| p.0.as_ref())
                .map(coord)
                .collect(),
        ),
        Wkt::MultiLineString(lines) => {
            Geometry::MultiLineString(lines.0.iter().map(line).collect())
        }
        Wkt::MultiPolygon(polygons) => {
            Geometry::MultiPolygon(polygons.0.iter().map(rings).collect())
        }
        Wkt::GeometryCollection(members) => {
            Geometry::GeometryCollection(members.0.iter().filter_map(from_wkt).collect())
        }
    })
}

// `+ 0.0` turns -0 into 0 so it never prints with a sign.
fn wkt_coord(c: &Coord, with_z: bool) -> WktCoord<f64> {
    WktCoord {
        x: c.x + 0.0,
        y: c.y + 0.0,
        z: with_z.then(|| c.z.unwrap_or(0.0) + 0.0),
        m: None,
    }
}

fn wkt_line(cs: &[Coord], with_z: bool) -> LineString<f64> {
    LineString(cs.iter().map(|c| wkt_coord(c, with_z)).collect())
}

fn wkt_polygon(rings: &[Vec<Coord>], with_z: bool) -> Polygon<f64> {
    Polygon(rings.iter().map(|r| wkt_line(r, with_z)).collect())
}

/// Convert a geometry for writing
///
/// Heights are kept when any position carries one; positions without a
/// height are then padded with 0.
pub fn to_wkt(geometry: &Geometry) -> Wkt<f64> {
    let z = geometry.has_z();
    match geometry {
        Geometry::Point(c) => Wkt::Point(Point(Some(wkt_coord(c, z)))),
        Geometry::LineString(cs) => Wkt::LineString(wkt_line(cs, z)),
        Geometry::MultiPoint(cs) => Wkt::MultiPoint(MultiPoint(
            cs.iter().map(|c| Point(Some(wkt_coord(c, z)))).collect(),
        )),
        Geometry::Polygon(rs) => Wkt::Polygon(wkt_polygon(rs, z)),
        Geometry::MultiLineString(ls) => Wkt::MultiLineString(MultiLineString(
            ls.iter().map(|l| wkt_line(l, z)).collect(),
        )),
        Geometry::MultiPolygon(ps) => Wkt::MultiPolygon(MultiPolygon(
            ps.iter().map(|p| wkt_polygon(p, z)).collect(),
        )),
        Geometry::GeometryCollection(members) => {
            Wkt::GeometryCollection(GeometryCollection(members.iter().map(to_wkt).collect()))
        }
    }
}

/// The value written for a feature without geometry
pub fn empty_point() -> Wkt<f64> {
    Wkt::Point(Point(None))
}

/// Render with a space before each body and after each comma
///
/// `POINT(1 2)` becomes `POINT (1 2)`, `LINESTRING(0 0,1 1)` becomes
/// `LINESTRING (0 0, 1 1)`. Already spaced text is left alone.
pub fn render(value: &Wkt<f64>) -> String {
    let compact = value.to_string();
    let mut out = String::with_capacity(compact.len() + compact.len() / 4);
    let mut prev = ' ';
    for ch in compact.chars() {
        if (ch == '(' && prev.is_ascii_alphabetic()) || (prev == ',' && ch != ' ') {
            out.push(' ');
        }
        out.push(ch);
        prev = ch;
    }
    out
}

/// Write one geometry as a WKT literal
pub fn write_literal(geometry: &Geometry) -> String {
    render(&to_wkt(geometry))
}
