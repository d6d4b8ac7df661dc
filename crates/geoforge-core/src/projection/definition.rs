//! CRS definitions and their forward/inverse math.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::error::ProjectionError;
use crate::geometry::Coord;

/// Iteration cap for the inverse conformal latitude series.
const MAX_INVERSE_ITERATIONS: usize = 15;

/// Reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in metres
    pub a: f64,
    /// Inverse flattening
    pub rf: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        rf: 298.257_223_563,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        rf: 298.257_222_101,
    };

    /// First eccentricity
    pub fn e(&self) -> f64 {
        let f = 1.0 / self.rf;
        (f * (2.0 - f)).sqrt()
    }

    fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "wgs84" => Some(Self::WGS84),
            "grs80" | "nad83" => Some(Self::GRS80),
            _ => None,
        }
    }
}

/// Parameters of a two-standard-parallel Lambert Conformal Conic projection.
/// Angles are in degrees, offsets in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertConformalConic {
    pub lat_1: f64,
    pub lat_2: f64,
    pub lat_0: f64,
    pub lon_0: f64,
    pub x_0: f64,
    pub y_0: f64,
    pub ellipsoid: Ellipsoid,
}

/// Constants derived once per LCC definition
struct LccConstants {
    e: f64,
    n: f64,
    af: f64,
    rho0: f64,
}

impl LambertConformalConic {
    fn m(phi: f64, e: f64) -> f64 {
        let s = phi.sin();
        phi.cos() / (1.0 - e * e * s * s).sqrt()
    }

    fn t(phi: f64, e: f64) -> f64 {
        let s = phi.sin();
        (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - e * s) / (1.0 + e * s)).powf(e / 2.0)
    }

    fn constants(&self) -> LccConstants {
        let e = self.ellipsoid.e();
        let phi1 = self.lat_1.to_radians();
        let phi2 = self.lat_2.to_radians();
        let phi0 = self.lat_0.to_radians();

        let m1 = Self::m(phi1, e);
        let m2 = Self::m(phi2, e);
        let t1 = Self::t(phi1, e);
        let t2 = Self::t(phi2, e);

        let n = if (phi1 - phi2).abs() < 1e-12 {
            phi1.sin()
        } else {
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        };
        let af = self.ellipsoid.a * m1 / (n * t1.powf(n));
        let rho0 = af * Self::t(phi0, e).powf(n);
        LccConstants { e, n, af, rho0 }
    }

    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let k = self.constants();
        let rho = k.af * Self::t(lat.to_radians(), k.e).powf(k.n);
        let theta = k.n * (lon - self.lon_0).to_radians();
        (
            self.x_0 + rho * theta.sin(),
            self.y_0 + k.rho0 - rho * theta.cos(),
        )
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let k = self.constants();
        let dx = x - self.x_0;
        let dy = k.rho0 - (y - self.y_0);
        let sign = k.n.signum();
        let rho = sign * (dx * dx + dy * dy).sqrt();
        let theta = (sign * dx).atan2(sign * dy);
        let t = (rho / k.af).powf(1.0 / k.n);

        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..MAX_INVERSE_ITERATIONS {
            let s = phi.sin();
            let next =
                FRAC_PI_2 - 2.0 * (t * ((1.0 - k.e * s) / (1.0 + k.e * s)).powf(k.e / 2.0)).atan();
            let converged = (next - phi).abs() < 1e-14;
            phi = next;
            if converged {
                break;
            }
        }

        (theta.to_degrees() / k.n + self.lon_0, phi.to_degrees())
    }
}

/// Supported CRS kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrsDefinition {
    /// Longitude/latitude in degrees
    Geographic { ellipsoid: Ellipsoid },
    /// Spherical (pseudo) Mercator in metres
    WebMercator { radius: f64 },
    /// Lambert Conformal Conic in metres
    LambertConformalConic(LambertConformalConic),
}

impl CrsDefinition {
    /// Parse a PROJ.4-style definition string
    ///
    /// Supports `+proj=longlat`, `+proj=merc` and `+proj=lcc`. Unknown
    /// parameters such as `+no_defs` or `+units=m` are ignored.
    pub fn from_proj4(id: &str, definition: &str) -> Result<Self, ProjectionError> {
        let invalid = |reason: String| ProjectionError::InvalidDefinition {
            id: id.to_string(),
            reason,
        };

        let mut params = std::collections::HashMap::new();
        for token in definition.split_whitespace() {
            let token = token.trim_start_matches('+');
            match token.split_once('=') {
                Some((key, value)) => params.insert(key.to_string(), value.to_string()),
                None => params.insert(token.to_string(), String::new()),
            };
        }

        let number = |key: &str, default: Option<f64>| -> Result<f64, ProjectionError> {
            match params.get(key) {
                Some(raw) => raw
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("parameter {} is not a number: {}", key, raw))),
                None => default.ok_or_else(|| invalid(format!("missing parameter {}", key))),
            }
        };

        let ellipsoid = if let Some(a) = params.get("a") {
            let a = a
                .parse::<f64>()
                .map_err(|_| invalid(format!("parameter a is not a number: {}", a)))?;
            Ellipsoid {
                a,
                rf: number("rf", Some(Ellipsoid::WGS84.rf))?,
            }
        } else {
            let name = params
                .get("ellps")
                .or_else(|| params.get("datum"))
                .map(String::as_str)
                .unwrap_or("WGS84");
            Ellipsoid::by_name(name).ok_or_else(|| invalid(format!("unknown ellipsoid {}", name)))?
        };

        let proj = params
            .get("proj")
            .ok_or_else(|| invalid("missing +proj".to_string()))?;

        match proj.as_str() {
            "longlat" | "latlong" => Ok(Self::Geographic { ellipsoid }),
            "merc" => Ok(Self::WebMercator {
                radius: ellipsoid.a,
            }),
            "lcc" => {
                let lat_1 = number("lat_1", None)?;
                Ok(Self::LambertConformalConic(LambertConformalConic {
                    lat_1,
                    lat_2: number("lat_2", Some(lat_1))?,
                    lat_0: number("lat_0", Some(lat_1))?,
                    lon_0: number("lon_0", Some(0.0))?,
                    x_0: number("x_0", Some(0.0))?,
                    y_0: number("y_0", Some(0.0))?,
                    ellipsoid,
                }))
            }
            other => Err(invalid(format!("unsupported projection {}", other))),
        }
    }

    /// Projected coordinate to longitude/latitude in degrees
    pub fn to_geographic(&self, id: &str, c: Coord) -> Result<Coord, ProjectionError> {
        let (lon, lat) = match self {
            Self::Geographic { .. } => (c.x, c.y),
            Self::WebMercator { radius } => (
                (c.x / radius).to_degrees(),
                (c.y / radius).sinh().atan().to_degrees(),
            ),
            Self::LambertConformalConic(lcc) => lcc.inverse(c.x, c.y),
        };
        finite(id, lon, lat, c.z)
    }

    /// Longitude/latitude in degrees to projected coordinate
    pub fn from_geographic(&self, id: &str, c: Coord) -> Result<Coord, ProjectionError> {
        let (x, y) = match self {
            Self::Geographic { .. } => (c.x, c.y),
            // The poles map to a large but finite northing that inverts
            // back to exactly ±90.
            Self::WebMercator { radius } => {
                if c.y.abs() > 90.0 {
                    return Err(ProjectionError::OutOfDomain {
                        id: id.to_string(),
                        x: c.x,
                        y: c.y,
                    });
                }
                (
                    radius * c.x.to_radians(),
                    radius * c.y.to_radians().tan().asinh(),
                )
            }
            Self::LambertConformalConic(lcc) => {
                if c.y.abs() >= 90.0 {
                    return Err(ProjectionError::OutOfDomain {
                        id: id.to_string(),
                        x: c.x,
                        y: c.y,
                    });
                }
                lcc.forward(c.x, c.y)
            }
        };
        finite(id, x, y, c.z)
    }
}

fn finite(id: &str, x: f64, y: f64, z: Option<f64>) -> Result<Coord, ProjectionError> {
    if x.is_finite() && y.is_finite() {
        Ok(Coord { x, y, z })
    } else {
        Err(ProjectionError::OutOfDomain {
            id: id.to_string(),
            x,
            y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAMBERT_93: &str = "+proj=lcc +lat_1=49 +lat_2=44 +lat_0=46.5 +lon_0=3 +x_0=700000 +y_0=6600000 +ellps=GRS80 +units=m +no_defs +type=crs";

    #[test]
    fn test_parse_longlat() {
        let def = CrsDefinition::from_proj4("EPSG:4269", "+proj=longlat +datum=NAD83 +no_defs")
            .unwrap();
        assert_eq!(
            def,
            CrsDefinition::Geographic {
                ellipsoid: Ellipsoid::GRS80
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(CrsDefinition::from_proj4("X", "+datum=WGS84").is_err());
        assert!(CrsDefinition::from_proj4("X", "+proj=tmerc").is_err());
        assert!(CrsDefinition::from_proj4("X", "+proj=lcc +lat_2=44").is_err());
        assert!(CrsDefinition::from_proj4("X", "+proj=lcc +lat_1=abc").is_err());
        assert!(CrsDefinition::from_proj4("X", "+proj=longlat +ellps=bessel").is_err());
    }

    #[test]
    fn test_lambert93_origin() {
        let def = CrsDefinition::from_proj4("EPSG:2154", LAMBERT_93).unwrap();
        let projected = def
            .from_geographic("EPSG:2154", Coord::new(3.0, 46.5))
            .unwrap();
        assert!((projected.x - 700_000.0).abs() < 1e-6);
        assert!((projected.y - 6_600_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_lambert93_paris() {
        let def = CrsDefinition::from_proj4("EPSG:2154", LAMBERT_93).unwrap();
        let projected = def
            .from_geographic("EPSG:2154", Coord::new(2.3499, 48.8530))
            .unwrap();
        assert!((projected.x - 652_296.97).abs() < 1.0, "x = {}", projected.x);
        assert!((projected.y - 6_861_636.36).abs() < 1.0, "y = {}", projected.y);

        let back = def.to_geographic("EPSG:2154", projected).unwrap();
        assert!((back.x - 2.3499).abs() < 1e-9);
        assert!((back.y - 48.8530).abs() < 1e-9);
    }

    #[test]
    fn test_mercator_poles_invert_exactly() {
        let def = CrsDefinition::WebMercator {
            radius: Ellipsoid::WGS84.a,
        };
        for lat in [90.0, -90.0, 89.0, -89.999_999_999, 85.06] {
            let projected = def.from_geographic("EPSG:3857", Coord::new(10.0, lat)).unwrap();
            assert!(projected.y.is_finite());
            let back = def.to_geographic("EPSG:3857", projected).unwrap();
            assert!((back.x - 10.0).abs() < 1e-12);
            assert!((back.y - lat).abs() < 1e-12, "{lat} came back as {}", back.y);
        }
    }

    #[test]
    fn test_mercator_rejects_latitude_past_pole() {
        let def = CrsDefinition::WebMercator {
            radius: Ellipsoid::WGS84.a,
        };
        let err = def.from_geographic("EPSG:3857", Coord::new(0.0, 95.0));
        assert!(matches!(err, Err(ProjectionError::OutOfDomain { .. })));
    }

    #[test]
    fn test_lcc_rejects_pole() {
        let def = CrsDefinition::from_proj4("EPSG:2154", LAMBERT_93).unwrap();
        let err = def.from_geographic("EPSG:2154", Coord::new(0.0, -90.0));
        assert!(matches!(err, Err(ProjectionError::OutOfDomain { .. })));
    }
}
