// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Planar geometry in the working projection of the street data.

mod polyline;

pub use polyline::Polyline;

use crate::earth_distance;

/// Semi-major axis of the WGS84 ellipsoid, used as the sphere radius by Web Mercator.
const MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Tolerance used when comparing positions along a line.
pub(crate) const EPSILON: f64 = 1e-9;

/// Errors which may occur when operating on geometries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("a polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("can't project from srid {from} to srid {to}")]
    UnsupportedProjection { from: u32, to: u32 },
}

/// Spatial reference system of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Srid {
    /// Geographic longitude (x) and latitude (y) in degrees, [EPSG:4326](https://epsg.io/4326).
    Wgs84,

    /// Spherical mercator in meters, [EPSG:3857](https://epsg.io/3857).
    WebMercator,

    /// Arbitrary planar coordinates in meters, without any relation to the Earth's surface.
    #[default]
    Cartesian,
}

impl Srid {
    /// Returns the numeric EPSG code of this reference system,
    /// or 0 for [Srid::Cartesian].
    pub fn code(self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::WebMercator => 3857,
            Self::Cartesian => 0,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            4326 => Some(Self::Wgs84),
            3857 | 900913 => Some(Self::WebMercator),
            0 => Some(Self::Cartesian),
            _ => None,
        }
    }
}

impl std::fmt::Display for Srid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wgs84 => write!(f, "EPSG:4326"),
            Self::WebMercator => write!(f, "EPSG:3857"),
            Self::Cartesian => write!(f, "cartesian"),
        }
    }
}

/// An immutable position in some [Srid].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Planar (euclidean) distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Checks whether both points are closer than [EPSILON] on both axes.
    pub fn almost_eq(&self, other: &Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    /// Returns the point `t` of the way from `self` to `other`.
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Reprojects a point from one reference system into another.
/// Returns the point unchanged if both systems are the same.
pub fn project(point: Point, from: Srid, to: Srid) -> Result<Point, GeometryError> {
    match (from, to) {
        _ if from == to => Ok(point),

        (Srid::Wgs84, Srid::WebMercator) => {
            // Mercator is undefined at the poles
            let lat = point.y.clamp(-85.051_128_78, 85.051_128_78).to_radians();
            Ok(Point {
                x: MERCATOR_RADIUS * point.x.to_radians(),
                y: MERCATOR_RADIUS * (std::f64::consts::FRAC_PI_4 + lat * 0.5).tan().ln(),
            })
        }

        (Srid::WebMercator, Srid::Wgs84) => Ok(Point {
            x: (point.x / MERCATOR_RADIUS).to_degrees(),
            y: (2.0 * (point.y / MERCATOR_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2)
                .to_degrees(),
        }),

        _ => Err(GeometryError::UnsupportedProjection {
            from: from.code(),
            to: to.code(),
        }),
    }
}

/// Compass bearing (0° = north, 90° = east) from `p1` to `p2`, computed from the planar
/// delta between the points and normalized into [0, 360).
pub fn bearing(p1: Point, p2: Point) -> f64 {
    let degrees = (p2.x - p1.x).atan2(p2.y - p1.y).to_degrees();
    normalize_degrees(degrees)
}

/// Wraps an angle in degrees into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid may round tiny negative values up to exactly 360
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// Length of a polyline in meters, given the reference system of its points.
///
/// Geographic lines are measured with great-circle distances, Web Mercator lines
/// are corrected by the scale factor at each segment's mid latitude, and
/// cartesian lines are measured as-is.
pub fn distance_along(line: &Polyline, srid: Srid) -> f64 {
    let segments = line.points().windows(2);
    match srid {
        Srid::Cartesian => line.length(),

        Srid::Wgs84 => segments
            .map(|pair| earth_distance(pair[0].y, pair[0].x, pair[1].y, pair[1].x))
            .sum(),

        Srid::WebMercator => segments
            .map(|pair| {
                let mid_y = (pair[0].y + pair[1].y) * 0.5;
                let lat = 2.0 * (mid_y / MERCATOR_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2;
                pair[0].distance(&pair[1]) * lat.cos()
            })
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr, $eps:expr) => {
            assert!(
                (($a - $b).abs() < $eps),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn project_identity() {
        let p = Point::new(12.5, -3.0);
        assert_eq!(project(p, Srid::Cartesian, Srid::Cartesian), Ok(p));
    }

    #[test]
    fn project_mercator_round_trip() {
        let warsaw = Point::new(21.0122, 52.2297);
        let m = project(warsaw, Srid::Wgs84, Srid::WebMercator).unwrap();
        assert_almost_eq!(m.x, 2_339_067.4, 1.0);
        assert_almost_eq!(m.y, 6_841_765.2, 1.0);

        let back = project(m, Srid::WebMercator, Srid::Wgs84).unwrap();
        assert_almost_eq!(back.x, warsaw.x, 1e-9);
        assert_almost_eq!(back.y, warsaw.y, 1e-9);
    }

    #[test]
    fn project_cartesian_is_unsupported() {
        assert_eq!(
            project(Point::default(), Srid::Cartesian, Srid::Wgs84),
            Err(GeometryError::UnsupportedProjection { from: 0, to: 4326 })
        );
    }

    #[test]
    fn bearings() {
        let o = Point::new(0.0, 0.0);
        assert_almost_eq!(bearing(o, Point::new(0.0, 1.0)), 0.0, 1e-9);
        assert_almost_eq!(bearing(o, Point::new(1.0, 0.0)), 90.0, 1e-9);
        assert_almost_eq!(bearing(o, Point::new(0.0, -1.0)), 180.0, 1e-9);
        assert_almost_eq!(bearing(o, Point::new(-1.0, 0.0)), 270.0, 1e-9);
        assert_almost_eq!(bearing(o, Point::new(-1.0, 1.0)), 315.0, 1e-9);
    }

    #[test]
    fn normalize() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert!(normalize_degrees(-1e-15) < 360.0);
    }

    #[test]
    fn distance_along_geographic() {
        let line = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.5),
            Point::new(0.0, 1.0),
        ])
        .unwrap();
        assert_almost_eq!(distance_along(&line, Srid::Wgs84), 111_195.0, 10.0);
    }

    #[test]
    fn distance_along_mercator_is_scaled() {
        let a = project(Point::new(10.0, 60.0), Srid::Wgs84, Srid::WebMercator).unwrap();
        let b = project(Point::new(10.01, 60.0), Srid::Wgs84, Srid::WebMercator).unwrap();
        let line = Polyline::new(vec![a, b]).unwrap();

        let expected = earth_distance(60.0, 10.0, 60.0, 10.01);
        assert_almost_eq!(distance_along(&line, Srid::WebMercator), expected, 2.0);
    }
}
