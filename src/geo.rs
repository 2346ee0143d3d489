//! Geographic and Geometry Module
//!
//! Spherical-geometry primitives on the mean-radius Earth sphere: haversine
//! distance, initial bearing and great-circle sampling.
//!
//! Every public angle is in degrees. Radians only appear inside function bodies.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ===================== CONSTANTS =====================

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Bearing reported when origin and destination coincide (direction is undefined)
pub const COINCIDENT_BEARING_DEG: f64 = 0.0;

/// Bearing reported for antipodal endpoints: due North, the same way the sampled
/// arc leaves the origin
pub const ANTIPODAL_BEARING_DEG: f64 = 0.0;

/// Unit-sphere chord length below which two points count as coincident, or their
/// antipodes do (about 6 mm on the ground)
const DEGENERACY_TOLERANCE_RAD: f64 = 1e-9;

// ===================== TYPES =====================

/// A point on the Earth's surface in decimal degrees.
///
/// Latitude is validated to [-90, 90]; longitude is wrapped into [-180, 180).
/// Deserialization goes through the same checks as [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatLon")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

/// Unchecked wire form of a [`Coordinate`]
#[derive(Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

impl TryFrom<LatLon> for Coordinate {
    type Error = Error;

    fn try_from(raw: LatLon) -> Result<Self> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite values and latitudes outside
    /// [-90, 90]. Longitude wraps, so 190 becomes -170.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::invalid(format!("latitude must be between -90 and 90, got {lat}")));
        }
        if !lon.is_finite() {
            return Err(Error::invalid(format!("longitude must be finite, got {lon}")));
        }
        Ok(Self { lat, lon: normalize_longitude(lon) })
    }

    /// For compile-time tables whose values are covered by tests.
    pub(crate) const fn from_trusted(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Unit vector (x toward 0°E on the equator, z toward the North pole).
    fn to_unit_vector(self) -> [f64; 3] {
        let (phi, lambda) = (self.lat.to_radians(), self.lon.to_radians());
        [phi.cos() * lambda.cos(), phi.cos() * lambda.sin(), phi.sin()]
    }

    fn from_unit_vector(v: [f64; 3]) -> Self {
        let lat = v[2].clamp(-1.0, 1.0).asin().to_degrees();
        let lon = v[1].atan2(v[0]).to_degrees();
        Self { lat, lon: normalize_longitude(lon) }
    }
}

/// Degenerate endpoint pairs for which direction or path is not unique.
///
/// Neither case is an error: bearings fall back to [`COINCIDENT_BEARING_DEG`] /
/// [`ANTIPODAL_BEARING_DEG`] and the sampled arc follows the documented tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguousGeometry {
    /// Origin and destination are the same point; bearing is undefined.
    Coincident,
    /// Origin and destination are antipodal; infinitely many shortest paths exist.
    Antipodal,
}

// ===================== GEOMETRY FUNCTIONS =====================

/// Wrap a longitude into [-180, 180).
pub fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Central angle between two points in radians (haversine form).
fn central_angle(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodes, which would make sqrt(1 - h) NaN
    let h = h.clamp(0.0, 1.0);
    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance between two points in kilometres (haversine formula).
///
/// # Returns
/// Distance in km; exactly 0 for identical points, π × 6371 for antipodes
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    EARTH_RADIUS_KM * central_angle(a, b)
}

/// Classify the pair as coincident or antipodal, if it is either.
///
/// Works on chord lengths between unit vectors, which stay accurate near π where
/// the haversine angle does not.
pub fn ambiguity(a: Coordinate, b: Coordinate) -> Option<AmbiguousGeometry> {
    let (u, v) = (a.to_unit_vector(), b.to_unit_vector());
    if norm(sub(u, v)) < DEGENERACY_TOLERANCE_RAD {
        Some(AmbiguousGeometry::Coincident)
    } else if norm(add(u, v)) < DEGENERACY_TOLERANCE_RAD {
        Some(AmbiguousGeometry::Antipodal)
    } else {
        None
    }
}

/// Initial (forward) bearing at `a` toward `b`.
///
/// # Returns
/// Degrees clockwise from true North in [0, 360). Coincident points yield
/// [`COINCIDENT_BEARING_DEG`], antipodal points [`ANTIPODAL_BEARING_DEG`].
pub fn initial_bearing(a: Coordinate, b: Coordinate) -> f64 {
    match ambiguity(a, b) {
        Some(AmbiguousGeometry::Coincident) => return COINCIDENT_BEARING_DEG,
        Some(AmbiguousGeometry::Antipodal) => return ANTIPODAL_BEARING_DEG,
        None => {}
    }

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    // -0.0 and values that round up to 360.0 both belong at 0
    if bearing >= 360.0 || bearing == 0.0 { 0.0 } else { bearing }
}

// ===================== GREAT CIRCLE =====================

/// Spherical linear interpolation between two points.
///
/// Antipodal endpoints leave the origin due North. When the origin is itself a
/// pole, "North" is undefined and the path follows the prime meridian instead.
#[derive(Debug, Clone, Copy)]
pub struct GreatCircle {
    start: [f64; 3],
    /// Unit tangent at `start` pointing along the path
    tangent: [f64; 3],
    /// Total angular length in radians
    omega: f64,
}

impl GreatCircle {
    pub fn new(a: Coordinate, b: Coordinate) -> Self {
        let start = a.to_unit_vector();
        let end = b.to_unit_vector();
        let omega = norm(cross(start, end)).atan2(dot(start, end));

        let tangent = match ambiguity(a, b) {
            Some(AmbiguousGeometry::Coincident) => [0.0; 3],
            Some(AmbiguousGeometry::Antipodal) => north_tangent(a),
            None => {
                // Component of `end` orthogonal to `start`, normalised
                let d = dot(start, end);
                normalize([end[0] - d * start[0], end[1] - d * start[1], end[2] - d * start[2]])
            }
        };

        Self { start, tangent, omega }
    }

    /// Angular length of the path in degrees.
    pub fn angular_length_deg(&self) -> f64 {
        self.omega.to_degrees()
    }

    /// Point at `fraction` of the way along the path (0 = origin, 1 = destination).
    pub fn point_at(&self, fraction: f64) -> Coordinate {
        let theta = self.omega * fraction;
        let (s, c) = theta.sin_cos();
        Coordinate::from_unit_vector([
            c * self.start[0] + s * self.tangent[0],
            c * self.start[1] + s * self.tangent[1],
            c * self.start[2] + s * self.tangent[2],
        ])
    }
}

fn north_tangent(a: Coordinate) -> [f64; 3] {
    let (phi, lambda) = (a.lat.to_radians(), a.lon.to_radians());
    if phi.cos() < 1e-12 {
        // At a pole: head toward the prime meridian
        return [1.0, 0.0, 0.0];
    }
    normalize([-phi.sin() * lambda.cos(), -phi.sin() * lambda.sin(), phi.cos()])
}

fn add(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [u[0] + v[0], u[1] + v[1], u[2] + v[2]]
}

fn sub(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [u[0] - v[0], u[1] - v[1], u[2] - v[2]]
}

fn cross(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [u[1] * v[2] - u[2] * v[1], u[2] * v[0] - u[0] * v[2], u[0] * v[1] - u[1] * v[0]]
}

fn dot(u: [f64; 3], v: [f64; 3]) -> f64 {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

fn norm(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let n = norm(v);
    [v[0] / n, v[1] / n, v[2] / n]
}

/// Sample the shortest great-circle path from `a` to `b`.
///
/// Points are spaced uniformly in angular distance, not in latitude/longitude.
///
/// # Arguments
/// * `a` - Origin
/// * `b` - Destination
/// * `segments` - Number of segments, at least 1
///
/// # Returns
/// `segments + 1` points; the first is `a`, the last is `b`
///
/// # Errors
/// `InvalidArgument` when `segments` is zero
pub fn sample_great_circle(a: Coordinate, b: Coordinate, segments: usize) -> Result<Vec<Coordinate>> {
    if segments == 0 {
        return Err(Error::invalid("segment count must be at least 1"));
    }
    if let Some(kind) = ambiguity(a, b) {
        log::debug!("great circle {:?} -> {:?} is {:?}", a, b, kind);
    }

    let circle = GreatCircle::new(a, b);
    let mut points: Vec<Coordinate> =
        (0..=segments).map(|i| circle.point_at(i as f64 / segments as f64)).collect();

    // Pin the endpoints to the inputs so consumers can compare them exactly
    points[0] = a;
    points[segments] = b;
    Ok(points)
}

// ===================== TESTS =====================
