//! Coordinate conversion and planar distance primitives

use geo::Point;

/// Web Mercator bounds in meters (EPSG:3857): PI * equatorial radius.
/// The full precision matters: a truncated bound rejects points clamped to
/// the maximum representable latitude.
pub const EARTH_MERCATOR_MAX: f64 = 20037508.342789244;
pub const EARTH_MERCATOR_MIN: f64 = -20037508.342789244;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Precomputed constant: EARTH_MERCATOR_MAX / 180.0
const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / PI
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters
///
/// # Arguments
/// * `lat` - Latitude in degrees (clamped to -85.05 to 85.05)
/// * `lon` - Longitude in degrees (-180 to 180)
///
/// # Returns
/// A `Point<f64>` with x (easting) and y (northing) in meters
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    // Clamp latitude to valid Web Mercator range
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = lon * LON_TO_X_FACTOR;

    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;

    Point::new(x, y)
}

/// Tolerance for points sitting on the Mercator boundary: `MAX_LATITUDE`
/// is a rounded constant, so a clamped pole projects a fraction of a
/// millimeter past the exact bound
const BOUNDS_EPSILON: f64 = 1e-3;

/// Check if a point is within Web Mercator bounds
#[inline(always)]
pub fn is_valid_mercator(point: &Point<f64>) -> bool {
    let x = point.x();
    let y = point.y();
    x >= EARTH_MERCATOR_MIN - BOUNDS_EPSILON
        && x <= EARTH_MERCATOR_MAX + BOUNDS_EPSILON
        && y >= EARTH_MERCATOR_MIN - BOUNDS_EPSILON
        && y <= EARTH_MERCATOR_MAX + BOUNDS_EPSILON
}

/// Distance from `p` to the closed segment `[a, b]`, all in the same planar
/// coordinate space.
///
/// Projects `p` onto the segment's supporting line, clamps the projection
/// parameter to `[0, 1]` so endpoints are honored, and returns the Euclidean
/// distance to the clamped foot point.
#[inline]
pub fn point_to_segment_distance(p: Point<f64>, a: Point<f64>, b: Point<f64>) -> f64 {
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();
    let len_sq = dx * dx + dy * dy;

    // Degenerate segment: both endpoints coincide
    if len_sq == 0.0 {
        return ((p.x() - a.x()).powi(2) + (p.y() - a.y()).powi(2)).sqrt();
    }

    let t = (((p.x() - a.x()) * dx + (p.y() - a.y()) * dy) / len_sq).clamp(0.0, 1.0);
    let foot_x = a.x() + t * dx;
    let foot_y = a.y() + t * dy;

    ((p.x() - foot_x).powi(2) + (p.y() - foot_y).powi(2)).sqrt()
}
