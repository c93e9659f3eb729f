//! Haversine distance calculation.
//!
//! Great-circle distance on a sphere of fixed mean Earth radius. This is the
//! only distance metric used for coverage decisions.

use crate::Coordinate;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// # Example
/// ```
/// use urbancover_geo::{haversine_distance, Coordinate};
///
/// let mumbai = Coordinate::new(19.0760, 72.8777);
/// let delhi = Coordinate::new(28.6139, 77.2090);
///
/// let distance = haversine_distance(&mumbai, &delhi);
/// assert!((distance - 1148.0).abs() < 10.0);
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Calculates the great-circle distance between two coordinates in meters.
#[inline]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

#[inline]
fn haversine_distance_with_radius(from: &Coordinate, to: &Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // a can exceed 1.0 by rounding for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    radius * c
}
