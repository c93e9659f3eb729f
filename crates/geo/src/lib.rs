//! Geospatial primitives for urban coverage analysis.
//!
//! This crate provides:
//! - Haversine (great-circle) distance on a spherical Earth
//! - Point and polygon geometry with a cached polygon centroid
//! - GeoJSON and WKT geometry decoding for ingested facility records
//!
//! # Example
//!
//! ```
//! use urbancover_geo::{haversine_distance, Coordinate};
//!
//! let clinic = Coordinate::new(12.9716, 77.5946);
//! let home = Coordinate::new(12.9816, 77.5946);
//!
//! let distance_km = haversine_distance(&clinic, &home);
//! assert!((distance_km - 1.11).abs() < 0.01);
//! ```

mod error;
mod geometry;
mod haversine;
mod parse;

pub use error::{GeoError, GeoErrorCode, Result};
pub use geometry::{Geometry, GeometryKind, Polygon};
pub use haversine::{haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M};
pub use parse::parse_geometry;

/// A geographic coordinate with latitude and longitude (WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Returns true if the coordinate has valid values.
    ///
    /// NaN components are never valid.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Returns the coordinate unchanged if valid, otherwise an
    /// [`GeoError::InvalidCoordinate`] describing the offending value.
    pub fn validate(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({}, {}) is outside lat [-90, 90] / lon [-180, 180]",
                self.latitude, self.longitude
            )))
        }
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}
