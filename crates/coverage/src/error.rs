//! Error types for the coverage crate.

use thiserror::Error;
use urbancover_geo::GeoError;

/// Result type alias for coverage operations.
pub type Result<T> = std::result::Result<T, CoverageError>;

/// Contract violations signalled to the immediate caller.
///
/// Expected conditions (empty candidate sets, unknown categories, low
/// density, unusable candidate geometry) are never errors.
#[derive(Debug, Error)]
pub enum CoverageError {
    /// Query point outside lat [-90, 90] / lon [-180, 180]
    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Capacity must be a positive integer
    #[error("Invalid capacity: {0} (must be > 0)")]
    InvalidCapacity(i64),

    /// Search radius must be finite and non-negative
    #[error("Invalid radius: {0} km")]
    InvalidRadius(f64),

    /// Geometry error from the geo layer
    #[error(transparent)]
    Geo(#[from] GeoError),
}

/// Error code for integration with urbancover-core error handling.
/// Range: 11xxx for coverage errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageErrorCode {
    /// Invalid query coordinate
    InvalidCoordinate = 11001,
    /// Non-positive capacity
    InvalidCapacity = 11002,
    /// Negative or non-finite radius
    InvalidRadius = 11003,
    /// Geometry error
    Geometry = 11004,
}

impl CoverageError {
    /// Returns the error code for this error.
    pub fn code(&self) -> CoverageErrorCode {
        match self {
            CoverageError::InvalidCoordinate { .. } => CoverageErrorCode::InvalidCoordinate,
            CoverageError::InvalidCapacity(_) => CoverageErrorCode::InvalidCapacity,
            CoverageError::InvalidRadius(_) => CoverageErrorCode::InvalidRadius,
            CoverageError::Geo(_) => CoverageErrorCode::Geometry,
        }
    }
}
