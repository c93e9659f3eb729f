//! Facility range model and coverage analysis.
//!
//! This crate provides:
//! - The facility data contract read from storage (point or polygon footprint,
//!   capacity, optional owner tag)
//! - [`RangeModel`]: effective service radius from category, capacity and
//!   population density
//! - [`CoverageAnalyzer`]: radius queries, per-category coverage scores and
//!   service-desert verdicts using haversine distance
//!
//! Everything here is synchronous and side-effect free; callers fetch and
//! scope the candidate facilities.
//!
//! # Example
//!
//! ```
//! use urbancover_coverage::{CoverageAnalyzer, Facility, FacilityId, NewFacility};
//! use urbancover_geo::Coordinate;
//!
//! let candidates = vec![
//!     Facility::from_new(FacilityId(1), NewFacility::point("City Hospital", "hospital", 0.0, 0.0)),
//! ];
//!
//! let report = CoverageAnalyzer::default()
//!     .analyze(Coordinate::new(0.01, 0.0), Some(1000.0), &candidates)
//!     .unwrap();
//!
//! assert!(!report.desert);
//! assert_eq!(report.nearby[0].max_range_km, 5.0);
//! ```

pub mod analyzer;
mod error;
pub mod facility;
pub mod range;

pub use analyzer::{
    category_label, coverage_score, AnalysisSettings, CategoryCoverage, CategoryOfInterest,
    CoverageAnalyzer, CoverageReport, DesertCheck, FacilityMatch, ScoredFacility, Severity,
};
pub use error::{CoverageError, CoverageErrorCode, Result};
pub use facility::{Capacity, Facility, FacilityId, FacilityUpdate, NewFacility, OwnerTag, DEFAULT_CAPACITY};
pub use range::{category_key, RangeConfig, RangeModel};
