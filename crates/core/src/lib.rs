//! Application layer for urban coverage analysis
//!
//! This crate ties the pure analysis crates to persistent state:
//!
//! - **Error handling**: coded errors with context and recovery suggestions
//! - **Configuration**: TOML configuration with validation
//! - **Validation**: facility and update checks before storage
//! - **Storage**: owner-scoped facility store with JSON snapshots
//! - **Ingestion**: loose JSON and GeoJSON records for bulk import
//!
//! # Example
//!
//! ```rust
//! use urbancover_core::prelude::*;
//! use urbancover_coverage::{CoverageAnalyzer, NewFacility};
//! use urbancover_geo::Coordinate;
//!
//! let store = MemoryStore::new();
//! store.insert(&Scope::All, NewFacility::point("City Hospital", "hospital", 0.0, 0.0))?;
//!
//! let candidates = store.list(&Scope::All)?;
//! let report = CoverageAnalyzer::default().analyze(Coordinate::new(0.01, 0.0), None, &candidates)?;
//! assert!(!report.desert);
//! # Ok::<(), urbancover_core::Error>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod store;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::ingest::{import_records, parse_records, FacilityRecord};
    pub use crate::store::{FacilityStore, ImportSummary, MemoryStore, Scope};
    pub use crate::validation::{ValidationResult, Validator};
}
