//! Facility and configuration validation
//!
//! Collects every problem with an input instead of stopping at the first,
//! so a rejected record or config file can be fixed in one pass.
//!
//! # Example
//!
//! ```rust
//! use urbancover_core::validation::validate_new_facility;
//! use urbancover_coverage::NewFacility;
//!
//! let record = NewFacility::point("", "hospital", 95.0, 0.0);
//! let result = validate_new_facility(&record);
//!
//! assert!(!result.is_valid());
//! assert_eq!(result.errors().len(), 2);
//! ```

use crate::error::{Error, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use urbancover_coverage::{FacilityUpdate, NewFacility, OwnerTag};
use urbancover_geo::{GeoError, Geometry};

/// Longest accepted facility name
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted category name
pub const MAX_CATEGORY_LENGTH: usize = 64;

static OWNER_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{1,64}$").unwrap());

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Convert to Result type. The error code follows the first failure.
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let code = match self.errors[0].code.as_str() {
            "COORDINATE" => ErrorCode::InvalidCoordinate,
            "GEOMETRY" => ErrorCode::InvalidGeometry,
            _ => ErrorCode::ValidationError,
        };
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        Err(Error::new(code, format!("Validation failed: {}", messages.join("; "))))
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate maximum length in characters
    pub fn max_length(mut self, field: &str, value: &str, max: usize) -> Self {
        let len = value.chars().count();
        if len > max {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be at most {} characters", max),
                code: "MAX_LENGTH".to_string(),
                expected: Some(format!("<= {} chars", max)),
                actual: Some(format!("{} chars", len)),
            });
        }
        self
    }

    /// Validate against a compiled pattern
    pub fn matches(mut self, field: &str, value: &str, pattern: &Regex, description: &str) -> Self {
        if !pattern.is_match(value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must match {}", description),
                code: "PATTERN".to_string(),
                expected: Some(description.to_string()),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate that a value is in a list of allowed values
    pub fn one_of(mut self, field: &str, value: &str, allowed: &[&str]) -> Self {
        if !allowed.contains(&value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be one of: {}", allowed.join(", ")),
                code: "ONE_OF".to_string(),
                expected: Some(allowed.join(", ")),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate a strictly positive, finite number
    pub fn positive(mut self, field: &str, value: f64) -> Self {
        if !(value.is_finite() && value > 0.0) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Must be a positive number".to_string(),
                code: "POSITIVE".to_string(),
                expected: Some("> 0".to_string()),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate every coordinate of a geometry and the polygon ring shape
    pub fn geometry(mut self, field: &str, geometry: &Geometry) -> Self {
        if let Err(err) = geometry.validate() {
            let code = match err {
                GeoError::InvalidCoordinate(_) => "COORDINATE",
                _ => "GEOMETRY",
            };
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: err.to_string(),
                code: code.to_string(),
                expected: Some("lat in [-90, 90], lon in [-180, 180]".to_string()),
                actual: None,
            });
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

fn owner_tag(validator: Validator, owner: Option<&OwnerTag>) -> Validator {
    match owner {
        Some(tag) => validator.matches("owner", tag.as_str(), &OWNER_TAG, "1-64 of [A-Za-z0-9_.-]"),
        None => validator,
    }
}

/// Validate an owner tag on its own, e.g. one taken from the command line
pub fn validate_owner(owner: &OwnerTag) -> ValidationResult {
    owner_tag(Validator::new(), Some(owner)).validate()
}

/// Validate an insert payload before storage assigns an id
pub fn validate_new_facility(facility: &NewFacility) -> ValidationResult {
    let validator = Validator::new()
        .required("name", &facility.name)
        .max_length("name", &facility.name, MAX_NAME_LENGTH)
        .required("category", &facility.category)
        .max_length("category", &facility.category, MAX_CATEGORY_LENGTH)
        .geometry("geometry", &facility.geometry);

    owner_tag(validator, facility.owner.as_ref()).validate()
}

/// Validate the fields an update would write
pub fn validate_update(update: &FacilityUpdate) -> ValidationResult {
    let mut validator = Validator::new().warn_if("update", update.is_empty(), "Update changes nothing");

    if let Some(name) = &update.name {
        validator = validator
            .required("name", name)
            .max_length("name", name, MAX_NAME_LENGTH);
    }
    if let Some(geometry) = &update.geometry {
        validator = validator.geometry("geometry", geometry);
    }

    validator.validate()
}
