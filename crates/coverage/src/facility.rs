//! Facility records as read by the analyzer.
//!
//! Facilities are owned by the storage layer. The analyzer only reads them
//! and derives range, distance and coverage flags that are never persisted.

use crate::{CoverageError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use urbancover_geo::{Coordinate, Geometry, GeometryKind};

/// Capacity assumed when a record does not carry one.
pub const DEFAULT_CAPACITY: u32 = 50;

/// Opaque facility identifier, assigned by storage at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub u64);

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner/session tag scoping a facility to the client that submitted it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerTag(String);

impl OwnerTag {
    /// Wraps a tag. Format checks belong to the storage layer.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relative facility size or throughput. Always positive.
///
/// Use [`Capacity::new`] to reject non-positive input, or
/// [`Capacity::floored`] to repair it to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Capacity(NonZeroU32);

impl Capacity {
    /// The reference capacity of a standard facility.
    pub const DEFAULT: Capacity = match NonZeroU32::new(DEFAULT_CAPACITY) {
        Some(value) => Capacity(value),
        None => panic!("DEFAULT_CAPACITY must be non-zero"),
    };

    /// Accepts a capacity in `1..=u32::MAX`.
    pub fn new(raw: i64) -> Result<Self> {
        u32::try_from(raw)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(CoverageError::InvalidCapacity(raw))
    }

    /// Clamps input into `1..=u32::MAX` instead of rejecting it.
    pub fn floored(raw: i64) -> Self {
        if raw <= 0 {
            tracing::warn!(capacity = raw, "Non-positive capacity floored to 1");
        } else if raw > i64::from(u32::MAX) {
            tracing::warn!(capacity = raw, "Capacity clamped to u32::MAX");
        }
        let value = u32::try_from(raw.clamp(1, i64::from(u32::MAX))).unwrap_or(u32::MAX);
        Self(NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN))
    }

    /// The capacity as an integer.
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Capacity {
    type Error = CoverageError;

    fn try_from(raw: i64) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<Capacity> for u32 {
    fn from(capacity: Capacity) -> Self {
        capacity.get()
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// A stored service point (hospital, ATM, school, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    /// Display label, not unique
    pub name: String,
    /// Open set of category names, e.g. `hospital`, `atm`, `petrol_pump`
    pub category: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub capacity: Capacity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerTag>,
}

impl Facility {
    /// Materializes an insert payload under a storage-assigned id.
    pub fn from_new(id: FacilityId, new: NewFacility) -> Self {
        Self {
            id,
            name: new.name,
            category: new.category,
            geometry: new.geometry,
            capacity: new.capacity,
            owner: new.owner,
        }
    }

    /// Point used for distance computations, `None` for an empty polygon.
    #[inline]
    pub fn effective_point(&self) -> Option<Coordinate> {
        self.geometry.effective_point()
    }

    /// Point or polygon.
    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }
}

/// Insert payload. Storage assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFacility {
    pub name: String,
    pub category: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub capacity: Capacity,
    #[serde(default)]
    pub owner: Option<OwnerTag>,
}

impl NewFacility {
    /// A point facility with default capacity and no owner.
    pub fn point(name: impl Into<String>, category: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            geometry: Geometry::point(latitude, longitude),
            capacity: Capacity::DEFAULT,
            owner: None,
        }
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the owner tag.
    pub fn with_owner(mut self, owner: OwnerTag) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Destructive in-place update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capacity: Option<Capacity>,
    /// Replacing the geometry rebuilds a polygon's centroid.
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl FacilityUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.capacity.is_none() && self.geometry.is_none()
    }

    /// Overwrites the facility's fields with every `Some` value.
    pub fn apply(self, facility: &mut Facility) {
        if let Some(name) = self.name {
            facility.name = name;
        }
        if let Some(capacity) = self.capacity {
            facility.capacity = capacity;
        }
        if let Some(geometry) = self.geometry {
            facility.geometry = geometry;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use urbancover_geo::Coordinate;

    #[test]
    fn test_capacity_rejects_non_positive() {
        assert!(matches!(Capacity::new(0), Err(CoverageError::InvalidCapacity(0))));
        assert!(matches!(Capacity::new(-5), Err(CoverageError::InvalidCapacity(-5))));
        assert_eq!(Capacity::new(75).unwrap().get(), 75);
    }

    #[test]
    fn test_capacity_rejects_overflow() {
        let too_big = i64::from(u32::MAX) + 1;
        assert!(matches!(Capacity::new(too_big), Err(CoverageError::InvalidCapacity(v)) if v == too_big));
        assert_eq!(Capacity::new(i64::from(u32::MAX)).unwrap().get(), u32::MAX);
        assert!(serde_json::from_value::<Capacity>(json!(too_big)).is_err());
    }

    #[test]
    fn test_capacity_floor() {
        assert_eq!(Capacity::floored(0).get(), 1);
        assert_eq!(Capacity::floored(-10).get(), 1);
        assert_eq!(Capacity::floored(20).get(), 20);
        assert_eq!(Capacity::floored(i64::MAX).get(), u32::MAX);
    }

    #[test]
    fn test_capacity_default() {
        assert_eq!(Capacity::default().get(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_capacity_deserialization_rejects_zero() {
        assert!(serde_json::from_value::<Capacity>(json!(0)).is_err());
        assert_eq!(serde_json::from_value::<Capacity>(json!(30)).unwrap().get(), 30);
    }

    #[test]
    fn test_facility_defaults_capacity() {
        let facility: Facility = serde_json::from_value(json!({
            "id": 7,
            "name": "City Hospital",
            "category": "hospital",
            "geometry": {"kind": "point", "latitude": 12.97, "longitude": 77.59}
        }))
        .unwrap();
        assert_eq!(facility.capacity, Capacity::DEFAULT);
        assert_eq!(facility.id, FacilityId(7));
        assert!(facility.owner.is_none());
    }

    #[test]
    fn test_update_replaces_polygon_and_centroid() {
        let mut facility = Facility::from_new(FacilityId(1), NewFacility::point("Depot", "petrol_pump", 0.0, 0.0));
        let ring = vec![
            Coordinate::new(10.0, 10.0),
            Coordinate::new(10.0, 12.0),
            Coordinate::new(12.0, 12.0),
            Coordinate::new(12.0, 10.0),
        ];
        FacilityUpdate {
            name: Some("Depot North".into()),
            geometry: Some(Geometry::polygon(ring)),
            ..Default::default()
        }
        .apply(&mut facility);

        assert_eq!(facility.name, "Depot North");
        assert_eq!(facility.kind(), GeometryKind::Polygon);
        let c = facility.effective_point().unwrap();
        assert!((c.latitude - 11.0).abs() < 1e-9);
        assert_eq!(facility.capacity, Capacity::DEFAULT);
    }

    #[test]
    fn test_empty_update() {
        assert!(FacilityUpdate::default().is_empty());
    }
}
