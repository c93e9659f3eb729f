//! Loose facility records for bulk import
//!
//! Accepts a JSON array of records or a GeoJSON `FeatureCollection` whose
//! features carry the record fields in `properties`. A record locates the
//! facility with `lat`/`lon` or with a `geometry` given as GeoJSON, WKT, or
//! the tagged form used in snapshots.

use crate::error::{Error, ErrorCode, Result};
use crate::store::{FacilityStore, ImportSummary, RejectedRecord, Scope};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use urbancover_coverage::{Capacity, NewFacility, OwnerTag};
use urbancover_geo::{parse_geometry, Geometry};

/// Name given to records that arrive without one
pub const UNKNOWN_FACILITY_NAME: &str = "Unknown Facility";

/// One facility as found in an import file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub category: String,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(default, alias = "lng", alias = "longitude")]
    pub lon: Option<f64>,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl FacilityRecord {
    /// Resolve the record into an insert payload.
    ///
    /// `geometry` wins over `lat`/`lon` when it decodes. Missing capacity
    /// defaults; non-positive capacity is an error.
    pub fn into_new_facility(self) -> Result<NewFacility> {
        let geometry = self
            .geometry
            .as_ref()
            .and_then(decode_geometry)
            .or_else(|| match (self.lat, self.lon) {
                (Some(lat), Some(lon)) => Some(Geometry::point(lat, lon)),
                _ => None,
            })
            .ok_or_else(|| {
                Error::new(ErrorCode::InvalidGeometry, "Record has no usable geometry or lat/lon")
            })?;

        let capacity = match self.capacity {
            Some(raw) => Capacity::new(raw)?,
            None => Capacity::DEFAULT,
        };

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_FACILITY_NAME.to_string());

        Ok(NewFacility {
            name,
            category: self.category,
            geometry,
            capacity,
            owner: self.owner.map(OwnerTag::new),
        })
    }
}

fn decode_geometry(value: &Value) -> Option<Geometry> {
    parse_geometry(value).or_else(|| serde_json::from_value(value.clone()).ok())
}

/// Split an import document into raw records.
///
/// Features of a `FeatureCollection` become their `properties` with the
/// feature geometry attached.
pub fn parse_records(input: &str) -> Result<Vec<Value>> {
    let document: Value = serde_json::from_str(input)?;

    match document {
        Value::Array(records) => Ok(records),
        Value::Object(ref object) if object.get("type").and_then(Value::as_str) == Some("FeatureCollection") => {
            let features = object
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::new(ErrorCode::InvalidInput, "FeatureCollection without features"))?;
            Ok(features.iter().map(feature_to_record).collect())
        }
        _ => Err(Error::new(
            ErrorCode::InvalidInput,
            "Expected a JSON array of facilities or a GeoJSON FeatureCollection",
        )),
    }
}

fn feature_to_record(feature: &Value) -> Value {
    let mut record = feature
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(geometry) = feature.get("geometry").filter(|g| !g.is_null()) {
        record.insert("geometry".to_string(), geometry.clone());
    }
    Value::Object(record)
}

/// Decode a single raw record
pub fn decode_record(value: Value) -> Result<NewFacility> {
    let record: FacilityRecord = serde_json::from_value(value)?;
    record.into_new_facility()
}

/// Decode and import raw records. Indices in the summary refer to
/// positions in `records`.
pub fn import_records(
    store: &dyn FacilityStore,
    scope: &Scope,
    records: Vec<Value>,
    dedupe: bool,
    progress: &mut dyn FnMut(),
) -> Result<ImportSummary> {
    let mut rejected = Vec::new();
    let mut decoded = Vec::with_capacity(records.len());
    let mut positions = Vec::with_capacity(records.len());

    for (index, value) in records.into_iter().enumerate() {
        match decode_record(value) {
            Ok(facility) => {
                positions.push(index);
                decoded.push(facility);
            }
            Err(err) => {
                tracing::debug!(index, error = %err.message, "Record rejected while decoding");
                progress();
                rejected.push(RejectedRecord {
                    index,
                    reason: err.message,
                });
            }
        }
    }

    let mut summary = store.import_with_progress(scope, decoded, dedupe, progress)?;
    for record in &mut summary.rejected {
        record.index = positions[record.index];
    }
    summary.rejected.extend(rejected);
    summary.rejected.sort_by_key(|r| r.index);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use urbancover_geo::GeometryKind;

    #[test]
    fn test_record_with_lat_lon() {
        let facility = decode_record(json!({"name": "ATM 1", "category": "atm", "lat": 12.9, "lng": 77.6})).unwrap();
        assert_eq!(facility.geometry, Geometry::point(12.9, 77.6));
        assert_eq!(facility.capacity, Capacity::DEFAULT);
    }

    #[test]
    fn test_record_defaults_name() {
        let facility = decode_record(json!({"category": "bank", "latitude": 1.0, "longitude": 2.0})).unwrap();
        assert_eq!(facility.name, UNKNOWN_FACILITY_NAME);
    }

    #[test]
    fn test_record_with_wkt_polygon() {
        let facility = decode_record(json!({
            "name": "Campus",
            "category": "school",
            "capacity": 200,
            "geometry": "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))"
        }))
        .unwrap();
        assert_eq!(facility.geometry.kind(), GeometryKind::Polygon);
        assert_eq!(facility.capacity.get(), 200);
    }

    #[test]
    fn test_record_rejects_zero_capacity() {
        let err = decode_record(json!({"category": "atm", "lat": 0.0, "lon": 0.0, "capacity": 0})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCapacity);
    }

    #[test]
    fn test_record_without_location() {
        let err = decode_record(json!({"name": "Ghost", "category": "atm"})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidGeometry);
    }

    #[test]
    fn test_parse_feature_collection() {
        let input = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [77.59, 12.97]},
                    "properties": {"name": "City Hospital", "category": "hospital"}
                }
            ]
        })
        .to_string();

        let records = parse_records(&input).unwrap();
        assert_eq!(records.len(), 1);
        let facility = decode_record(records[0].clone()).unwrap();
        assert_eq!(facility.geometry, Geometry::point(12.97, 77.59));
    }

    #[test]
    fn test_parse_rejects_scalar_document() {
        let err = parse_records("42").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_import_records_reports_original_indices() {
        let store = MemoryStore::new();
        let records = vec![
            json!({"category": "atm"}),
            json!({"name": "Bank", "category": "bank", "lat": 1.0, "lon": 1.0}),
            json!({"name": "Far", "category": "bank", "lat": 100.0, "lon": 1.0}),
            json!({"name": "Bank 2", "category": "bank", "lat": 1.0, "lon": 1.0}),
        ];

        let mut ticks = 0;
        let summary = import_records(&store, &Scope::All, records, true, &mut || ticks += 1).unwrap();

        assert_eq!(summary.added.len(), 1);
        assert_eq!(summary.duplicates, 1);
        let indices: Vec<usize> = summary.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(ticks, 4);
    }
}
