//! Geometry decoding for ingested facility records.
//!
//! Supports:
//! - GeoJSON: `{"type": "Point", "coordinates": [lng, lat]}` and
//!   `{"type": "Polygon", "coordinates": [[[lng, lat], ...]]}`
//! - WKT: `POINT(lng lat)` and `POLYGON((lng lat, lng lat, ...))`
//!
//! Only the outer ring of a polygon is kept; holes do not move the
//! effective point far enough to matter for coverage radii.

use crate::{Coordinate, GeoError, Geometry, Result};

/// Parse a geometry from a JSON value holding GeoJSON or a WKT string.
///
/// # Returns
/// * `Some(Geometry)` if parsing succeeds
/// * `None` if the value is null or cannot be parsed
///
/// # Example
/// ```
/// use urbancover_geo::{parse_geometry, GeometryKind};
/// use serde_json::json;
///
/// let geojson = json!({"type": "Point", "coordinates": [77.5946, 12.9716]});
/// let point = parse_geometry(&geojson).unwrap();
/// assert_eq!(point.kind(), GeometryKind::Point);
///
/// let wkt = json!("POLYGON((77.59 12.97, 77.60 12.97, 77.60 12.98, 77.59 12.97))");
/// let polygon = parse_geometry(&wkt).unwrap();
/// assert_eq!(polygon.kind(), GeometryKind::Polygon);
/// ```
pub fn parse_geometry(value: &serde_json::Value) -> Option<Geometry> {
    if value.is_null() {
        return None;
    }

    if value.is_object() {
        return parse_geojson(value);
    }

    if let Some(wkt) = value.as_str() {
        return parse_wkt(wkt).ok();
    }

    None
}

fn parse_geojson(value: &serde_json::Value) -> Option<Geometry> {
    let coords = value.get("coordinates")?.as_array()?;
    let kind = value.get("type").and_then(|t| t.as_str());

    match kind {
        Some("Polygon") => {
            let ring = coords.first()?.as_array()?;
            let vertices = ring
                .iter()
                .map(|pair| lng_lat_pair(pair.as_array()?))
                .collect::<Option<Vec<_>>>()?;
            Some(Geometry::polygon(vertices))
        }
        // Untyped objects with a flat pair are treated as points.
        Some("Point") | None => lng_lat_pair(coords).map(Geometry::Point),
        Some(_) => None,
    }
}

fn lng_lat_pair(pair: &[serde_json::Value]) -> Option<Coordinate> {
    if pair.len() < 2 {
        return None;
    }
    let lng = pair[0].as_f64()?;
    let lat = pair[1].as_f64()?;
    Some(Coordinate::new(lat, lng))
}

/// Parse a WKT POINT or POLYGON string.
fn parse_wkt(wkt: &str) -> Result<Geometry> {
    let wkt = wkt.trim();
    let upper = wkt.to_ascii_uppercase();

    let start = wkt.find('(').ok_or_else(|| GeoError::InvalidWkt("Missing '('".into()))?;
    let end = wkt.rfind(')').ok_or_else(|| GeoError::InvalidWkt("Missing ')'".into()))?;
    if start >= end {
        return Err(GeoError::InvalidWkt("Invalid parentheses".into()));
    }
    let body = &wkt[start + 1..end];

    if upper.starts_with("POINT") {
        return parse_wkt_coordinate(body).map(Geometry::Point);
    }

    if upper.starts_with("POLYGON") {
        // Outer ring only: text between the first pair of inner parentheses.
        let ring = body
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.split(')').next())
            .ok_or_else(|| GeoError::InvalidWkt(format!("Expected ((ring)), got: {}", wkt)))?;
        let vertices = ring
            .split(',')
            .map(parse_wkt_coordinate)
            .collect::<Result<Vec<_>>>()?;
        return Ok(Geometry::polygon(vertices));
    }

    Err(GeoError::InvalidWkt(format!("Expected POINT or POLYGON, got: {}", wkt)))
}

/// Parse `lng lat` from a WKT coordinate tuple.
fn parse_wkt_coordinate(text: &str) -> Result<Coordinate> {
    let parts: Vec<&str> = text.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(GeoError::InvalidWkt(format!(
            "Expected 2 coordinates, got {}",
            parts.len()
        )));
    }

    let lng: f64 = parts[0]
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid longitude: {}", parts[0])))?;
    let lat: f64 = parts[1]
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid latitude: {}", parts[1])))?;

    Ok(Coordinate::new(lat, lng))
}
