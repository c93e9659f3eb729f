//! Facility footprints: a single point or a polygon with a cached centroid.
//!
//! A polygon's effective point is always derived from its vertex ring. The
//! centroid is rebuilt whenever the ring changes (including on
//! deserialization) and is never stored on its own.

use crate::{Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this absolute ring area (square degrees) the polygon is treated as
/// degenerate and its centroid falls back to the vertex mean.
const DEGENERATE_AREA: f64 = 1e-12;

/// Discriminant of a [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Polygon,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryKind::Point => write!(f, "POINT"),
            GeometryKind::Polygon => write!(f, "POLYGON"),
        }
    }
}

/// Location of a facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Geometry {
    /// A single coordinate.
    Point(Coordinate),
    /// A vertex ring with a derived centroid.
    Polygon(Polygon),
}

impl Geometry {
    /// Shorthand for a point geometry.
    pub fn point(latitude: f64, longitude: f64) -> Self {
        Geometry::Point(Coordinate::new(latitude, longitude))
    }

    /// Shorthand for a polygon geometry built from a vertex ring.
    pub fn polygon(vertices: Vec<Coordinate>) -> Self {
        Geometry::Polygon(Polygon::new(vertices))
    }

    /// Returns which variant this is.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// The point used for distance computations: the coordinate itself for
    /// points, the centroid for polygons. `None` for an empty polygon.
    pub fn effective_point(&self) -> Option<Coordinate> {
        match self {
            Geometry::Point(coord) => Some(*coord),
            Geometry::Polygon(polygon) => polygon.centroid(),
        }
    }

    /// Checks that every coordinate is in range and that polygons have at
    /// least three distinct vertices.
    pub fn validate(&self) -> Result<()> {
        match self {
            Geometry::Point(coord) => coord.validate().map(|_| ()),
            Geometry::Polygon(polygon) => polygon.validate(),
        }
    }
}

/// A polygon footprint. Construct with [`Polygon::new`]; the centroid is
/// recomputed by every method that changes the ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PolygonShape", into = "PolygonShape")]
pub struct Polygon {
    vertices: Vec<Coordinate>,
    centroid: Option<Coordinate>,
}

#[derive(Serialize, Deserialize)]
struct PolygonShape {
    vertices: Vec<Coordinate>,
}

impl From<PolygonShape> for Polygon {
    fn from(shape: PolygonShape) -> Self {
        Polygon::new(shape.vertices)
    }
}

impl From<Polygon> for PolygonShape {
    fn from(polygon: Polygon) -> Self {
        PolygonShape { vertices: polygon.vertices }
    }
}

impl Polygon {
    /// Builds a polygon from its ring. The ring may be open or closed
    /// (first vertex repeated at the end).
    pub fn new(vertices: Vec<Coordinate>) -> Self {
        let centroid = compute_centroid(&vertices);
        Self { vertices, centroid }
    }

    /// The vertex ring as supplied.
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Replaces the ring and recomputes the centroid.
    pub fn set_vertices(&mut self, vertices: Vec<Coordinate>) {
        self.centroid = compute_centroid(&vertices);
        self.vertices = vertices;
    }

    /// Cached centroid, `None` when the ring is empty.
    pub fn centroid(&self) -> Option<Coordinate> {
        self.centroid
    }

    fn validate(&self) -> Result<()> {
        if let Some(bad) = self.vertices.iter().find(|v| !v.is_valid()) {
            return Err(GeoError::InvalidCoordinate(format!("polygon vertex {} is out of range", bad)));
        }
        let distinct = distinct_vertices(&self.vertices).len();
        if distinct < 3 {
            return Err(GeoError::InvalidGeometry(format!(
                "polygon needs at least 3 distinct vertices, got {}",
                distinct
            )));
        }
        Ok(())
    }
}

/// Drops the closing vertex of a closed ring.
fn distinct_vertices(vertices: &[Coordinate]) -> &[Coordinate] {
    match vertices {
        [first, .., last] if first == last => &vertices[..vertices.len() - 1],
        _ => vertices,
    }
}

/// Area-weighted planar centroid over (lon, lat), falling back to the vertex
/// mean for degenerate rings.
fn compute_centroid(vertices: &[Coordinate]) -> Option<Coordinate> {
    let ring = distinct_vertices(vertices);
    let origin = *ring.first()?;

    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;

    for (i, current) in ring.iter().enumerate() {
        let next = ring[(i + 1) % ring.len()];
        // Shift to the first vertex to keep the cross products small.
        let (x0, y0) = (current.longitude - origin.longitude, current.latitude - origin.latitude);
        let (x1, y1) = (next.longitude - origin.longitude, next.latitude - origin.latitude);
        let cross = x0 * y1 - x1 * y0;
        twice_area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }

    if twice_area.abs() < DEGENERATE_AREA {
        let n = ring.len() as f64;
        let lat = ring.iter().map(|c| c.latitude).sum::<f64>() / n;
        let lon = ring.iter().map(|c| c.longitude).sum::<f64>() / n;
        return Some(Coordinate::new(lat, lon));
    }

    let factor = 1.0 / (3.0 * twice_area);
    Some(Coordinate::new(
        origin.latitude + cy * factor,
        origin.longitude + cx * factor,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lat: f64, lon: f64, side: f64) -> Vec<Coordinate> {
        vec![
            Coordinate::new(lat, lon),
            Coordinate::new(lat, lon + side),
            Coordinate::new(lat + side, lon + side),
            Coordinate::new(lat + side, lon),
        ]
    }

    #[test]
    fn test_square_centroid() {
        let polygon = Polygon::new(square(10.0, 20.0, 2.0));
        let c = polygon.centroid().unwrap();
        assert!((c.latitude - 11.0).abs() < 1e-9);
        assert!((c.longitude - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_closed_ring_matches_open_ring() {
        let mut closed = square(10.0, 20.0, 2.0);
        closed.push(closed[0]);
        let open = Polygon::new(square(10.0, 20.0, 2.0));
        let closed = Polygon::new(closed);
        let (a, b) = (open.centroid().unwrap(), closed.centroid().unwrap());
        assert!((a.latitude - b.latitude).abs() < 1e-9);
        assert!((a.longitude - b.longitude).abs() < 1e-9);
    }

    #[test]
    fn test_l_shape_centroid_is_area_weighted() {
        // Unit squares at (0,0),(1,0),(0,1): centroid (lon, lat) = (5/6, 5/6)
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 2.0),
            Coordinate::new(1.0, 2.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(2.0, 1.0),
            Coordinate::new(2.0, 0.0),
        ];
        let c = Polygon::new(ring).centroid().unwrap();
        assert!((c.latitude - 5.0 / 6.0).abs() < 1e-9, "{}", c);
        assert!((c.longitude - 5.0 / 6.0).abs() < 1e-9, "{}", c);
    }

    #[test]
    fn test_degenerate_ring_uses_vertex_mean() {
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(2.0, 2.0),
        ];
        let c = Polygon::new(ring).centroid().unwrap();
        assert!((c.latitude - 1.0).abs() < 1e-9);
        assert!((c.longitude - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_polygon_has_no_effective_point() {
        let geometry = Geometry::polygon(Vec::new());
        assert!(geometry.effective_point().is_none());
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_set_vertices_recomputes_centroid() {
        let mut polygon = Polygon::new(square(0.0, 0.0, 2.0));
        polygon.set_vertices(square(40.0, 40.0, 2.0));
        let c = polygon.centroid().unwrap();
        assert!((c.latitude - 41.0).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_needs_three_distinct_vertices() {
        let line = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 0.0),
        ];
        let err = Geometry::polygon(line).validate().unwrap_err();
        assert!(matches!(err, GeoError::InvalidGeometry(_)));
    }

    #[test]
    fn test_point_effective_point() {
        let geometry = Geometry::point(12.97, 77.59);
        assert_eq!(geometry.kind(), GeometryKind::Point);
        assert_eq!(geometry.effective_point(), Some(Coordinate::new(12.97, 77.59)));
    }

    #[test]
    fn test_serde_rebuilds_centroid() {
        let geometry = Geometry::polygon(square(10.0, 20.0, 2.0));
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(json["kind"], "polygon");
        assert!(json.get("centroid").is_none());

        let back: Geometry = serde_json::from_value(json).unwrap();
        assert_eq!(back, geometry);
        assert!(back.effective_point().is_some());
    }

    #[test]
    fn test_point_serde_shape() {
        let json = serde_json::to_value(Geometry::point(1.5, 2.5)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "point", "latitude": 1.5, "longitude": 2.5}));
    }
}
