//! CLI command implementations

pub mod config;
pub mod facility;
pub mod import;
pub mod query;
pub mod range;

use crate::LocationArgs;
use serde::Serialize;
use urbancover_core::error::{Error, ErrorCode, Result};
use urbancover_geo::{parse_geometry, Geometry};

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Geometry given on the command line, if any.
///
/// `--geometry` is read as JSON first and as a WKT string otherwise.
pub fn location_geometry(location: &LocationArgs) -> Result<Option<Geometry>> {
    if let Some(raw) = &location.geometry {
        let value = serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.clone()));
        return parse_geometry(&value)
            .map(Some)
            .ok_or_else(|| Error::new(ErrorCode::InvalidGeometry, format!("Unparseable geometry: {}", raw)));
    }

    Ok(match (location.lat, location.lon) {
        (Some(lat), Some(lon)) => Some(Geometry::point(lat, lon)),
        _ => None,
    })
}
