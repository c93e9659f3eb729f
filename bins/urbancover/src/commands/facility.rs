//! Facility commands - add, update, remove and list

use super::{location_geometry, print_json};
use crate::context::AppContext;
use crate::LocationArgs;
use anyhow::Result;
use owo_colors::OwoColorize;
use urbancover_cli::output::{format_count, Status};
use urbancover_core::error::{Error, ErrorCode};
use urbancover_core::store::FacilityStore;
use urbancover_coverage::{category_key, Capacity, Facility, FacilityId, FacilityUpdate, NewFacility};

fn capacity_arg(raw: Option<i64>) -> urbancover_core::Result<Option<Capacity>> {
    raw.map(Capacity::new).transpose().map_err(Into::into)
}

pub fn add(ctx: &AppContext, name: String, category: String, location: &LocationArgs, capacity: Option<i64>) -> Result<()> {
    let geometry = location_geometry(location)?.ok_or_else(|| {
        Error::new(ErrorCode::InvalidInput, "A location is required")
            .with_suggestion("Pass --lat and --lon, or --geometry")
    })?;

    let new = NewFacility {
        name,
        category,
        geometry,
        capacity: capacity_arg(capacity)?.unwrap_or_default(),
        owner: ctx.scope.owner().cloned(),
    };

    let store = ctx.open_store()?;
    let facility = store.insert(&ctx.scope, new)?;
    ctx.save_store(&store)?;

    if ctx.json {
        return print_json(&facility);
    }
    Status::success(&format!("Added {} {}", facility.id, facility.name.bold()));
    Ok(())
}

pub fn update(
    ctx: &AppContext,
    id: u64,
    name: Option<String>,
    location: &LocationArgs,
    capacity: Option<i64>,
) -> Result<()> {
    let update = FacilityUpdate {
        name,
        capacity: capacity_arg(capacity)?,
        geometry: location_geometry(location)?,
    };

    let store = ctx.open_store()?;
    let facility = store.update(&ctx.scope, FacilityId(id), update)?;
    ctx.save_store(&store)?;

    if ctx.json {
        return print_json(&facility);
    }
    Status::success(&format!("Updated {} {}", facility.id, facility.name.bold()));
    Ok(())
}

pub fn remove(ctx: &AppContext, id: u64) -> Result<()> {
    let store = ctx.open_store()?;
    let facility = store.delete(&ctx.scope, FacilityId(id))?;
    ctx.save_store(&store)?;

    if ctx.json {
        return print_json(&facility);
    }
    Status::success(&format!("Removed {} {}", facility.id, facility.name));
    Ok(())
}

pub fn list(ctx: &AppContext, category: Option<&str>) -> Result<()> {
    let store = ctx.open_store()?;
    let mut facilities = store.list(&ctx.scope)?;
    if let Some(category) = category {
        let key = category_key(category);
        facilities.retain(|f| category_key(&f.category) == key);
    }

    if ctx.json {
        return print_json(&facilities);
    }

    if facilities.is_empty() {
        Status::info("No facilities");
        return Ok(());
    }

    Status::header(&format_count(facilities.len(), "facility", "facilities"));
    for facility in &facilities {
        print_facility(facility);
    }
    Ok(())
}

fn print_facility(facility: &Facility) {
    let location = facility
        .effective_point()
        .map_or_else(|| "no location".to_string(), |p| p.to_string());
    let owner = facility
        .owner
        .as_ref()
        .map(|o| format!(" [{}]", o))
        .unwrap_or_default();

    println!(
        "{:>6}  {}  {}  {} cap {}  {}{}",
        facility.id.to_string().dimmed(),
        facility.name.bold(),
        facility.category.cyan(),
        facility.kind(),
        facility.capacity,
        location,
        owner.dimmed()
    );
}
