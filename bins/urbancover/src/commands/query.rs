//! Query commands - radius search, coverage verdict and desert check

use super::print_json;
use crate::context::AppContext;
use crate::PointArgs;
use anyhow::Result;
use owo_colors::OwoColorize;
use urbancover_cli::output::{format_count, format_distance, format_score, format_severity, Status};
use urbancover_core::error::Error;
use urbancover_core::store::FacilityStore;
use urbancover_coverage::category_label;
use urbancover_geo::Coordinate;

fn query_point(point: PointArgs) -> Coordinate {
    Coordinate::new(point.lat, point.lon)
}

pub fn within(ctx: &AppContext, point: PointArgs, radius_km: f64) -> Result<()> {
    let candidates = ctx.open_store()?.list(&ctx.scope)?;
    let matches = ctx
        .analyzer()
        .find_within(query_point(point), radius_km, &candidates)
        .map_err(Error::from)?;

    if ctx.json {
        return print_json(&matches);
    }

    Status::header(&format!(
        "{} within {}",
        format_count(matches.len(), "facility", "facilities"),
        format_distance(radius_km)
    ));
    for m in &matches {
        println!(
            "{:>10}  {}  {}  {}",
            format_distance(m.distance_km),
            m.facility.id.to_string().dimmed(),
            m.facility.name.bold(),
            m.facility.category.cyan()
        );
    }
    Ok(())
}

pub fn analyze(ctx: &AppContext, point: PointArgs, density: Option<f64>) -> Result<()> {
    let candidates = ctx.open_store()?.list(&ctx.scope)?;
    let report = {
        urbancover_telemetry::timed_span!("coverage_analysis");
        ctx.analyzer()
            .analyze(query_point(point), density, &candidates)
            .map_err(Error::from)?
    };

    if ctx.json {
        return print_json(&report);
    }

    Status::header(&format!("Coverage at {}", report.query));
    println!(
        "  Overall score {}  ·  density {:.0}/km²",
        format_score(report.overall_score),
        report.density
    );
    if report.desert {
        println!("  {}", "Service desert: no facility covers this point".red().bold());
    }

    for category in &report.categories {
        let nearest = category.nearest.map_or_else(
            || "none".to_string(),
            |n| format!("{} ({})", format_distance(n.distance_km), n.facility.name),
        );
        println!(
            "  {:<14} {:>6}  {}  nearest {}",
            category_label(&category.category),
            format_score(category.score),
            format_severity(category.severity),
            nearest
        );
    }

    if !report.nearby.is_empty() {
        Status::header("Nearby");
        for n in &report.nearby {
            let marker = if n.in_coverage { "●".green().to_string() } else { "○".dimmed().to_string() };
            println!(
                "  {} {:>10}  {}  {}  range {}",
                marker,
                format_distance(n.distance_km),
                n.facility.name.bold(),
                n.facility.category.cyan(),
                format_distance(n.max_range_km)
            );
        }
    }

    for note in &report.missing_amenities {
        Status::warning(note);
    }
    if report.excluded > 0 {
        Status::info(&format!(
            "{} without a usable location skipped",
            format_count(report.excluded, "facility", "facilities")
        ));
    }
    Ok(())
}

pub fn desert(ctx: &AppContext, point: PointArgs, category: &str, threshold_km: Option<f64>) -> Result<()> {
    let candidates = ctx.open_store()?.list(&ctx.scope)?;
    let analyzer = ctx.analyzer();
    let threshold_km = threshold_km.unwrap_or(analyzer.settings().score_cutoff_km);
    let check = analyzer
        .desert_check(query_point(point), category, threshold_km, &candidates)
        .map_err(Error::from)?;

    if ctx.json {
        return print_json(&check);
    }

    let label = category_label(&check.category);
    match (&check.nearest, check.is_desert) {
        (Some(nearest), false) => Status::success(&format!(
            "{} within {}: {} at {}",
            label,
            format_distance(check.threshold_km),
            nearest.facility.name,
            format_distance(nearest.distance_km)
        )),
        (Some(nearest), true) => Status::warning(&format!(
            "{} desert: nearest is {} at {}",
            label,
            nearest.facility.name,
            format_distance(nearest.distance_km)
        )),
        (None, _) => Status::warning(&format!("{} desert: no facility of this category", label)),
    }
    Ok(())
}
