//! Range command - effective service radius of a category

use crate::context::AppContext;
use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use urbancover_cli::output::format_distance;

pub fn run(ctx: &AppContext, category: &str, capacity: i64, density: Option<f64>) -> Result<()> {
    let analyzer = ctx.analyzer();
    let model = analyzer.model();
    let density = model.effective_density(density.unwrap_or(analyzer.settings().default_density));
    let range_km = model
        .effective_range_checked(category, capacity, density)
        .map_err(urbancover_core::Error::from)?;

    if ctx.json {
        return super::print_json(&json!({
            "category": category,
            "known_category": model.is_known_category(category),
            "base_range_km": model.base_range(category),
            "capacity": capacity,
            "density": density,
            "effective_range_km": range_km,
        }));
    }

    println!(
        "{} {}",
        category.bold(),
        format_distance(range_km).cyan()
    );
    println!(
        "  base {} · capacity {} · density {:.0}/km²",
        format_distance(model.base_range(category)),
        capacity,
        density
    );
    if !model.is_known_category(category) {
        println!("  {}", "Unknown category, default base range applied".dimmed());
    }
    Ok(())
}
