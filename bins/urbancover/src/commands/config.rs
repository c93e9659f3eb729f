//! Config command - inspect the effective configuration

use super::print_json;
use crate::context::AppContext;
use anyhow::Result;
use urbancover_cli::output::Status;

pub fn show(ctx: &AppContext) -> Result<()> {
    if ctx.json {
        return print_json(&ctx.config.schema);
    }
    print!("{}", toml::to_string_pretty(&ctx.config.schema)?);
    Ok(())
}

pub fn path(ctx: &AppContext) -> Result<()> {
    let path = ctx.config.path.as_ref().map(|p| p.display().to_string());

    if ctx.json {
        return print_json(&serde_json::json!({
            "config": path,
            "data_file": ctx.data_path.display().to_string(),
        }));
    }

    match path {
        Some(path) => println!("{}", path),
        None => Status::info("No configuration file found, using defaults"),
    }
    Ok(())
}
