//! Import command - bulk ingestion from JSON or GeoJSON

use super::print_json;
use crate::context::AppContext;
use anyhow::Result;
use std::path::Path;
use urbancover_cli::output::{format_count, format_duration, Status};
use urbancover_cli::progress::{finish_success, import_progress};
use serde_json::json;
use urbancover_core::error::{Error, ResultExt};
use urbancover_core::ingest::{import_records, parse_records};
use urbancover_telemetry::{count, Event, Timer};

pub fn run(ctx: &AppContext, file: &Path, dedupe: bool) -> Result<()> {
    if !file.exists() {
        return Err(Error::file_not_found(file).into());
    }

    let timer = Timer::start("import_duration_ms");
    let input = std::fs::read_to_string(file)?;
    let records = parse_records(&input).context(format!("In {}", file.display()))?;
    let dedupe = dedupe && ctx.config.schema.storage.dedupe_on_import;

    let store = ctx.open_store()?;
    let pb = import_progress(records.len() as u64, !ctx.json);

    let summary = import_records(&store, &ctx.scope, records, dedupe, &mut || pb.inc(1))?;
    ctx.save_store(&store)?;
    finish_success(&pb, "Imported");
    let elapsed = timer.stop();

    count("facilities_imported", summary.added.len() as u64);
    count("facilities_rejected", summary.rejected.len() as u64);
    Event::new(
        "import",
        json!({
            "file": file.display().to_string(),
            "added": summary.added.len(),
            "duplicates": summary.duplicates,
            "rejected": summary.rejected.len(),
            "duration_ms": elapsed.as_millis() as u64,
        }),
    )
    .log();

    if ctx.json {
        return print_json(&summary);
    }

    Status::success(&format!(
        "Added {} in {}",
        format_count(summary.added.len(), "facility", "facilities"),
        format_duration(elapsed)
    ));
    if summary.duplicates > 0 {
        Status::info(&format!(
            "Skipped {}",
            format_count(summary.duplicates, "duplicate", "duplicates")
        ));
    }
    for rejected in &summary.rejected {
        Status::warning(&format!("Record {} rejected: {}", rejected.index, rejected.reason));
    }
    Ok(())
}
