//! urbancover - facility coverage and service-desert analysis
//!
//! Keeps a facility table in a JSON snapshot and answers radius, coverage
//! and desert queries against it.

use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use urbancover_core::error::exit_codes;

mod commands;
mod context;

use commands::{config, facility, import, query, range};
use context::AppContext;

/// Urban facility coverage analyzer
#[derive(Parser)]
#[command(name = "urbancover")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (defaults to the standard search locations)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Facility snapshot file, overrides `storage.data_file`
    #[arg(long, global = true, env = "URBANCOVER_DATA", value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Owner tag scoping reads and writes
    #[arg(long, global = true, env = "URBANCOVER_OWNER", value_name = "TAG")]
    pub owner: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// A query location
#[derive(Args, Debug, Clone, Copy)]
pub struct PointArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,
}

/// A facility location given as lat/lon or as a GeoJSON/WKT geometry
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true, requires = "lon", conflicts_with = "geometry")]
    pub lat: Option<f64>,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true, requires = "lat", conflicts_with = "geometry")]
    pub lon: Option<f64>,

    /// GeoJSON object or WKT string, e.g. "POLYGON((77.59 12.97, ...))"
    #[arg(long)]
    pub geometry: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Effective service range of a facility category
    Range {
        /// Facility category, e.g. hospital or atm
        category: String,

        /// Facility capacity
        #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
        capacity: i64,

        /// Population density in people/km² (defaults to analysis.default_density)
        #[arg(long, allow_negative_numbers = true)]
        density: Option<f64>,
    },

    /// Add a facility
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Facility category
        #[arg(long)]
        category: String,

        #[command(flatten)]
        location: LocationArgs,

        /// Facility capacity (default 50)
        #[arg(long, allow_negative_numbers = true)]
        capacity: Option<i64>,
    },

    /// Overwrite fields of a facility
    Update {
        /// Facility id
        id: u64,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        location: LocationArgs,

        /// New capacity
        #[arg(long, allow_negative_numbers = true)]
        capacity: Option<i64>,
    },

    /// Remove a facility
    Remove {
        /// Facility id
        id: u64,
    },

    /// List facilities
    List {
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Bulk import facilities from a JSON array or GeoJSON FeatureCollection
    Import {
        /// Input file
        file: PathBuf,

        /// Keep records that match an existing facility
        #[arg(long)]
        no_dedupe: bool,
    },

    /// Facilities within a radius of a point
    Within {
        #[command(flatten)]
        point: PointArgs,

        /// Search radius in kilometers
        #[arg(long, allow_negative_numbers = true)]
        radius: f64,
    },

    /// Coverage verdict for a point
    Analyze {
        #[command(flatten)]
        point: PointArgs,

        /// Population density in people/km² (defaults to analysis.default_density)
        #[arg(long, allow_negative_numbers = true)]
        density: Option<f64>,
    },

    /// Check one category for a service desert
    Desert {
        #[command(flatten)]
        point: PointArgs,

        /// Facility category
        #[arg(long)]
        category: String,

        /// Desert threshold in kilometers (defaults to analysis.score_cutoff_km)
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<f64>,
    },

    /// Show the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the merged configuration
    Show,
    /// Print the path of the loaded configuration file
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.global.json;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e, json),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = AppContext::load(&cli.global)?;
    ctx.init_telemetry(cli.global.verbose)?;
    tracing::debug!(data = %ctx.data_path.display(), scope = ?ctx.scope, "Context ready");

    match cli.command {
        Commands::Range {
            category,
            capacity,
            density,
        } => range::run(&ctx, &category, capacity, density),

        Commands::Add {
            name,
            category,
            location,
            capacity,
        } => facility::add(&ctx, name, category, &location, capacity),

        Commands::Update {
            id,
            name,
            location,
            capacity,
        } => facility::update(&ctx, id, name, &location, capacity),

        Commands::Remove { id } => facility::remove(&ctx, id),

        Commands::List { category } => facility::list(&ctx, category.as_deref()),

        Commands::Import { file, no_dedupe } => import::run(&ctx, &file, !no_dedupe),

        Commands::Within { point, radius } => query::within(&ctx, point, radius),

        Commands::Analyze { point, density } => query::analyze(&ctx, point, density),

        Commands::Desert {
            point,
            category,
            threshold,
        } => query::desert(&ctx, point, &category, threshold),

        Commands::Config { action } => match action {
            ConfigAction::Show => config::show(&ctx),
            ConfigAction::Path => config::path(&ctx),
        },
    }
}

/// Print the error and pick an exit code from its error code
fn report_error(err: &anyhow::Error, json: bool) -> ExitCode {
    let code = match err.downcast_ref::<urbancover_core::Error>() {
        Some(core) => {
            if json {
                match serde_json::to_string_pretty(&core.to_report()) {
                    Ok(report) => eprintln!("{}", report),
                    Err(_) => eprintln!("{}", core),
                }
            } else {
                eprintln!("{} {}", "Error:".red().bold(), core);
            }
            core.code.exit_code()
        }
        None => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            exit_codes::FAILURE
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
