//! Per-invocation state: configuration, caller scope and storage location

use crate::GlobalArgs;
use std::path::PathBuf;
use urbancover_core::config::Config;
use urbancover_core::error::{Error, Result, ResultExt};
use urbancover_core::store::{MemoryStore, Scope};
use urbancover_core::validation::validate_owner;
use urbancover_coverage::{CoverageAnalyzer, OwnerTag, RangeModel};
use urbancover_telemetry::TelemetryConfig;

pub struct AppContext {
    pub config: Config,
    pub scope: Scope,
    pub data_path: PathBuf,
    pub json: bool,
}

impl AppContext {
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let config = Config::load(args.config.as_deref())?;

        let scope = match &args.owner {
            Some(tag) => {
                let tag = OwnerTag::new(tag.clone());
                validate_owner(&tag).to_result()?;
                Scope::Owner(tag)
            }
            None if config.schema.storage.tenant_isolation => {
                return Err(Error::config("storage.tenant_isolation is enabled but no owner tag was given")
                    .with_suggestion("Pass --owner <TAG> or set URBANCOVER_OWNER"));
            }
            None => Scope::All,
        };

        let data_path = args
            .data
            .clone()
            .unwrap_or_else(|| config.schema.storage.data_path());

        Ok(Self {
            config,
            scope,
            data_path,
            json: args.json,
        })
    }

    pub fn init_telemetry(&self, verbose: u8) -> anyhow::Result<()> {
        let general = &self.config.schema.general;
        let log_level = match verbose {
            0 => general.log_level.clone(),
            1 => "info".to_string(),
            _ => "debug".to_string(),
        };

        urbancover_telemetry::init_with_config(TelemetryConfig {
            log_level,
            log_format: general.log_format.parse()?,
            ..Default::default()
        })
    }

    pub fn open_store(&self) -> Result<MemoryStore> {
        MemoryStore::load_json(&self.data_path)
    }

    pub fn save_store(&self, store: &MemoryStore) -> Result<()> {
        store
            .save_json(&self.data_path)
            .context(format!("While saving {}", self.data_path.display()))
    }

    pub fn analyzer(&self) -> CoverageAnalyzer {
        let schema = &self.config.schema;
        CoverageAnalyzer::new(RangeModel::new(schema.range.clone()), schema.analysis.clone())
    }
}
