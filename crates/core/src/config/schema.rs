//! Configuration schema definitions

use crate::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use urbancover_coverage::{AnalysisSettings, RangeConfig};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub range: RangeConfig,

    #[serde(default)]
    pub analysis: AnalysisSettings,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl ConfigSchema {
    /// Check value ranges the types alone cannot express.
    pub fn validate(&self) -> ValidationResult {
        let mut validator = Validator::new()
            .one_of("general.log_format", &self.general.log_format, LOG_FORMATS)
            .required("storage.data_file", &self.storage.data_file)
            .positive("range.default_base_km", self.range.default_base_km)
            .positive("range.reference_density", self.range.reference_density)
            .positive("range.reference_capacity", self.range.reference_capacity)
            .positive("range.min_density", self.range.min_density)
            .positive("analysis.score_cutoff_km", self.analysis.score_cutoff_km)
            .positive("analysis.default_density", self.analysis.default_density);

        for (category, km) in &self.range.base_ranges {
            validator = validator.positive(&format!("range.base_ranges.{}", category), *km);
        }
        for (i, interest) in self.analysis.categories.iter().enumerate() {
            validator = validator.required(&format!("analysis.categories[{}].category", i), &interest.category);
        }

        validator.validate()
    }
}

/// Accepted values of `general.log_format`
pub const LOG_FORMATS: &[&str] = &["compact", "json"];

/// Logging and general settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Default tracing filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

/// Facility storage settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// JSON snapshot of the facility table; `~` is expanded
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Scope reads and writes to the caller's owner tag
    #[serde(default)]
    pub tenant_isolation: bool,

    /// Skip imported records matching an existing facility
    #[serde(default = "default_true")]
    pub dedupe_on_import: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            tenant_isolation: false,
            dedupe_on_import: true,
        }
    }
}

impl StorageConfig {
    /// `data_file` with a leading `~` expanded.
    pub fn data_path(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(shellexpand::tilde(&self.data_file).into_owned())
    }
}

fn default_data_file() -> String {
    "urbancover-facilities.json".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ConfigSchema::default().validate().is_valid());
    }

    #[test]
    fn test_partial_toml() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [range]
            default_base_km = 1.5

            [range.base_ranges]
            hospital = 6.0
            pharmacy = 1.2

            [[analysis.categories]]
            category = "school"
            severity = "critical"

            [storage]
            tenant_isolation = true
            "#,
        )
        .unwrap();

        assert_eq!(schema.range.default_base_km, 1.5);
        assert_eq!(schema.range.base_ranges.len(), 5);
        assert_eq!(schema.range.base_ranges.get("hospital"), Some(&6.0));
        assert_eq!(schema.range.base_ranges.get("atm"), Some(&1.0));
        assert_eq!(schema.range.reference_density, 1000.0);
        assert_eq!(schema.analysis.categories.len(), 1);
        assert_eq!(schema.analysis.score_cutoff_km, 5.0);
        assert!(schema.storage.tenant_isolation);
        assert!(schema.storage.dedupe_on_import);
        assert_eq!(schema.general.log_format, "compact");
    }

    #[test]
    fn test_validation_catches_bad_values() {
        let mut schema = ConfigSchema::default();
        schema.analysis.score_cutoff_km = 0.0;
        schema.range.base_ranges.insert("atm".into(), -1.0);
        schema.general.log_format = "pretty".into();

        let result = schema.validate();
        assert!(!result.is_valid());
        let fields: Vec<&str> = result.errors().iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"analysis.score_cutoff_km"));
        assert!(fields.contains(&"range.base_ranges.atm"));
        assert!(fields.contains(&"general.log_format"));
    }

    #[test]
    fn test_data_path_expands_tilde() {
        let storage = StorageConfig {
            data_file: "~/facilities.json".into(),
            ..Default::default()
        };
        if let Some(home) = dirs::home_dir() {
            assert!(storage.data_path().starts_with(home));
        }

        let plain = StorageConfig::default();
        assert_eq!(plain.data_path(), std::path::PathBuf::from("urbancover-facilities.json"));
    }
}
