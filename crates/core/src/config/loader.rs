//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file to use when no path is given
pub const CONFIG_ENV_VAR: &str = "URBANCOVER_CONFIG";

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, the environment, the
    /// standard locations, or fall back to defaults.
    ///
    /// An explicit path (argument or `URBANCOVER_CONFIG`) must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let config_path = match explicit {
            Some(p) if !p.exists() => return Err(Error::config_not_found(&p)),
            Some(p) => Some(p),
            None => find_config_file(),
        };

        let schema = match &config_path {
            Some(p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        schema.validate().to_result().map_err(|e| {
            let mut err = Error::new(ErrorCode::InvalidConfigValue, e.message);
            if let Some(p) = &config_path {
                err = err.with_context(format!("In {}", p.display()));
            }
            err
        })?;

        tracing::debug!(path = ?config_path, "Configuration loaded");

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file)
    pub fn defaults() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = [".urbancover.toml", "urbancover.toml", ".config/urbancover.toml"];

    for candidate in candidates {
        if Path::new(candidate).exists() {
            return Some(PathBuf::from(candidate));
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("urbancover").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e)).with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse config file {}: {}", path.display(), e),
        )
        .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = Config::defaults();
        assert!(config.path.is_none());
        assert_eq!(config.schema.analysis.score_cutoff_km, 5.0);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[range]\ndefault_base_km = 3.0\n\n[analysis]\nnearby_limit = 10").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.schema.range.default_base_km, 3.0);
        assert_eq!(config.schema.analysis.nearby_limit, 10);
        assert_eq!(config.path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/urbancover.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[range\nbroken").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nscore_cutoff_km = -1.0").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.message.contains("score_cutoff_km"));
    }
}
