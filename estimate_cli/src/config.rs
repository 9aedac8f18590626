//! Configuration file loading and parsing.
//!
//! # Configuration File Locations
//!
//! 1. Path specified via `--config`
//! 2. Default location:
//!    - **Linux/macOS:** `~/.estimate/config.json`
//!    - **Windows:** `%USERPROFILE%\.estimate\config.json`
//!
//! A missing default file is not an error; built-in defaults apply.
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "catalog_path": "/shared/catalogs/acme.json",
//!   "user_id": "sam@framer.co",
//!   "settings": { "panel_length_ft": 10, "manufacture": { "per_panel": 25 } },
//!   "logging": { "level": "info" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use estimate_core::errors::{EstimateError, EstimateResult};
use estimate_core::settings::EstimateSettings;

/// Returns the default configuration directory.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".estimate"))
}

/// Returns the platform-specific default configuration file path.
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Catalog used when `catalog` is run without a file.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Identity written into project lock files.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Settings fields overriding those stored in loaded projects.
    #[serde(default)]
    pub settings: Map<String, Value>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> EstimateResult<()> {
        self.apply_settings(&EstimateSettings::default())?.validate()
    }

    /// Lock owner: configured id, else the login name.
    pub fn user_id(&self) -> String {
        self.user_id
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Overlay the configured overrides onto `base`.
    pub fn apply_settings(&self, base: &EstimateSettings) -> EstimateResult<EstimateSettings> {
        if self.settings.is_empty() {
            return Ok(base.clone());
        }
        let mut merged =
            serde_json::to_value(base).map_err(|e| EstimateError::serialization(e.to_string()))?;
        merge_known("settings", &mut merged, &self.settings)?;
        serde_json::from_value(merged).map_err(|e| EstimateError::serialization(e.to_string()))
    }
}

const OPEN_MAPS: &[&str] = &["settings.default_waste"];

/// Recursive overlay that rejects keys the target does not have.
///
/// Map-valued fields (`default_waste`) serialize as objects keyed by data
/// rather than by field name, so those take new keys.
fn merge_known(
    path: &str,
    target: &mut Value,
    overrides: &Map<String, Value>,
) -> EstimateResult<()> {
    let Value::Object(target) = target else {
        return Err(EstimateError::invalid_input(
            path,
            "object",
            "Cannot override a scalar with a table",
        ));
    };
    if OPEN_MAPS.contains(&path) {
        for (key, value) in overrides {
            target.insert(key.clone(), value.clone());
        }
        return Ok(());
    }
    for (key, value) in overrides {
        let field = format!("{path}.{key}");
        let slot = target
            .get_mut(key)
            .ok_or_else(|| {
                EstimateError::invalid_input(&field, value.to_string(), "Unknown settings field")
            })?;
        match value {
            Value::Object(nested) => merge_known(&field, slot, nested)?,
            _ => *slot = value.clone(),
        }
    }
    Ok(())
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Loads and parses the configuration file.
///
/// An explicit `path` must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> EstimateResult<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let display = config_path.display().to_string();
    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| EstimateError::file_error("read config", display.clone(), e.to_string()))?;

    let config: Config = serde_json::from_str(&contents)
        .map_err(|e| EstimateError::serialization(format!("Invalid config {display}: {e}")))?;

    config.validate()?;
    Ok(config)
}
