use std::path::PathBuf;

use crate::config::FlowDefaults;
use crate::entry::ConvertUnit;

/// Application configuration DTO
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON file holding the configuration entries
    pub entries_path: PathBuf,

    /// Directory for rolling log files (empty disables file logging)
    pub logs_dir: PathBuf,

    /// Defaults handed to every flow
    pub flow_defaults: FlowDefaults,
}

impl AppConfig {
    /// Create AppConfig from a TOML value.
    ///
    /// Missing keys keep the values of `base`; values of the wrong type are
    /// ignored the same way.
    pub fn from_toml(toml_value: &toml::Value, base: AppConfig) -> anyhow::Result<Self> {
        let storage = toml_value.get("storage");
        let logging = toml_value.get("logging");
        let defaults = toml_value.get("defaults");

        let str_at = |table: Option<&toml::Value>, key: &str| {
            table
                .and_then(|t| t.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let bool_at = |key: &str| defaults.and_then(|d| d.get(key)).and_then(|v| v.as_bool());
        let u32_at = |key: &str| -> anyhow::Result<Option<u32>> {
            match defaults.and_then(|d| d.get(key)).and_then(|v| v.as_integer()) {
                Some(value) => Ok(Some(u32::try_from(value).map_err(|_| {
                    anyhow::anyhow!("defaults.{key} must be a non-negative integer, got {value}")
                })?)),
                None => Ok(None),
            }
        };

        let base_defaults = base.flow_defaults;
        let convert = match str_at(defaults, "convert") {
            Some(raw) => ConvertUnit::parse(&raw)
                .ok_or_else(|| anyhow::anyhow!("defaults.convert has unknown value '{raw}'"))?,
            None => base_defaults.convert,
        };

        Ok(Self {
            entries_path: str_at(storage, "entries_path")
                .map(PathBuf::from)
                .unwrap_or(base.entries_path),
            logs_dir: str_at(logging, "logs_dir")
                .map(PathBuf::from)
                .unwrap_or(base.logs_dir),
            flow_defaults: FlowDefaults {
                initial_update_interval: u32_at("initial_update_interval")?
                    .unwrap_or(base_defaults.initial_update_interval),
                update_interval: u32_at("update_interval")?.unwrap_or(base_defaults.update_interval),
                debug: bool_at("debug").unwrap_or(base_defaults.debug),
                mutable: bool_at("mutable").unwrap_or(base_defaults.mutable),
                convert,
                spin: str_at(defaults, "spin").unwrap_or(base_defaults.spin),
            },
        })
    }

    /// Create AppConfig with paths under the given data directory.
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            entries_path: data_dir.join("config_entries.json"),
            logs_dir: data_dir.join("logs"),
            flow_defaults: FlowDefaults::default(),
        }
    }
}
