//! Resolves where the configuration lives and loads it.

use std::path::PathBuf;

use sc_core::config::AppConfig;
use sc_infra::{load_app_config, DirsAppDirs};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "CONNECT_SETUP_CONFIG";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Load the application configuration.
///
/// The file is `explicit_path` if given, else `$CONNECT_SETUP_CONFIG`, else
/// `config.toml` in the data directory. Paths not set by the file default to
/// the data directory.
pub fn load_config(explicit_path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let data_dir = DirsAppDirs::new().data_dir()?;
    let base = AppConfig::with_system_defaults(data_dir.clone());

    let config_path = explicit_path
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));

    load_app_config(&config_path, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_path_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[storage]\nentries_path = \"/srv/entries.json\"\n")
            .unwrap();

        let config = load_config(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.entries_path, PathBuf::from("/srv/entries.json"));
        assert!(config.logs_dir.ends_with("logs"));
    }
}
