use std::path::PathBuf;

const APP_DIR_NAME: &str = "connect-setup";
const PROFILE_ENV: &str = "CONNECT_SETUP_PROFILE";

#[derive(Debug, thiserror::Error)]
pub enum AppDirsError {
    #[error("system data-local directory is unavailable")]
    DataLocalDirUnavailable,
}

fn resolved_app_dir_name() -> String {
    match std::env::var(PROFILE_ENV) {
        Ok(profile) if !profile.is_empty() => format!("{APP_DIR_NAME}-{profile}"),
        _ => APP_DIR_NAME.to_string(),
    }
}

/// Resolves the application data directory from the platform's local data
/// directory, suffixed by `CONNECT_SETUP_PROFILE` when set.
pub struct DirsAppDirs {
    base_data_local_dir_override: Option<PathBuf>,
}

impl DirsAppDirs {
    pub fn new() -> Self {
        Self {
            base_data_local_dir_override: None,
        }
    }

    /// Uses `base` instead of the system data-local directory.
    pub fn with_base_data_local_dir(base: PathBuf) -> Self {
        Self {
            base_data_local_dir_override: Some(base),
        }
    }

    fn base_data_local_dir(&self) -> Option<PathBuf> {
        if let Some(base) = &self.base_data_local_dir_override {
            return Some(base.clone());
        }
        dirs::data_local_dir()
    }

    pub fn data_dir(&self) -> Result<PathBuf, AppDirsError> {
        let base = self
            .base_data_local_dir()
            .ok_or(AppDirsError::DataLocalDirUnavailable)?;
        Ok(base.join(resolved_app_dir_name()))
    }
}

impl Default for DirsAppDirs {
    fn default() -> Self {
        Self::new()
    }
}
