use thiserror::Error;

use crate::ids::{EntryId, Vin};

#[derive(Debug, Error)]
pub enum ConfigEntryError {
    #[error("config entry not found: {0}")]
    NotFound(EntryId),

    #[error("a config entry for {0} already exists")]
    DuplicateUniqueId(Vin),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for ConfigEntryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}
