use async_trait::async_trait;

use crate::entry::{ConfigEntry, EntryData, NewConfigEntry, OptionsOverlay};
use crate::ids::{EntryId, Vin};
use crate::ports::errors::ConfigEntryError;

/// Host storage for configuration entries.
///
/// Implementations must refuse a second entry for the same unique id with
/// [`ConfigEntryError::DuplicateUniqueId`].
#[async_trait]
pub trait ConfigEntryPort: Send + Sync {
    async fn list_entries(&self) -> Result<Vec<ConfigEntry>, ConfigEntryError>;

    async fn get_entry(&self, entry_id: &EntryId) -> Result<Option<ConfigEntry>, ConfigEntryError>;

    async fn find_by_unique_id(&self, unique_id: &Vin) -> Result<Option<ConfigEntry>, ConfigEntryError>;

    async fn create_entry(&self, entry: NewConfigEntry) -> Result<ConfigEntry, ConfigEntryError>;

    /// Replace the stored data of an entry.
    async fn update_entry_data(
        &self,
        entry_id: &EntryId,
        data: EntryData,
    ) -> Result<ConfigEntry, ConfigEntryError>;

    /// Replace the options overlay of an entry.
    async fn set_options(
        &self,
        entry_id: &EntryId,
        options: OptionsOverlay,
    ) -> Result<ConfigEntry, ConfigEntryError>;
}

