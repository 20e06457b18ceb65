use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use sc_core::entry::{ConfigEntry, EntryData, NewConfigEntry, OptionsOverlay};
use sc_core::ids::{EntryId, Vin};
use sc_core::ports::{ConfigEntryError, ConfigEntryPort};

const CURRENT_FILE_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct EntriesFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    entries: Vec<ConfigEntry>,
}

/// Config entries kept in a single JSON file.
///
/// Every mutation reloads the file, applies the change and writes it back
/// atomically while holding `write_lock`.
pub struct FileConfigEntryRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileConfigEntryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create entries dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    async fn load(&self) -> Result<EntriesFile> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(EntriesFile::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read entries failed: {}", self.path.display()))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("parse entries failed: {}", self.path.display()))
    }

    /// The file holds credentials: on unix it is written owner-only.
    async fn atomic_write(&self, file: &EntriesFile) -> Result<()> {
        self.ensure_parent_dir().await?;
        let content = serde_json::to_string_pretty(file).context("serialize entries failed")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp entries failed: {}", tmp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))
                .await
                .with_context(|| format!("restrict entries permissions failed: {}", tmp_path.display()))?;
        }

        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp entries to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    async fn modify(
        &self,
        entry_id: &EntryId,
        apply: impl FnOnce(&mut ConfigEntry),
    ) -> Result<ConfigEntry, ConfigEntryError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;

        let entry = file
            .entries
            .iter_mut()
            .find(|entry| &entry.entry_id == entry_id)
            .ok_or_else(|| ConfigEntryError::NotFound(entry_id.clone()))?;
        apply(entry);
        let updated = entry.clone();

        file.version = CURRENT_FILE_VERSION;
        self.atomic_write(&file).await?;
        Ok(updated)
    }
}

#[async_trait]
impl ConfigEntryPort for FileConfigEntryRepository {
    async fn list_entries(&self) -> Result<Vec<ConfigEntry>, ConfigEntryError> {
        Ok(self.load().await?.entries)
    }

    async fn get_entry(&self, entry_id: &EntryId) -> Result<Option<ConfigEntry>, ConfigEntryError> {
        let file = self.load().await?;
        Ok(file.entries.into_iter().find(|entry| &entry.entry_id == entry_id))
    }

    async fn find_by_unique_id(&self, unique_id: &Vin) -> Result<Option<ConfigEntry>, ConfigEntryError> {
        let file = self.load().await?;
        Ok(file.entries.into_iter().find(|entry| &entry.unique_id == unique_id))
    }

    async fn create_entry(&self, entry: NewConfigEntry) -> Result<ConfigEntry, ConfigEntryError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;

        if file.entries.iter().any(|existing| existing.unique_id == entry.unique_id) {
            return Err(ConfigEntryError::DuplicateUniqueId(entry.unique_id));
        }

        let created = entry.into_entry(EntryId::new(), Utc::now());
        file.entries.push(created.clone());
        file.version = CURRENT_FILE_VERSION;
        self.atomic_write(&file).await?;

        debug!(entry_id = %created.entry_id, path = %self.path.display(), "config entry stored");
        Ok(created)
    }

    async fn update_entry_data(
        &self,
        entry_id: &EntryId,
        data: EntryData,
    ) -> Result<ConfigEntry, ConfigEntryError> {
        self.modify(entry_id, |entry| entry.data = data).await
    }

    async fn set_options(
        &self,
        entry_id: &EntryId,
        options: OptionsOverlay,
    ) -> Result<ConfigEntry, ConfigEntryError> {
        self.modify(entry_id, |entry| entry.options = options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::entry::ConvertUnit;
    use tempfile::TempDir;

    fn new_entry(vin: &str) -> NewConfigEntry {
        NewConfigEntry {
            unique_id: Vin::from(vin),
            title: vin.to_string(),
            data: EntryData {
                username: "user@example.com".into(),
                password: "secret".into(),
                vehicle: Vin::from(vin),
                resources: vec!["odometer".into()],
                update_interval: Some(1),
                spin: Some("".into()),
                debug: Some(false),
                mutable: Some(true),
                convert: Some(ConvertUnit::NoConversion),
                scandinavian_miles: None,
            },
        }
    }

    fn repo(dir: &TempDir) -> FileConfigEntryRepository {
        FileConfigEntryRepository::new(dir.path().join("nested").join("entries.json"))
    }

    #[tokio::test]
    async fn missing_file_lists_no_entries() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        assert!(repo.list_entries().await.unwrap().is_empty());
        assert!(repo.find_by_unique_id(&Vin::from("VIN1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_entry_persists_and_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let created = repo.create_entry(new_entry("VIN1")).await.unwrap();

        assert!(repo.path().exists());
        let reopened = FileConfigEntryRepository::new(repo.path());
        let loaded = reopened.get_entry(&created.entry_id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
        assert!(loaded.options.is_empty());
    }

    #[tokio::test]
    async fn second_entry_for_same_vehicle_is_refused() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.create_entry(new_entry("VIN1")).await.unwrap();

        let err = repo.create_entry(new_entry("VIN1")).await.unwrap_err();

        assert!(matches!(err, ConfigEntryError::DuplicateUniqueId(vin) if vin.as_str() == "VIN1"));
        assert_eq!(repo.list_entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_options_leaves_data_untouched() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let created = repo.create_entry(new_entry("VIN1")).await.unwrap();
        let overlay = OptionsOverlay {
            update_interval: Some(20),
            ..OptionsOverlay::default()
        };

        let updated = repo.set_options(&created.entry_id, overlay.clone()).await.unwrap();

        assert_eq!(updated.options, overlay);
        assert_eq!(updated.data, created.data);
    }

    #[tokio::test]
    async fn update_entry_data_replaces_data_only() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let created = repo.create_entry(new_entry("VIN1")).await.unwrap();
        let data = created.data.with_credentials("new@example.com".into(), "new".into());

        let updated = repo.update_entry_data(&created.entry_id, data).await.unwrap();

        assert_eq!(updated.data.username, "new@example.com");
        assert_eq!(updated.data.password.expose(), "new");
        assert_eq!(updated.data.resources, created.data.resources);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn modifying_unknown_entry_is_not_found() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let missing = EntryId::new();

        let err = repo
            .set_options(&missing, OptionsOverlay::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ConfigEntryError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        std::fs::create_dir_all(repo.path().parent().unwrap()).unwrap();
        std::fs::write(repo.path(), "not json").unwrap();

        let err = repo.list_entries().await.unwrap_err();

        assert!(matches!(err, ConfigEntryError::Storage(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn entries_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.create_entry(new_entry("VIN1")).await.unwrap();

        let mode = std::fs::metadata(repo.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
