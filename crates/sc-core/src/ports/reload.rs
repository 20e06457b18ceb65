use async_trait::async_trait;

use crate::ids::EntryId;

/// Asks the host to reload an entry after its data changed.
#[async_trait]
pub trait EntryReloadPort: Send + Sync {
    async fn reload(&self, entry_id: &EntryId) -> anyhow::Result<()>;
}
