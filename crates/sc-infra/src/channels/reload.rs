use async_trait::async_trait;
use tokio::sync::mpsc;

use sc_core::ids::EntryId;
use sc_core::ports::EntryReloadPort;

/// Forwards reload requests to the host.
#[derive(Clone)]
pub struct ChannelEntryReloader {
    tx: mpsc::UnboundedSender<EntryId>,
}

impl ChannelEntryReloader {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EntryId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EntryReloadPort for ChannelEntryReloader {
    async fn reload(&self, entry_id: &EntryId) -> anyhow::Result<()> {
        self.tx
            .send(entry_id.clone())
            .map_err(|_| anyhow::anyhow!("reload receiver closed, cannot reload {entry_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reload_request_reaches_receiver() {
        let (reloader, mut rx) = ChannelEntryReloader::new();
        let entry_id = EntryId::new();

        reloader.reload(&entry_id).await.unwrap();

        assert_eq!(rx.recv().await, Some(entry_id));
    }

    #[tokio::test]
    async fn reload_fails_when_host_is_gone() {
        let (reloader, rx) = ChannelEntryReloader::new();
        drop(rx);

        assert!(reloader.reload(&EntryId::new()).await.is_err());
    }
}
