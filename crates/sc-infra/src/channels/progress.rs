use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use sc_core::ids::FlowId;
use sc_core::ports::FlowProgressPort;

/// Queues progress signals for the host's flow pump.
#[derive(Clone)]
pub struct ChannelFlowProgress {
    tx: mpsc::UnboundedSender<FlowId>,
}

impl ChannelFlowProgress {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FlowId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl FlowProgressPort for ChannelFlowProgress {
    async fn notify_progress(&self, flow_id: &FlowId) {
        if self.tx.send(flow_id.clone()).is_err() {
            warn!(flow_id = %flow_id, "flow pump is gone, progress signal dropped");
        }
    }
}
