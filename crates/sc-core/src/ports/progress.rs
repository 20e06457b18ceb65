use async_trait::async_trait;

use crate::ids::FlowId;

/// Re-signals a flow so the host runs its current step again.
///
/// Called by the background login task when it finishes. Implementations
/// must only queue the signal: driving the flow inline would wait on the
/// same flow that is awaiting the task.
#[async_trait]
pub trait FlowProgressPort: Send + Sync {
    async fn notify_progress(&self, flow_id: &FlowId);
}
