use async_trait::async_trait;

use crate::ids::FlowId;
use crate::setup::FlowResult;

/// Receives results of flow steps that were driven without a direct caller,
/// e.g. the re-run of the login step after the login task finished.
#[async_trait]
pub trait FlowUiPort: Send + Sync {
    async fn present(&self, flow_id: &FlowId, result: &FlowResult);
}
