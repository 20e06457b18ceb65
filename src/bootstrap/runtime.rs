//! Progress pump.
//!
//! Login tasks only queue a signal when they finish. The pump re-runs the
//! signalled flow's current step and hands the result to the host UI.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, Instrument};

use sc_app::FlowManager;
use sc_core::ids::FlowId;
use sc_core::ports::FlowUiPort;

pub async fn run_progress_pump(
    manager: Arc<FlowManager>,
    ui: Arc<dyn FlowUiPort>,
    mut signals: mpsc::UnboundedReceiver<FlowId>,
) {
    while let Some(flow_id) = signals.recv().await {
        let span = info_span!("bootstrap.progress_pump", flow_id = %flow_id);
        async {
            if !manager.is_active(&flow_id).await {
                debug!("signal for a flow that already ended");
                return;
            }
            match manager.configure(&flow_id, None).await {
                Ok(result) => ui.present(&flow_id, &result).await,
                Err(err) => error!(error = %err, "re-running flow step failed"),
            }
        }
        .instrument(span)
        .await;
    }
    info!("progress pump stopped");
}
