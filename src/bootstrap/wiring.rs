//! Builds the flow manager and its adapters from the configuration.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use sc_app::{FlowManager, FlowManagerDeps};
use sc_core::config::AppConfig;
use sc_core::ids::EntryId;
use sc_core::ports::{ConfigEntryPort, FlowUiPort, VehicleConnectorPort};
use sc_infra::{ChannelEntryReloader, ChannelFlowProgress, FileConfigEntryRepository};

use crate::bootstrap::runtime::run_progress_pump;

/// Everything the host keeps for the lifetime of the integration.
pub struct AppRuntime {
    pub manager: Arc<FlowManager>,
    pub entries: Arc<dyn ConfigEntryPort>,
    /// Entries the host should reload, sent after a successful reauth.
    pub reload_requests: mpsc::UnboundedReceiver<EntryId>,
    pump: JoinHandle<()>,
}

impl AppRuntime {
    /// Stops the progress pump. Running flows are dropped with the manager.
    pub fn shutdown(self) {
        self.pump.abort();
    }
}

/// Wire the runtime. Must be called inside a tokio runtime.
pub fn build_runtime(
    config: &AppConfig,
    connector: Arc<dyn VehicleConnectorPort>,
    ui: Arc<dyn FlowUiPort>,
) -> AppRuntime {
    let entries: Arc<dyn ConfigEntryPort> =
        Arc::new(FileConfigEntryRepository::new(config.entries_path.clone()));
    let (progress, signals) = ChannelFlowProgress::new();
    let (reload, reload_requests) = ChannelEntryReloader::new();

    let manager = Arc::new(FlowManager::new(FlowManagerDeps {
        defaults: config.flow_defaults.clone(),
        connector,
        entries: entries.clone(),
        reload: Arc::new(reload),
        progress: Arc::new(progress),
    }));

    let pump = tokio::spawn(run_progress_pump(manager.clone(), ui, signals));
    info!(entries_path = %config.entries_path.display(), "connect setup runtime ready");

    AppRuntime {
        manager,
        entries,
        reload_requests,
        pump,
    }
}
