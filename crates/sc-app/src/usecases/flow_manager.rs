//! Registry of in-progress flows.
//!
//! The host starts flows here and routes every later submission by
//! [`FlowId`]. Flows are dropped as soon as they return a terminal result
//! or an error.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use sc_core::config::FlowDefaults;
use sc_core::form::FormInput;
use sc_core::ids::{EntryId, FlowId};
use sc_core::ports::{ConfigEntryPort, EntryReloadPort, FlowProgressPort, VehicleConnectorPort};
use sc_core::setup::FlowResult;

use crate::error::FlowError;
use crate::usecases::options::OptionsFlow;
use crate::usecases::reauth::{ReauthFlow, ReauthFlowPorts};
use crate::usecases::setup::{SetupFlow, SetupFlowPorts};

/// A flow held by the manager.
#[derive(Clone)]
pub enum ActiveFlow {
    Setup(Arc<SetupFlow>),
    Reauth(Arc<ReauthFlow>),
    Options(Arc<OptionsFlow>),
}

impl ActiveFlow {
    pub fn kind(&self) -> &'static str {
        match self {
            ActiveFlow::Setup(_) => "setup",
            ActiveFlow::Reauth(_) => "reauth",
            ActiveFlow::Options(_) => "options",
        }
    }

    async fn configure(&self, input: Option<FormInput>) -> Result<FlowResult, FlowError> {
        match self {
            ActiveFlow::Setup(flow) => flow.configure(input).await,
            ActiveFlow::Reauth(flow) => flow.configure(input).await,
            ActiveFlow::Options(flow) => flow.configure(input).await,
        }
    }

    async fn cancel(&self) {
        if let ActiveFlow::Setup(flow) = self {
            flow.cancel().await;
        }
    }
}

/// Everything the manager hands to the flows it creates.
#[derive(Clone)]
pub struct FlowManagerDeps {
    pub defaults: FlowDefaults,
    pub connector: Arc<dyn VehicleConnectorPort>,
    pub entries: Arc<dyn ConfigEntryPort>,
    pub reload: Arc<dyn EntryReloadPort>,
    pub progress: Arc<dyn FlowProgressPort>,
}

pub struct FlowManager {
    defaults: Arc<FlowDefaults>,
    connector: Arc<dyn VehicleConnectorPort>,
    entries: Arc<dyn ConfigEntryPort>,
    reload: Arc<dyn EntryReloadPort>,
    progress: Arc<dyn FlowProgressPort>,
    flows: Mutex<HashMap<FlowId, ActiveFlow>>,
}

impl FlowManager {
    pub fn new(deps: FlowManagerDeps) -> Self {
        Self {
            defaults: Arc::new(deps.defaults),
            connector: deps.connector,
            entries: deps.entries,
            reload: deps.reload,
            progress: deps.progress,
            flows: Mutex::new(HashMap::new()),
        }
    }

    /// Starts the setup wizard and renders its first step.
    pub async fn start_setup(&self) -> Result<(FlowId, FlowResult), FlowError> {
        let flow_id = FlowId::new();
        let flow = SetupFlow::new(
            flow_id.clone(),
            self.defaults.clone(),
            SetupFlowPorts {
                connector: self.connector.clone(),
                entries: self.entries.clone(),
                progress: self.progress.clone(),
            },
        );
        self.start(flow_id, ActiveFlow::Setup(Arc::new(flow))).await
    }

    pub async fn start_reauth(&self, entry_id: EntryId) -> Result<(FlowId, FlowResult), FlowError> {
        let flow_id = FlowId::new();
        let flow = ReauthFlow::new(
            flow_id.clone(),
            entry_id,
            self.defaults.clone(),
            ReauthFlowPorts {
                connector: self.connector.clone(),
                entries: self.entries.clone(),
                reload: self.reload.clone(),
            },
        );
        self.start(flow_id, ActiveFlow::Reauth(Arc::new(flow))).await
    }

    pub async fn start_options(&self, entry_id: EntryId) -> Result<(FlowId, FlowResult), FlowError> {
        let flow_id = FlowId::new();
        let flow = OptionsFlow::new(
            flow_id.clone(),
            entry_id,
            self.defaults.clone(),
            self.entries.clone(),
        );
        self.start(flow_id, ActiveFlow::Options(Arc::new(flow))).await
    }

    async fn start(&self, flow_id: FlowId, flow: ActiveFlow) -> Result<(FlowId, FlowResult), FlowError> {
        info!(flow_id = %flow_id, kind = flow.kind(), "flow started");
        self.flows.lock().await.insert(flow_id.clone(), flow);
        let result = self.configure(&flow_id, None).await?;
        Ok((flow_id, result))
    }

    /// Runs the current step of a flow.
    pub async fn configure(
        &self,
        flow_id: &FlowId,
        input: Option<FormInput>,
    ) -> Result<FlowResult, FlowError> {
        let flow = self
            .flows
            .lock()
            .await
            .get(flow_id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownFlow(flow_id.clone()))?;

        let result = flow.configure(input).await;
        match &result {
            Ok(result) if result.is_terminal() => {
                debug!(flow_id = %flow_id, kind = flow.kind(), "flow finished");
                self.flows.lock().await.remove(flow_id);
            }
            Ok(_) => {}
            Err(err) => {
                warn!(flow_id = %flow_id, kind = flow.kind(), error = %err, "flow failed, dropping it");
                self.flows.lock().await.remove(flow_id);
                flow.cancel().await;
            }
        }
        result
    }

    /// Drops a flow on host request. Returns whether it was active.
    pub async fn abort(&self, flow_id: &FlowId) -> bool {
        let removed = self.flows.lock().await.remove(flow_id);
        match removed {
            Some(flow) => {
                info!(flow_id = %flow_id, kind = flow.kind(), "flow aborted by host");
                flow.cancel().await;
                true
            }
            None => false,
        }
    }

    pub async fn is_active(&self, flow_id: &FlowId) -> bool {
        self.flows.lock().await.contains_key(flow_id)
    }

    pub async fn active_count(&self) -> usize {
        self.flows.lock().await.len()
    }
}
