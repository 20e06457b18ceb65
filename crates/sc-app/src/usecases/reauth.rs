//! Reauthentication of an existing entry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn, Instrument};

use sc_core::config::FlowDefaults;
use sc_core::entry::{ConfigEntry, ResolvedOptions};
use sc_core::form::{FieldKey, FormErrors, FormInput};
use sc_core::ids::{EntryId, FlowId};
use sc_core::ports::{
    ConfigEntryPort, ConnectionCredentials, EntryReloadPort, VehicleConnection,
    VehicleConnectorPort,
};
use sc_core::setup::{forms, AbortReason, FlowResult, SetupError, StepId};

use crate::error::FlowError;

/// Ports a reauth flow talks to.
#[derive(Clone)]
pub struct ReauthFlowPorts {
    pub connector: Arc<dyn VehicleConnectorPort>,
    pub entries: Arc<dyn ConfigEntryPort>,
    pub reload: Arc<dyn EntryReloadPort>,
}

/// Asks for fresh credentials for an entry whose login stopped working.
///
/// Each submission is checked inline; on success the entry data is updated,
/// a reload is scheduled and the flow ends with
/// [`AbortReason::ReauthSuccessful`].
pub struct ReauthFlow {
    flow_id: FlowId,
    entry_id: EntryId,
    defaults: Arc<FlowDefaults>,
    finished: AtomicBool,
    connector: Arc<dyn VehicleConnectorPort>,
    entries: Arc<dyn ConfigEntryPort>,
    reload: Arc<dyn EntryReloadPort>,
}

impl ReauthFlow {
    pub fn new(
        flow_id: FlowId,
        entry_id: EntryId,
        defaults: Arc<FlowDefaults>,
        ports: ReauthFlowPorts,
    ) -> Self {
        Self {
            flow_id,
            entry_id,
            defaults,
            finished: AtomicBool::new(false),
            connector: ports.connector,
            entries: ports.entries,
            reload: ports.reload,
        }
    }

    pub fn flow_id(&self) -> &FlowId {
        &self.flow_id
    }

    pub fn entry_id(&self) -> &EntryId {
        &self.entry_id
    }

    pub async fn configure(&self, input: Option<FormInput>) -> Result<FlowResult, FlowError> {
        if self.finished.load(Ordering::SeqCst) {
            return Err(FlowError::Finished);
        }

        let span = info_span!(
            "usecase.reauth_flow.configure",
            flow_id = %self.flow_id,
            entry_id = %self.entry_id
        );
        async {
            let entry = self.load_entry().await?;
            let schema = forms::reauth_form(&entry.data.username);

            let Some(input) = input else {
                return Ok(FlowResult::ShowForm {
                    step_id: StepId::ReauthConfirm,
                    schema,
                    errors: FormErrors::new(),
                });
            };

            let values = match schema.validate(&input) {
                Ok(values) => values,
                Err(errors) => {
                    return Ok(FlowResult::ShowForm {
                        step_id: StepId::ReauthConfirm,
                        schema,
                        errors,
                    })
                }
            };
            let username = values.text(FieldKey::Username).unwrap_or_default().to_string();
            let password = values.secret(FieldKey::Password).unwrap_or_default();

            let resolved = ResolvedOptions::resolve(&entry, &self.defaults);
            debug!("Creating connection to Connect service");
            let connection = self.connector.connect(ConnectionCredentials {
                username: username.clone(),
                password: password.clone(),
                full_debug: resolved.debug,
            });

            match check_login(connection.as_ref()).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("Unable to login. New terms may need to be accepted on the provider portal");
                    return Ok(FlowResult::ShowForm {
                        step_id: StepId::ReauthConfirm,
                        schema,
                        errors: FormErrors::base(SetupError::CannotConnect.code()),
                    });
                }
                Err(err) => {
                    error!(error = %err, "Failed to login");
                    return Ok(self.finish(AbortReason::ConnectionFailed));
                }
            }

            let data = entry.data.with_credentials(username, password);
            self.entries.update_entry_data(&entry.entry_id, data).await?;
            info!("credentials updated, scheduling entry reload");
            self.schedule_reload(entry.entry_id);

            Ok(self.finish(AbortReason::ReauthSuccessful))
        }
        .instrument(span)
        .await
    }

    async fn load_entry(&self) -> Result<ConfigEntry, FlowError> {
        self.entries
            .get_entry(&self.entry_id)
            .await?
            .ok_or_else(|| FlowError::EntryNotFound(self.entry_id.clone()))
    }

    /// The reload runs after the flow returned.
    fn schedule_reload(&self, entry_id: EntryId) {
        let reload = self.reload.clone();
        tokio::spawn(
            async move {
                if let Err(err) = reload.reload(&entry_id).await {
                    error!(entry_id = %entry_id, error = %err, "entry reload failed");
                }
            }
            .instrument(info_span!("usecase.reauth_flow.reload")),
        );
    }

    fn finish(&self, reason: AbortReason) -> FlowResult {
        self.finished.store(true, Ordering::SeqCst);
        FlowResult::Abort { reason }
    }
}

async fn check_login(connection: &dyn VehicleConnection) -> anyhow::Result<bool> {
    connection.login().await?;
    connection.validate_login().await
}
