//! Setup flow orchestrator.
//!
//! This module coordinates the setup state machine, the background login
//! task and entry creation, and renders each state as a [`FlowResult`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, info_span, warn, Instrument as _};

use sc_core::config::FlowDefaults;
use sc_core::entry::{ConfigEntry, NewConfigEntry};
use sc_core::form::{FieldKey, FormErrors, FormInput, FormSchema, FormValues};
use sc_core::ids::{FlowId, Vin};
use sc_core::ports::{
    ConfigEntryError, ConfigEntryPort, ConnectionCredentials, FlowProgressPort, VehicleConnection,
    VehicleConnectorPort,
};
use sc_core::setup::{
    forms, FlowResult, SetupAction, SetupError, SetupEvent, SetupState, SetupStateMachine,
    StepId, Transition, WizardDraft, LOGIN_PROGRESS_ACTION,
};
use sc_core::vehicle::Instrument;

use crate::error::FlowError;
use crate::usecases::setup::context::SetupContext;
use crate::usecases::setup::login_task::{LoginOutcome, LoginTask};

/// Ports a setup flow talks to.
#[derive(Clone)]
pub struct SetupFlowPorts {
    pub connector: Arc<dyn VehicleConnectorPort>,
    pub entries: Arc<dyn ConfigEntryPort>,
    pub progress: Arc<dyn FlowProgressPort>,
}

/// One run of the initial setup wizard.
pub struct SetupFlow {
    flow_id: FlowId,
    defaults: Arc<FlowDefaults>,
    context: Arc<SetupContext>,

    connection: Mutex<Option<Arc<dyn VehicleConnection>>>,
    login_task: Mutex<Option<LoginTask>>,
    login_abort: Mutex<Option<AbortHandle>>,
    created_entry: Mutex<Option<ConfigEntry>>,

    connector: Arc<dyn VehicleConnectorPort>,
    entries: Arc<dyn ConfigEntryPort>,
    progress: Arc<dyn FlowProgressPort>,
}

impl SetupFlow {
    pub fn new(flow_id: FlowId, defaults: Arc<FlowDefaults>, ports: SetupFlowPorts) -> Self {
        Self {
            flow_id,
            defaults,
            context: Arc::new(SetupContext::default()),
            connection: Mutex::new(None),
            login_task: Mutex::new(None),
            login_abort: Mutex::new(None),
            created_entry: Mutex::new(None),
            connector: ports.connector,
            entries: ports.entries,
            progress: ports.progress,
        }
    }

    pub fn flow_id(&self) -> &FlowId {
        &self.flow_id
    }

    pub async fn state(&self) -> SetupState {
        self.context.get_state().await
    }

    pub async fn draft(&self) -> WizardDraft {
        self.context.get_draft().await
    }

    pub async fn has_login_task(&self) -> bool {
        self.login_task.lock().await.is_some()
    }

    /// Runs the current step.
    ///
    /// `None` renders the step (or, on the login step, collects the login
    /// task's outcome). `Some` submits the step's form.
    pub async fn configure(&self, input: Option<FormInput>) -> Result<FlowResult, FlowError> {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;

        let span = info_span!("usecase.setup_flow.configure", flow_id = %self.flow_id);
        async {
            let state = self.context.get_state().await;
            if state.is_finished() || state == SetupState::CreatingEntry {
                return Err(FlowError::Finished);
            }

            match (state, input) {
                (SetupState::Login, _) => self.poll_login().await,
                (state, None) => self.render(&state).await,
                (state, Some(input)) => self.submit(&state, input).await,
            }
        }
        .instrument(span)
        .await
    }

    /// Stops the flow from the host side, aborting a running login task.
    ///
    /// Never waits on the login step, so it also stops a task that a
    /// concurrent `configure` is waiting on.
    pub async fn cancel(&self) {
        if let Some(abort) = self.login_abort.lock().await.take() {
            if !abort.is_finished() {
                info!("aborting login task of cancelled setup flow");
            }
            abort.abort();
        }
        if let Some(task) = self.login_task.lock().await.take() {
            task.abort();
        }
        self.connection.lock().await.take();
        self.context.set_draft(WizardDraft::default()).await;
    }

    async fn submit(&self, state: &SetupState, input: FormInput) -> Result<FlowResult, FlowError> {
        let draft = self.context.get_draft().await;
        let (step_id, schema) = self.form_for(state, &draft)?;

        let values = match schema.validate(&input) {
            Ok(values) => values,
            Err(errors) => {
                debug!(step = %step_id, errors = errors.len(), "form submission rejected");
                return Ok(FlowResult::ShowForm {
                    step_id,
                    schema,
                    errors,
                });
            }
        };

        let event = self.event_from_values(step_id, &values)?;
        let next = self.dispatch(event).await?;
        self.render(&next).await
    }

    fn event_from_values(&self, step_id: StepId, values: &FormValues) -> Result<SetupEvent, FlowError> {
        let event = match step_id {
            StepId::User => {
                SetupEvent::SubmitCredentials(forms::credentials_from_values(values, &self.defaults))
            }
            StepId::SelectVehicle => SetupEvent::SelectVehicle {
                vin: Vin::from(values.text(FieldKey::Vehicle).unwrap_or_default()),
            },
            StepId::SetSpin => SetupEvent::SubmitSpin {
                spin: values.secret(FieldKey::Spin).unwrap_or_default(),
            },
            StepId::SelectInstruments => SetupEvent::SelectInstruments {
                resources: values
                    .multi(FieldKey::Resources)
                    .map(<[String]>::to_vec)
                    .unwrap_or_default(),
            },
            StepId::Login | StepId::ReauthConfirm => {
                return Err(FlowError::Step("step has no form"));
            }
        };
        Ok(event)
    }

    /// Collects the login task's outcome and advances the flow.
    async fn poll_login(&self) -> Result<FlowResult, FlowError> {
        // The slot lock is released while waiting so `cancel` can still run.
        let taken = self.login_task.lock().await.take();
        let Some(mut task) = taken else {
            warn!("login step has no login task, starting one");
            self.execute_actions(vec![SetupAction::StartLoginTask]).await?;
            return self.render(&SetupState::Login).await;
        };

        let outcome = task.wait().await;
        if self.login_abort.lock().await.is_some() {
            *self.login_task.lock().await = Some(task);
        }

        let event = match outcome {
            Ok(LoginOutcome::LoggedIn) => SetupEvent::LoginSucceeded {
                vehicles: self.discovered_vehicles().await?,
            },
            Ok(LoginOutcome::Failed) => SetupEvent::LoginFailed,
            Err(err) => {
                error!(error = %err, "login task ended without an outcome");
                SetupEvent::LoginTaskLost
            }
        };

        let next = self.dispatch(event).await?;
        match next.step_id() {
            Some(next_step_id) => Ok(FlowResult::ShowProgressDone { next_step_id }),
            None => self.render(&next).await,
        }
    }

    async fn discovered_vehicles(&self) -> Result<BTreeMap<Vin, Vec<Instrument>>, FlowError> {
        let connection = self
            .connection
            .lock()
            .await
            .clone()
            .ok_or(FlowError::Step("login finished without a connection"))?;

        let mut vehicles = BTreeMap::new();
        for vehicle in connection.vehicles() {
            let vin = vehicle.vin();
            info!(vin = %vin, "Found data for vehicle");
            vehicles.insert(vin, vehicle.dashboard().instruments);
        }
        Ok(vehicles)
    }

    async fn dispatch(&self, event: SetupEvent) -> Result<SetupState, FlowError> {
        let mut current = self.context.get_state().await;
        let mut pending_events = vec![event];

        while let Some(event) = pending_events.pop() {
            let from = current.clone();
            let event_name = event.name();
            let draft = self.context.take_draft().await;
            let Transition {
                state: next,
                draft,
                actions,
            } = SetupStateMachine::transition(current, draft, event);
            info!(from = ?from, to = ?next, event = event_name, "setup state transition");

            self.context.set_draft(draft).await;
            self.context.set_state(next.clone()).await;
            let follow_up_events = self.execute_actions(actions).await?;
            current = next;
            pending_events.extend(follow_up_events);
        }

        if current.is_finished() {
            self.connection.lock().await.take();
            self.context.set_draft(WizardDraft::default()).await;
        }

        Ok(current)
    }

    async fn execute_actions(&self, actions: Vec<SetupAction>) -> Result<Vec<SetupEvent>, FlowError> {
        let mut follow_up_events = Vec::new();
        for action in actions {
            match action {
                SetupAction::ResetLoginTask => {
                    debug!("setup executing action ResetLoginTask");
                    self.login_abort.lock().await.take();
                    if let Some(stale) = self.login_task.lock().await.take() {
                        if !stale.is_finished() {
                            warn!("previous login task still running, aborting it");
                            stale.abort();
                        }
                    }
                }
                SetupAction::OpenConnection => {
                    debug!("Creating connection to Connect service");
                    let draft = self.context.get_draft().await;
                    let connection = self.connector.connect(ConnectionCredentials {
                        username: draft.username,
                        password: draft.password,
                        full_debug: draft.debug,
                    });
                    *self.connection.lock().await = Some(connection);
                }
                SetupAction::StartLoginTask => {
                    debug!("setup executing action StartLoginTask");
                    let connection = self
                        .connection
                        .lock()
                        .await
                        .clone()
                        .ok_or(FlowError::Step("login requested without a connection"))?;
                    let mut slot = self.login_task.lock().await;
                    if let Some(previous) = slot.take() {
                        previous.abort();
                    }
                    let task = LoginTask::spawn(self.flow_id.clone(), connection, self.progress.clone());
                    *self.login_abort.lock().await = task.abort_handle();
                    *slot = Some(task);
                }
                SetupAction::CreateEntry(entry) => {
                    debug!("setup executing action CreateEntry");
                    follow_up_events.push(self.create_entry(entry).await?);
                }
            }
        }
        Ok(follow_up_events)
    }

    async fn create_entry(&self, entry: NewConfigEntry) -> Result<SetupEvent, FlowError> {
        if self.entries.find_by_unique_id(&entry.unique_id).await?.is_some() {
            warn!(vin = %entry.unique_id, "vehicle already configured");
            return Ok(SetupEvent::AlreadyConfigured);
        }

        let vin = entry.unique_id.clone();
        let resources = entry.data.resources.len();
        match self.entries.create_entry(entry).await {
            Ok(created) => {
                info!(vin = %vin, entry_id = %created.entry_id, resources, "config entry created");
                *self.created_entry.lock().await = Some(created);
                Ok(SetupEvent::EntryCreated)
            }
            Err(ConfigEntryError::DuplicateUniqueId(vin)) => {
                warn!(vin = %vin, "vehicle configured concurrently");
                Ok(SetupEvent::AlreadyConfigured)
            }
            Err(err) => {
                error!(vin = %vin, error = %err, "failed to create config entry");
                Err(err.into())
            }
        }
    }

    fn form_for(&self, state: &SetupState, draft: &WizardDraft) -> Result<(StepId, FormSchema), FlowError> {
        let form = match state {
            SetupState::User { .. } => (StepId::User, forms::user_form(&self.defaults)),
            SetupState::SelectVehicle { .. } => {
                (StepId::SelectVehicle, forms::select_vehicle_form(draft.vins()))
            }
            SetupState::SetSpin => (StepId::SetSpin, forms::set_spin_form(&self.defaults)),
            SetupState::SelectInstruments { .. } => (
                StepId::SelectInstruments,
                forms::select_instruments_form(draft.selected_instruments()),
            ),
            _ => return Err(FlowError::Step("state has no form")),
        };
        Ok(form)
    }

    async fn render(&self, state: &SetupState) -> Result<FlowResult, FlowError> {
        match state {
            SetupState::Login => Ok(FlowResult::ShowProgress {
                step_id: StepId::Login,
                progress_action: LOGIN_PROGRESS_ACTION,
            }),
            SetupState::Done => {
                let entry = self
                    .created_entry
                    .lock()
                    .await
                    .clone()
                    .ok_or(FlowError::Step("setup finished without an entry"))?;
                Ok(FlowResult::CreateEntry { entry })
            }
            SetupState::Aborted { reason } => Ok(FlowResult::Abort { reason: *reason }),
            SetupState::CreatingEntry => Err(FlowError::Step("entry creation still pending")),
            SetupState::User { error }
            | SetupState::SelectVehicle { error }
            | SetupState::SelectInstruments { error } => {
                let draft = self.context.get_draft().await;
                let (step_id, schema) = self.form_for(state, &draft)?;
                Ok(FlowResult::ShowForm {
                    step_id,
                    schema,
                    errors: form_errors(*error),
                })
            }
            SetupState::SetSpin => {
                let (step_id, schema) = self.form_for(state, &WizardDraft::default())?;
                Ok(FlowResult::ShowForm {
                    step_id,
                    schema,
                    errors: FormErrors::new(),
                })
            }
        }
    }
}

fn form_errors(error: Option<SetupError>) -> FormErrors {
    let field = match error {
        None => return FormErrors::new(),
        Some(err @ SetupError::CannotConnect) => return FormErrors::base(err.code()),
        Some(SetupError::UnknownVehicle) => FieldKey::Vehicle,
        Some(SetupError::UnknownInstrument) => FieldKey::Resources,
    };
    let mut errors = FormErrors::new();
    if let Some(err) = error {
        errors.insert_code(field, err.code());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_connect_is_a_base_error() {
        let errors = form_errors(Some(SetupError::CannotConnect));
        assert_eq!(errors.get("base"), Some("cannot_connect"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unknown_vehicle_is_attached_to_vehicle_field() {
        let errors = form_errors(Some(SetupError::UnknownVehicle));
        assert_eq!(errors.get("vehicle"), Some("unknown_vehicle"));
    }

    #[test]
    fn no_error_renders_empty_errors() {
        assert!(form_errors(None).is_empty());
    }
}
