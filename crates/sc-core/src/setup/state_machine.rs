//! Setup state machine.
//!
//! Defines a pure state transition function for the initial setup flow.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entry::NewConfigEntry;
use crate::ids::Vin;
use crate::security::SecretString;
use crate::setup::{AbortReason, CredentialsSubmission, StepId, WizardDraft};
use crate::vehicle::Instrument;

/// Setup flow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SetupState {
    /// Credentials and basic options form.
    User { error: Option<SetupError> },
    /// Waiting for the background login task.
    Login,
    /// Vehicle picker.
    SelectVehicle { error: Option<SetupError> },
    /// Optional S-PIN input.
    SetSpin,
    /// Instrument picker.
    SelectInstruments { error: Option<SetupError> },
    /// Entry handed to storage, waiting for the unique id check.
    CreatingEntry,
    /// Entry created.
    Done,
    /// Flow ended without an entry.
    Aborted { reason: AbortReason },
}

impl SetupState {
    pub fn initial() -> Self {
        SetupState::User { error: None }
    }

    /// Host-facing step id, `None` for states that never render.
    pub fn step_id(&self) -> Option<StepId> {
        match self {
            SetupState::User { .. } => Some(StepId::User),
            SetupState::Login => Some(StepId::Login),
            SetupState::SelectVehicle { .. } => Some(StepId::SelectVehicle),
            SetupState::SetSpin => Some(StepId::SetSpin),
            SetupState::SelectInstruments { .. } => Some(StepId::SelectInstruments),
            SetupState::CreatingEntry | SetupState::Done | SetupState::Aborted { .. } => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, SetupState::Done | SetupState::Aborted { .. })
    }
}

/// Events that drive the setup flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupEvent {
    /// Credentials form submitted.
    SubmitCredentials(CredentialsSubmission),
    /// Login task finished and the account is logged in.
    LoginSucceeded {
        vehicles: BTreeMap<Vin, Vec<Instrument>>,
    },
    /// Login raised or the connection reports not logged in.
    LoginFailed,
    /// Login task panicked or was cancelled.
    LoginTaskLost,
    /// Vehicle chosen.
    SelectVehicle { vin: Vin },
    /// S-PIN submitted (may be empty).
    SubmitSpin { spin: SecretString },
    /// Instruments chosen.
    SelectInstruments { resources: Vec<String> },
    /// Storage accepted the entry (orchestrator).
    EntryCreated,
    /// The vehicle already has an entry (orchestrator).
    AlreadyConfigured,
}

impl SetupEvent {
    /// Short name for logs; never includes field values.
    pub fn name(&self) -> &'static str {
        match self {
            SetupEvent::SubmitCredentials(_) => "SubmitCredentials",
            SetupEvent::LoginSucceeded { .. } => "LoginSucceeded",
            SetupEvent::LoginFailed => "LoginFailed",
            SetupEvent::LoginTaskLost => "LoginTaskLost",
            SetupEvent::SelectVehicle { .. } => "SelectVehicle",
            SetupEvent::SubmitSpin { .. } => "SubmitSpin",
            SetupEvent::SelectInstruments { .. } => "SelectInstruments",
            SetupEvent::EntryCreated => "EntryCreated",
            SetupEvent::AlreadyConfigured => "AlreadyConfigured",
        }
    }
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupAction {
    /// Drop any previous login task handle (aborting it if still running).
    ResetLoginTask,
    /// Build a connection from the draft credentials.
    OpenConnection,
    /// Spawn the background login task on the open connection.
    StartLoginTask,
    /// Check the unique id and create the entry.
    CreateEntry(NewConfigEntry),
}

/// Recoverable setup errors, shown on the form they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub enum SetupError {
    CannotConnect,
    UnknownVehicle,
    UnknownInstrument,
}

impl SetupError {
    pub fn code(&self) -> &'static str {
        match self {
            SetupError::CannotConnect => "cannot_connect",
            SetupError::UnknownVehicle => "unknown_vehicle",
            SetupError::UnknownInstrument => "unknown_instrument",
        }
    }
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SetupState,
    pub draft: WizardDraft,
    pub actions: Vec<SetupAction>,
}

impl Transition {
    fn to(state: SetupState, draft: WizardDraft) -> Self {
        Self {
            state,
            draft,
            actions: Vec::new(),
        }
    }
}

/// Pure setup state machine.
pub struct SetupStateMachine;

impl SetupStateMachine {
    pub fn transition(state: SetupState, mut draft: WizardDraft, event: SetupEvent) -> Transition {
        match (state, event) {
            (SetupState::User { .. }, SetupEvent::SubmitCredentials(submission)) => Transition {
                state: SetupState::Login,
                draft: WizardDraft::from_credentials(submission),
                actions: vec![
                    SetupAction::ResetLoginTask,
                    SetupAction::OpenConnection,
                    SetupAction::StartLoginTask,
                ],
            },
            (SetupState::Login, SetupEvent::LoginSucceeded { vehicles }) => {
                draft.vehicles = vehicles;
                Transition::to(SetupState::SelectVehicle { error: None }, draft)
            }
            (SetupState::Login, SetupEvent::LoginFailed) => Transition::to(
                SetupState::User {
                    error: Some(SetupError::CannotConnect),
                },
                draft,
            ),
            (SetupState::Login, SetupEvent::LoginTaskLost) => Transition::to(
                SetupState::Aborted {
                    reason: AbortReason::ConnectionFailed,
                },
                draft,
            ),
            (SetupState::SelectVehicle { .. }, SetupEvent::SelectVehicle { vin }) => {
                if !draft.vehicles.contains_key(&vin) {
                    return Transition::to(
                        SetupState::SelectVehicle {
                            error: Some(SetupError::UnknownVehicle),
                        },
                        draft,
                    );
                }
                draft.vehicle = Some(vin);
                Transition::to(SetupState::SetSpin, draft)
            }
            (SetupState::SetSpin, SetupEvent::SubmitSpin { spin }) => {
                draft.spin = spin;
                Transition::to(SetupState::SelectInstruments { error: None }, draft)
            }
            (SetupState::SelectInstruments { .. }, SetupEvent::SelectInstruments { resources }) => {
                let known = draft.selected_instruments();
                if !resources.iter().all(|r| known.iter().any(|i| &i.attr == r)) {
                    return Transition::to(
                        SetupState::SelectInstruments {
                            error: Some(SetupError::UnknownInstrument),
                        },
                        draft,
                    );
                }
                draft.resources = resources;
                let Some(data) = draft.to_entry_data() else {
                    return Transition::to(
                        SetupState::SelectInstruments {
                            error: Some(SetupError::UnknownVehicle),
                        },
                        draft,
                    );
                };
                draft.vehicles.clear();
                let entry = NewConfigEntry {
                    unique_id: data.vehicle.clone(),
                    title: data.vehicle.to_string(),
                    data,
                };
                Transition {
                    state: SetupState::CreatingEntry,
                    draft,
                    actions: vec![SetupAction::CreateEntry(entry)],
                }
            }
            (SetupState::CreatingEntry, SetupEvent::EntryCreated) => {
                Transition::to(SetupState::Done, draft)
            }
            (SetupState::CreatingEntry, SetupEvent::AlreadyConfigured) => Transition::to(
                SetupState::Aborted {
                    reason: AbortReason::AlreadyConfigured,
                },
                draft,
            ),
            (state, event) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(state = ?state, event = event.name(), "setup event ignored in this state");
                #[cfg(not(feature = "tracing"))]
                let _ = event;
                Transition::to(state, draft)
            }
        }
    }
}
