use serde::Serialize;

use crate::entry::{ConfigEntry, OptionsOverlay};
use crate::form::{FormErrors, FormSchema};
use crate::ids::EntryId;

/// Host-facing step identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    User,
    Login,
    SelectVehicle,
    SetSpin,
    SelectInstruments,
    ReauthConfirm,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::User => "user",
            StepId::Login => "login",
            StepId::SelectVehicle => "select_vehicle",
            StepId::SetSpin => "set_spin",
            StepId::SelectInstruments => "select_instruments",
            StepId::ReauthConfirm => "reauth_confirm",
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a flow ended without creating an entry.
///
/// `ReauthSuccessful` is the normal way a reauthentication flow finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub enum AbortReason {
    AlreadyConfigured,
    ConnectionFailed,
    ReauthSuccessful,
}

impl AbortReason {
    pub fn code(&self) -> &'static str {
        match self {
            AbortReason::AlreadyConfigured => "already_configured",
            AbortReason::ConnectionFailed => "connection_failed",
            AbortReason::ReauthSuccessful => "reauth_successful",
        }
    }
}

/// Progress action shown while the login task runs.
pub const LOGIN_PROGRESS_ACTION: &str = "task_login";

/// What the host should do after a flow step ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowResult {
    ShowForm {
        step_id: StepId,
        schema: FormSchema,
        errors: FormErrors,
    },
    ShowProgress {
        step_id: StepId,
        progress_action: &'static str,
    },
    ShowProgressDone {
        next_step_id: StepId,
    },
    CreateEntry {
        entry: ConfigEntry,
    },
    OptionsSaved {
        entry_id: EntryId,
        options: OptionsOverlay,
    },
    Abort {
        reason: AbortReason,
    },
}

impl FlowResult {
    /// Whether the flow is over after this result.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlowResult::CreateEntry { .. } | FlowResult::OptionsSaved { .. } | FlowResult::Abort { .. }
        )
    }
}
