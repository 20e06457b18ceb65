//! Setup domain module.
//!
//! This module defines the setup flow state machine, the draft it fills and
//! the results flows hand back to the host.

pub mod draft;
pub mod forms;
pub mod result;
pub mod state_machine;

pub use draft::{CredentialsSubmission, WizardDraft};
pub use result::{AbortReason, FlowResult, StepId, LOGIN_PROGRESS_ACTION};
pub use state_machine::{
    SetupAction, SetupError, SetupEvent, SetupState, SetupStateMachine, Transition,
};
