//! Connect integration flows
//!
//! This crate contains the setup, reauthentication and options flows and the
//! flow manager that routes host submissions to them.

pub mod error;
pub mod usecases;

pub use error::FlowError;
pub use usecases::{
    ActiveFlow, FlowManager, FlowManagerDeps, OptionsFlow, ReauthFlow, ReauthFlowPorts, SetupFlow,
    SetupFlowPorts,
};
