//! Setup use cases.
//!
//! This module exposes the setup flow orchestrator and its login task.

mod context;
pub mod login_task;
pub mod orchestrator;

pub use login_task::{LoginOutcome, LoginTaskError};
pub use orchestrator::{SetupFlow, SetupFlowPorts};
