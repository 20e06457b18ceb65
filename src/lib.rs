//! Host-side wiring for the Connect integration flows.
//!
//! The host builds an [`AppRuntime`] once, drives flows through its
//! [`FlowManager`](sc_app::FlowManager) and receives results of
//! background-triggered steps through its [`FlowUiPort`](sc_core::ports::FlowUiPort).

pub mod bootstrap;

pub use bootstrap::{build_runtime, init_tracing_subscriber, load_config, AppRuntime};
