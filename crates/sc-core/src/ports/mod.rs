//! Port interfaces for the application layer
//!
//! Ports define the contract between the flows (use cases) and the host or
//! infrastructure implementations: the telemetry client, entry storage,
//! reload trigger and progress signalling.

pub mod config_entry;
pub mod connection;
pub mod errors;
pub mod progress;
pub mod reload;
pub mod ui_port;

pub use config_entry::ConfigEntryPort;
pub use connection::{ConnectionCredentials, Vehicle, VehicleConnection, VehicleConnectorPort};
pub use errors::ConfigEntryError;
pub use progress::FlowProgressPort;
pub use reload::EntryReloadPort;
pub use ui_port::FlowUiPort;
