//! # sc-core
//!
//! Core domain models and setup flow logic for the Connect integration.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! the configuration entry model, the options overlay, form schemas, the setup
//! state machine and the ports that infrastructure implements.

pub mod config;
pub mod entry;
pub mod form;
pub mod ids;
pub mod ports;
pub mod security;
pub mod setup;
pub mod vehicle;

// Re-export commonly used types at the crate root
pub use config::{AppConfig, FlowDefaults};
pub use entry::{ConfigEntry, ConvertUnit, EntryData, NewConfigEntry, OptionsOverlay, ResolvedOptions};
pub use ids::{EntryId, FlowId, Vin};
pub use security::SecretString;
pub use vehicle::{Dashboard, Instrument};
