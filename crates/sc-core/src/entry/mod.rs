//! Configuration entry domain module.

pub mod model;
pub mod options;

pub use model::{ConfigEntry, ConvertUnit, EntryData, NewConfigEntry};
pub use options::{OptionsOverlay, ResolvedOptions};
