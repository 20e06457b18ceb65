//! Vehicle telemetry models reported by the remote service.

use serde::{Deserialize, Serialize};

/// A named telemetry data point exposed by a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Stable attribute key, stored in the entry's `resources`.
    pub attr: String,
    /// Human readable name shown in the instrument picker.
    pub name: String,
}

impl Instrument {
    pub fn new(attr: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            name: name.into(),
        }
    }
}

/// All instruments a vehicle currently exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    pub instruments: Vec<Instrument>,
}

impl Dashboard {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }
}
