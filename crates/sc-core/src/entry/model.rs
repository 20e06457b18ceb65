use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::OptionsOverlay;
use crate::ids::{EntryId, Vin};
use crate::security::SecretString;

/// Unit conversion applied to reported telemetry values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertUnit {
    #[default]
    NoConversion,
    ImperialUnits,
    ScandinavianMiles,
}

impl ConvertUnit {
    pub const ALL: [ConvertUnit; 3] = [
        ConvertUnit::NoConversion,
        ConvertUnit::ImperialUnits,
        ConvertUnit::ScandinavianMiles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConvertUnit::NoConversion => "no_conversion",
            ConvertUnit::ImperialUnits => "imperial_units",
            ConvertUnit::ScandinavianMiles => "scandinavian_miles",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConvertUnit::NoConversion => "No conversion",
            ConvertUnit::ImperialUnits => "Imperial units",
            ConvertUnit::ScandinavianMiles => "km to mil",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.as_str() == value)
    }
}

/// Data stored in a finished configuration entry.
///
/// Tunables are optional: entries written by older versions may lack them,
/// and readers resolve missing values through [`crate::ResolvedOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryData {
    pub username: String,
    pub password: SecretString,
    pub vehicle: Vin,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spin: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convert: Option<ConvertUnit>,
    /// Pre-`convert` flag written by older versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scandinavian_miles: Option<bool>,
}

impl EntryData {
    /// Copy of this data with only the credentials replaced.
    pub fn with_credentials(&self, username: String, password: SecretString) -> Self {
        Self {
            username,
            password,
            ..self.clone()
        }
    }
}

/// A persisted configuration entry, one per vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: EntryId,
    pub unique_id: Vin,
    pub title: String,
    pub data: EntryData,
    #[serde(default)]
    pub options: OptionsOverlay,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConfigEntry {
    pub unique_id: Vin,
    pub title: String,
    pub data: EntryData,
}

impl NewConfigEntry {
    pub fn into_entry(self, entry_id: EntryId, created_at: DateTime<Utc>) -> ConfigEntry {
        ConfigEntry {
            entry_id,
            unique_id: self.unique_id,
            title: self.title,
            data: self.data,
            options: OptionsOverlay::default(),
            created_at,
        }
    }
}
