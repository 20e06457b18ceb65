use std::collections::BTreeMap;

use crate::entry::{ConvertUnit, EntryData};
use crate::ids::Vin;
use crate::security::SecretString;
use crate::vehicle::Instrument;

/// Credentials and basic options submitted on the first step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsSubmission {
    pub username: String,
    pub password: SecretString,
    pub update_interval: u32,
    pub mutable: bool,
    pub convert: ConvertUnit,
    pub debug: bool,
}

/// The not-yet-persisted configuration being assembled by a setup flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardDraft {
    pub username: String,
    pub password: SecretString,
    pub debug: bool,
    pub update_interval: u32,
    pub mutable: bool,
    pub convert: ConvertUnit,
    pub vehicle: Option<Vin>,
    pub spin: SecretString,
    pub resources: Vec<String>,
    /// Discovered vehicles and their instruments. Only lives between the
    /// login and instrument selection steps.
    pub vehicles: BTreeMap<Vin, Vec<Instrument>>,
}

impl WizardDraft {
    /// A fresh draft holding only what the credentials step submitted.
    pub fn from_credentials(submission: CredentialsSubmission) -> Self {
        Self {
            username: submission.username,
            password: submission.password,
            debug: submission.debug,
            update_interval: submission.update_interval,
            mutable: submission.mutable,
            convert: submission.convert,
            ..Self::default()
        }
    }

    pub fn vins(&self) -> impl Iterator<Item = &Vin> {
        self.vehicles.keys()
    }

    /// Instruments of the selected vehicle, empty when none is selected.
    pub fn selected_instruments(&self) -> &[Instrument] {
        self.vehicle
            .as_ref()
            .and_then(|vin| self.vehicles.get(vin))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Entry data for persisting. The vehicle map is not part of it.
    pub fn to_entry_data(&self) -> Option<EntryData> {
        let vehicle = self.vehicle.clone()?;
        Some(EntryData {
            username: self.username.clone(),
            password: self.password.clone(),
            vehicle,
            resources: self.resources.clone(),
            update_interval: Some(self.update_interval),
            spin: Some(self.spin.clone()),
            debug: Some(self.debug),
            mutable: Some(self.mutable),
            convert: Some(self.convert),
            scandinavian_miles: None,
        })
    }
}
