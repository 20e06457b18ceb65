use serde::{Deserialize, Serialize};

use crate::config::FlowDefaults;
use crate::entry::{ConfigEntry, ConvertUnit, EntryData};
use crate::security::SecretString;

/// User-editable settings layered on top of an entry's stored data.
///
/// Written wholesale by the options flow; the entry data itself is never
/// touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsOverlay {
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

impl OptionsOverlay {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Effective tunables of an entry: overlay, then entry data, then default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub update_interval: u32,
    pub spin: SecretString,
    pub debug: bool,
    pub mutable: bool,
    pub convert: ConvertUnit,
}

impl ResolvedOptions {
    pub fn resolve(entry: &ConfigEntry, defaults: &FlowDefaults) -> Self {
        Self::from_parts(&entry.options, &entry.data, defaults)
    }

    pub fn from_parts(overlay: &OptionsOverlay, data: &EntryData, defaults: &FlowDefaults) -> Self {
        Self {
            update_interval: overlay
                .update_interval
                .or(data.update_interval)
                .unwrap_or(defaults.update_interval),
            spin: overlay
                .spin
                .clone()
                .or_else(|| data.spin.clone())
                .unwrap_or_else(|| SecretString::from(defaults.spin.as_str())),
            debug: overlay.debug.or(data.debug).unwrap_or(defaults.debug),
            mutable: overlay.mutable.or(data.mutable).unwrap_or(defaults.mutable),
            convert: overlay
                .convert
                .or(data.convert)
                .unwrap_or_else(|| legacy_convert(overlay, data, defaults)),
        }
    }

    /// The overlay a form submission of these values produces.
    pub fn into_overlay(self) -> OptionsOverlay {
        OptionsOverlay {
            update_interval: Some(self.update_interval),
            spin: Some(self.spin),
            debug: Some(self.debug),
            mutable: Some(self.mutable),
            convert: Some(self.convert),
            scandinavian_miles: None,
        }
    }
}

/// Conversion implied by the legacy `scandinavian_miles` flag.
fn legacy_convert(overlay: &OptionsOverlay, data: &EntryData, defaults: &FlowDefaults) -> ConvertUnit {
    match overlay.scandinavian_miles.or(data.scandinavian_miles) {
        Some(true) => ConvertUnit::ScandinavianMiles,
        Some(false) => ConvertUnit::NoConversion,
        None => defaults.convert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_data() -> EntryData {
        EntryData {
            username: "u".into(),
            password: "p".into(),
            vehicle: "VIN1".into(),
            resources: Vec::new(),
            update_interval: None,
            spin: None,
            debug: None,
            mutable: None,
            convert: None,
            scandinavian_miles: None,
        }
    }

    #[test]
    fn falls_back_to_hard_defaults() {
        let defaults = FlowDefaults::default();
        let resolved = ResolvedOptions::from_parts(&OptionsOverlay::default(), &bare_data(), &defaults);

        assert_eq!(resolved.update_interval, defaults.update_interval);
        assert_eq!(resolved.spin.expose(), "");
        assert!(!resolved.debug);
        assert!(resolved.mutable);
        assert_eq!(resolved.convert, ConvertUnit::NoConversion);
    }

    #[test]
    fn each_field_resolves_independently() {
        let defaults = FlowDefaults::default();
        let mut data = bare_data();
        data.update_interval = Some(10);
        data.debug = Some(true);
        data.convert = Some(ConvertUnit::ImperialUnits);

        let overlay = OptionsOverlay {
            update_interval: Some(15),
            mutable: Some(false),
            ..OptionsOverlay::default()
        };

        let resolved = ResolvedOptions::from_parts(&overlay, &data, &defaults);

        assert_eq!(resolved.update_interval, 15); // overlay
        assert!(resolved.debug); // data
        assert!(!resolved.mutable); // overlay
        assert_eq!(resolved.convert, ConvertUnit::ImperialUnits); // data
        assert_eq!(resolved.spin.expose(), ""); // default
    }

    #[test]
    fn legacy_scandinavian_flag_maps_to_convert() {
        let defaults = FlowDefaults::default();
        let mut data = bare_data();
        data.scandinavian_miles = Some(true);

        let resolved = ResolvedOptions::from_parts(&OptionsOverlay::default(), &data, &defaults);
        assert_eq!(resolved.convert, ConvertUnit::ScandinavianMiles);

        let overlay = OptionsOverlay {
            scandinavian_miles: Some(false),
            ..OptionsOverlay::default()
        };
        let resolved = ResolvedOptions::from_parts(&overlay, &data, &defaults);
        assert_eq!(resolved.convert, ConvertUnit::NoConversion);
    }

    #[test]
    fn into_overlay_sets_every_field() {
        let defaults = FlowDefaults::default();
        let overlay = ResolvedOptions::from_parts(&OptionsOverlay::default(), &bare_data(), &defaults)
            .into_overlay();

        assert!(overlay.update_interval.is_some());
        assert!(overlay.spin.is_some());
        assert!(overlay.debug.is_some());
        assert!(overlay.mutable.is_some());
        assert!(overlay.convert.is_some());
        assert!(overlay.scandinavian_miles.is_none());
    }
}
