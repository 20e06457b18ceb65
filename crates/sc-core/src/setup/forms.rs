//! Form schemas rendered by the setup, reauth and options flows, and the
//! conversions from validated values back to domain types.

use crate::config::FlowDefaults;
use crate::entry::{ConvertUnit, OptionsOverlay, ResolvedOptions};
use crate::form::{FieldKey, FieldKind, FieldValue, FormSchema, FormValues, SelectOption};
use crate::ids::Vin;
use crate::security::SecretString;
use crate::setup::CredentialsSubmission;
use crate::vehicle::Instrument;

fn convert_options() -> Vec<SelectOption> {
    ConvertUnit::ALL
        .iter()
        .map(|unit| SelectOption::new(unit.as_str(), unit.label()))
        .collect()
}

pub fn user_form(defaults: &FlowDefaults) -> FormSchema {
    FormSchema::new()
        .required(FieldKey::Username, FieldKind::Text, None)
        .required(FieldKey::Password, FieldKind::Password, None)
        .optional(
            FieldKey::UpdateInterval,
            FieldKind::UnsignedInt,
            Some(FieldValue::Int(defaults.initial_update_interval)),
        )
        .optional(
            FieldKey::Mutable,
            FieldKind::Boolean,
            Some(FieldValue::Bool(defaults.mutable)),
        )
        .optional(
            FieldKey::Convert,
            FieldKind::Select {
                options: convert_options(),
            },
            Some(FieldValue::Choice(defaults.convert.as_str().to_string())),
        )
}

pub fn select_vehicle_form<'a>(vins: impl Iterator<Item = &'a Vin>) -> FormSchema {
    let options = vins
        .map(|vin| SelectOption::new(vin.as_str(), vin.as_str()))
        .collect();
    FormSchema::new().required(FieldKey::Vehicle, FieldKind::Select { options }, None)
}

pub fn set_spin_form(defaults: &FlowDefaults) -> FormSchema {
    FormSchema::new().optional(
        FieldKey::Spin,
        FieldKind::Password,
        Some(FieldValue::Secret(SecretString::from(defaults.spin.as_str()))),
    )
}

/// Multi-select over the vehicle's instruments, all selected by default.
pub fn select_instruments_form(instruments: &[Instrument]) -> FormSchema {
    let options = instruments
        .iter()
        .map(|i| SelectOption::new(i.attr.as_str(), i.name.as_str()))
        .collect();
    let all = instruments.iter().map(|i| i.attr.clone()).collect();
    FormSchema::new().optional(
        FieldKey::Resources,
        FieldKind::MultiSelect { options },
        Some(FieldValue::Multi(all)),
    )
}

pub fn reauth_form(username: &str) -> FormSchema {
    FormSchema::new()
        .required(
            FieldKey::Username,
            FieldKind::Text,
            Some(FieldValue::Text(username.to_string())),
        )
        .required(FieldKey::Password, FieldKind::Password, None)
}

pub fn options_form(resolved: &ResolvedOptions) -> FormSchema {
    FormSchema::new()
        .optional(
            FieldKey::UpdateInterval,
            FieldKind::UnsignedInt,
            Some(FieldValue::Int(resolved.update_interval)),
        )
        .optional(
            FieldKey::Spin,
            FieldKind::Password,
            Some(FieldValue::Secret(resolved.spin.clone())),
        )
        .optional(
            FieldKey::Debug,
            FieldKind::Boolean,
            Some(FieldValue::Bool(resolved.debug)),
        )
        .optional(
            FieldKey::Mutable,
            FieldKind::Boolean,
            Some(FieldValue::Bool(resolved.mutable)),
        )
        .optional(
            FieldKey::Convert,
            FieldKind::Select {
                options: convert_options(),
            },
            Some(FieldValue::Choice(resolved.convert.as_str().to_string())),
        )
}

/// Credentials submission from validated `user_form` values.
pub fn credentials_from_values(values: &FormValues, defaults: &FlowDefaults) -> CredentialsSubmission {
    CredentialsSubmission {
        username: values.text(FieldKey::Username).unwrap_or_default().to_string(),
        password: values.secret(FieldKey::Password).unwrap_or_default(),
        update_interval: values
            .int(FieldKey::UpdateInterval)
            .unwrap_or(defaults.initial_update_interval),
        mutable: values.bool(FieldKey::Mutable).unwrap_or(defaults.mutable),
        convert: values
            .text(FieldKey::Convert)
            .and_then(ConvertUnit::parse)
            .unwrap_or(defaults.convert),
        debug: values.bool(FieldKey::Debug).unwrap_or(defaults.debug),
    }
}

/// Options overlay from validated `options_form` values.
///
/// Only the fields the form carries are set.
pub fn overlay_from_values(values: &FormValues) -> OptionsOverlay {
    OptionsOverlay {
        update_interval: values.int(FieldKey::UpdateInterval),
        spin: values.secret(FieldKey::Spin),
        debug: values.bool(FieldKey::Debug),
        mutable: values.bool(FieldKey::Mutable),
        convert: values.text(FieldKey::Convert).and_then(ConvertUnit::parse),
        scandinavian_miles: None,
    }
}
