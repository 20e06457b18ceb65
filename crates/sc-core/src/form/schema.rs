use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::form::{FieldError, FieldKey, FormErrors, FormInput};
use crate::security::SecretString;

/// One entry of a single or multi choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Password,
    /// Whole number >= 0.
    UnsignedInt,
    Boolean,
    Select { options: Vec<SelectOption> },
    MultiSelect { options: Vec<SelectOption> },
}

/// A validated field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Secret(SecretString),
    Int(u32),
    Bool(bool),
    Choice(String),
    Multi(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub key: FieldKey,
    pub kind: FieldKind,
    pub required: bool,
    /// Applied when the field is missing from the submission.
    pub default: Option<FieldValue>,
}

/// Description of a form the host renders for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormSchema {
    pub fields: Vec<FormField>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, key: FieldKey, kind: FieldKind, default: Option<FieldValue>) -> Self {
        self.fields.push(FormField {
            key,
            kind,
            required: true,
            default,
        });
        self
    }

    pub fn optional(mut self, key: FieldKey, kind: FieldKind, default: Option<FieldValue>) -> Self {
        self.fields.push(FormField {
            key,
            kind,
            required: false,
            default,
        });
        self
    }

    pub fn field(&self, key: FieldKey) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Check a submission against the schema, applying defaults for missing
    /// fields. Keys the schema does not know are ignored.
    pub fn validate(&self, input: &FormInput) -> Result<FormValues, FormErrors> {
        let mut values = BTreeMap::new();
        let mut errors = FormErrors::new();

        for field in &self.fields {
            match input.get(field.key) {
                Some(raw) => match coerce(&field.kind, raw) {
                    Ok(value) => {
                        values.insert(field.key, value);
                    }
                    Err(err) => errors.insert_field(field.key, &err),
                },
                None => match (&field.default, field.required) {
                    (Some(default), _) => {
                        values.insert(field.key, default.clone());
                    }
                    (None, true) => errors.insert_field(field.key, &FieldError::Required),
                    (None, false) => {}
                },
            }
        }

        if errors.is_empty() {
            Ok(FormValues(values))
        } else {
            Err(errors)
        }
    }
}

fn coerce(kind: &FieldKind, raw: &Value) -> Result<FieldValue, FieldError> {
    match kind {
        FieldKind::Text => coerce_text(raw).map(FieldValue::Text),
        FieldKind::Password => coerce_text(raw).map(|s| FieldValue::Secret(SecretString::new(s))),
        FieldKind::UnsignedInt => coerce_unsigned(raw).map(FieldValue::Int),
        FieldKind::Boolean => coerce_bool(raw).map(FieldValue::Bool),
        FieldKind::Select { options } => {
            let choice = coerce_text(raw)?;
            if options.iter().any(|o| o.value == choice) {
                Ok(FieldValue::Choice(choice))
            } else {
                Err(FieldError::InvalidChoice(choice))
            }
        }
        FieldKind::MultiSelect { options } => {
            let items = match raw {
                Value::Array(items) => items.iter().map(coerce_text).collect::<Result<Vec<_>, _>>()?,
                // a single value counts as a one-element list
                other => vec![coerce_text(other)?],
            };
            if let Some(unknown) = items.iter().find(|item| !options.iter().any(|o| &o.value == *item)) {
                return Err(FieldError::InvalidChoice(unknown.clone()));
            }
            Ok(FieldValue::Multi(items))
        }
    }
}

fn coerce_text(raw: &Value) -> Result<String, FieldError> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(FieldError::InvalidText),
    }
}

fn coerce_unsigned(raw: &Value) -> Result<u32, FieldError> {
    let value = match raw {
        Value::Number(n) => n.as_i64().ok_or(FieldError::InvalidInt)?,
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| FieldError::InvalidInt)?,
        _ => return Err(FieldError::InvalidInt),
    };
    if value < 0 {
        return Err(FieldError::Negative);
    }
    u32::try_from(value).map_err(|_| FieldError::InvalidInt)
}

fn coerce_bool(raw: &Value) -> Result<bool, FieldError> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).ok_or(FieldError::InvalidBool),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" | "enable" => Ok(true),
            "0" | "false" | "no" | "off" | "disable" => Ok(false),
            _ => Err(FieldError::InvalidBool),
        },
        _ => Err(FieldError::InvalidBool),
    }
}

/// Typed view over a validated submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<FieldKey, FieldValue>);

impl FormValues {
    pub fn get(&self, key: FieldKey) -> Option<&FieldValue> {
        self.0.get(&key)
    }

    pub fn text(&self, key: FieldKey) -> Option<&str> {
        match self.0.get(&key) {
            Some(FieldValue::Text(s)) | Some(FieldValue::Choice(s)) => Some(s),
            Some(FieldValue::Secret(s)) => Some(s.expose()),
            _ => None,
        }
    }

    pub fn secret(&self, key: FieldKey) -> Option<SecretString> {
        match self.0.get(&key) {
            Some(FieldValue::Secret(s)) => Some(s.clone()),
            Some(FieldValue::Text(s)) => Some(SecretString::new(s.clone())),
            _ => None,
        }
    }

    pub fn int(&self, key: FieldKey) -> Option<u32> {
        match self.0.get(&key) {
            Some(FieldValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn bool(&self, key: FieldKey) -> Option<bool> {
        match self.0.get(&key) {
            Some(FieldValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn multi(&self, key: FieldKey) -> Option<&[String]> {
        match self.0.get(&key) {
            Some(FieldValue::Multi(v)) => Some(v),
            _ => None,
        }
    }
}
