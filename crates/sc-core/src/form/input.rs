use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::form::FieldKey;

/// Raw field values submitted by the host for one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormInput(Map<String, Value>);

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: FieldKey, value: impl Into<Value>) -> Self {
        self.0.insert(key.as_str().to_string(), value.into());
        self
    }

    /// Accepts a JSON object; anything else yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Value of a field, treating JSON `null` as absent.
    pub fn get(&self, key: FieldKey) -> Option<&Value> {
        self.0.get(key.as_str()).filter(|v| !v.is_null())
    }
}
