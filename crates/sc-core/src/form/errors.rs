use std::collections::BTreeMap;

use serde::Serialize;

use crate::form::FieldKey;

/// Key used for errors that are not tied to one field.
pub const BASE_ERROR_KEY: &str = "base";

/// Why a submitted field value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("value is required")]
    Required,
    #[error("expected text")]
    InvalidText,
    #[error("expected a whole number")]
    InvalidInt,
    #[error("value must not be negative")]
    Negative,
    #[error("expected a boolean")]
    InvalidBool,
    #[error("'{0}' is not one of the offered choices")]
    InvalidChoice(String),
}

impl FieldError {
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::Required => "required",
            FieldError::InvalidText => "invalid_text",
            FieldError::InvalidInt => "invalid_int",
            FieldError::Negative => "not_positive",
            FieldError::InvalidBool => "invalid_bool",
            FieldError::InvalidChoice(_) => "invalid_choice",
        }
    }
}

/// Error codes shown next to a rendered form, keyed by field or `base`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding a single flow-wide code.
    pub fn base(code: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.0.insert(BASE_ERROR_KEY.to_string(), code.into());
        errors
    }

    pub fn insert_field(&mut self, key: FieldKey, error: &FieldError) {
        self.0.insert(key.as_str().to_string(), error.code().to_string());
    }

    pub fn insert_code(&mut self, key: FieldKey, code: impl Into<String>) {
        self.0.insert(key.as_str().to_string(), code.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
