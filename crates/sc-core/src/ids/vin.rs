use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Vehicle identification number.
///
/// Used as the unique key of a configuration entry. The value is taken as
/// reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vin(String);

impl Vin {
    pub fn new(vin: String) -> Self {
        Self(vin)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Vin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Vin {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Vin {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
