use serde::{Deserialize, Serialize};

/// Keys of every field rendered by the flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Username,
    Password,
    UpdateInterval,
    Mutable,
    Convert,
    Debug,
    Vehicle,
    Spin,
    Resources,
}

impl FieldKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Username => "username",
            FieldKey::Password => "password",
            FieldKey::UpdateInterval => "update_interval",
            FieldKey::Mutable => "mutable",
            FieldKey::Convert => "convert",
            FieldKey::Debug => "debug",
            FieldKey::Vehicle => "vehicle",
            FieldKey::Spin => "spin",
            FieldKey::Resources => "resources",
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
