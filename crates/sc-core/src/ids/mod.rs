//! ID type wrappers for type safety.

mod id_macro;
pub mod vin;

use serde::{Deserialize, Serialize};

use id_macro::impl_id;

pub use vin::Vin;

/// Identifier of a persisted configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(String);

/// Identifier of one running flow (setup, reauth or options).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowId(String);

impl_id!(EntryId, FlowId);
