use sc_core::ids::{EntryId, FlowId};
use sc_core::ports::ConfigEntryError;

/// Errors produced by the flows.
///
/// Expected outcomes (bad credentials, duplicate vehicle) are not errors:
/// they come back as a [`sc_core::setup::FlowResult`].
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("config entry storage failed: {0}")]
    Storage(#[from] ConfigEntryError),
    #[error("config entry not found: {0}")]
    EntryNotFound(EntryId),
    #[error("unknown flow: {0}")]
    UnknownFlow(FlowId),
    #[error("flow already finished")]
    Finished,
    #[error("setup step failed: {0}")]
    Step(&'static str),
}
