//! Adapters that hand flow signals to the host over tokio channels.

mod progress;
mod reload;

pub use progress::ChannelFlowProgress;
pub use reload::ChannelEntryReloader;
