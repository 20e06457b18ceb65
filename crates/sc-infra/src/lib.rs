pub mod app_dirs;
pub mod channels;
pub mod config;
pub mod entries;

pub use app_dirs::{AppDirsError, DirsAppDirs};
pub use channels::{ChannelEntryReloader, ChannelFlowProgress};
pub use config::load_app_config;
pub use entries::FileConfigEntryRepository;
