pub mod config;
pub mod runtime;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use runtime::run_progress_pump;
pub use tracing::init_tracing_subscriber;
pub use wiring::{build_runtime, AppRuntime};
