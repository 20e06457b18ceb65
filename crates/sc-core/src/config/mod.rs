//! Configuration data structures.
//!
//! Pure data: TOML → DTO mapping and the immutable flow defaults. Reading the
//! file and resolving platform directories is done by `sc-infra`.

pub mod app_config;
pub mod flow_defaults;

pub use app_config::AppConfig;
pub use flow_defaults::FlowDefaults;
