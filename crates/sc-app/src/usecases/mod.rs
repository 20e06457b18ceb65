pub mod flow_manager;
pub mod options;
pub mod reauth;
pub mod setup;

pub use flow_manager::{ActiveFlow, FlowManager, FlowManagerDeps};
pub use options::OptionsFlow;
pub use reauth::{ReauthFlow, ReauthFlowPorts};
pub use setup::{SetupFlow, SetupFlowPorts};
