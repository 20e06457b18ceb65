use std::sync::Arc;

use async_trait::async_trait;

use crate::ids::Vin;
use crate::security::SecretString;
use crate::vehicle::Dashboard;

/// What a connection is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCredentials {
    pub username: String,
    pub password: SecretString,
    /// Verbose logging inside the client library.
    pub full_debug: bool,
}

/// A vehicle as seen through a logged-in connection.
pub trait Vehicle: Send + Sync {
    fn vin(&self) -> Vin;

    fn dashboard(&self) -> Dashboard;
}

/// Session with the remote telemetry service.
#[async_trait]
pub trait VehicleConnection: Send + Sync {
    /// Authenticate and load the account's vehicles.
    async fn login(&self) -> anyhow::Result<()>;

    fn logged_in(&self) -> bool;

    /// Checks that the session is usable, e.g. no pending terms to accept.
    async fn validate_login(&self) -> anyhow::Result<bool>;

    /// Vehicles loaded by the last successful login.
    fn vehicles(&self) -> Vec<Arc<dyn Vehicle>>;
}

/// Builds connections bound to the host's shared HTTP session.
pub trait VehicleConnectorPort: Send + Sync {
    fn connect(&self, credentials: ConnectionCredentials) -> Arc<dyn VehicleConnection>;
}
