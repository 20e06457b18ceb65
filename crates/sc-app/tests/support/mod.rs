//! Test doubles shared by the flow tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sc_app::{FlowManager, FlowManagerDeps};
use sc_core::config::FlowDefaults;
use sc_core::entry::{ConfigEntry, ConvertUnit, EntryData, NewConfigEntry};
use sc_core::form::{FieldKey, FormInput};
use sc_core::ids::{EntryId, FlowId, Vin};
use sc_core::ports::{
    ConfigEntryPort, ConnectionCredentials, EntryReloadPort, Vehicle, VehicleConnection,
    VehicleConnectorPort,
};
use sc_core::vehicle::{Dashboard, Instrument};
use sc_infra::{ChannelEntryReloader, ChannelFlowProgress, FileConfigEntryRepository};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

pub const VIN1: &str = "TMBJR7NS4K8000001";
pub const VIN2: &str = "TMBJR7NS4K8000002";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginBehavior {
    Succeed,
    Fail,
    NotLoggedIn,
    Panic,
    /// Login works but the session needs new terms accepted.
    Unvalidated,
    /// Login never returns.
    Hang,
}

pub struct StubVehicle {
    vin: Vin,
    instruments: Vec<Instrument>,
}

impl Vehicle for StubVehicle {
    fn vin(&self) -> Vin {
        self.vin.clone()
    }

    fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.instruments.clone())
    }
}

pub fn garage() -> Vec<Arc<dyn Vehicle>> {
    vec![
        Arc::new(StubVehicle {
            vin: Vin::from(VIN1),
            instruments: vec![
                Instrument::new("fuel_level", "Fuel level"),
                Instrument::new("odometer", "Odometer"),
            ],
        }),
        Arc::new(StubVehicle {
            vin: Vin::from(VIN2),
            instruments: vec![Instrument::new("charging", "Charging")],
        }),
    ]
}

pub struct StubConnection {
    behavior: LoginBehavior,
}

#[async_trait]
impl VehicleConnection for StubConnection {
    async fn login(&self) -> anyhow::Result<()> {
        match self.behavior {
            LoginBehavior::Fail => Err(anyhow::anyhow!("invalid credentials")),
            LoginBehavior::Panic => panic!("client library bug"),
            LoginBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn logged_in(&self) -> bool {
        !matches!(self.behavior, LoginBehavior::NotLoggedIn | LoginBehavior::Fail)
    }

    async fn validate_login(&self) -> anyhow::Result<bool> {
        Ok(!matches!(self.behavior, LoginBehavior::Unvalidated))
    }

    fn vehicles(&self) -> Vec<Arc<dyn Vehicle>> {
        garage()
    }
}

/// Hands out connections whose login behaves as queued; `Succeed` once the
/// queue is empty.
#[derive(Default)]
pub struct StubConnector {
    behaviors: Mutex<VecDeque<LoginBehavior>>,
    seen: Mutex<Vec<ConnectionCredentials>>,
}

impl StubConnector {
    pub fn new(behaviors: impl IntoIterator<Item = LoginBehavior>) -> Arc<Self> {
        Arc::new(Self {
            behaviors: Mutex::new(behaviors.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<ConnectionCredentials> {
        self.seen.lock().unwrap().clone()
    }
}

impl VehicleConnectorPort for StubConnector {
    fn connect(&self, credentials: ConnectionCredentials) -> Arc<dyn VehicleConnection> {
        self.seen.lock().unwrap().push(credentials);
        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(LoginBehavior::Succeed);
        Arc::new(StubConnection { behavior })
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub entries: Arc<FileConfigEntryRepository>,
    pub connector: Arc<StubConnector>,
    pub progress: ChannelFlowProgress,
    pub progress_rx: UnboundedReceiver<FlowId>,
    pub reload: Arc<dyn EntryReloadPort>,
    pub reload_rx: UnboundedReceiver<EntryId>,
}

impl Harness {
    pub fn new(behaviors: impl IntoIterator<Item = LoginBehavior>) -> Self {
        let dir = TempDir::new().unwrap();
        let entries = Arc::new(FileConfigEntryRepository::new(dir.path().join("entries.json")));
        let (progress, progress_rx) = ChannelFlowProgress::new();
        let (reload, reload_rx) = ChannelEntryReloader::new();
        Self {
            dir,
            entries,
            connector: StubConnector::new(behaviors),
            progress,
            progress_rx,
            reload: Arc::new(reload),
            reload_rx,
        }
    }

    pub fn manager(&self, defaults: FlowDefaults) -> FlowManager {
        FlowManager::new(FlowManagerDeps {
            defaults,
            connector: self.connector.clone(),
            entries: self.entries.clone(),
            reload: self.reload.clone(),
            progress: Arc::new(self.progress.clone()),
        })
    }

    /// Waits for the login task of `flow_id` to re-signal its flow.
    pub async fn wait_for_progress(&mut self, flow_id: &FlowId) {
        let signalled = tokio::time::timeout(Duration::from_secs(5), self.progress_rx.recv())
            .await
            .expect("login task did not signal progress in time")
            .expect("progress channel closed");
        assert_eq!(&signalled, flow_id);
    }

    pub async fn seed_entry(&self, vin: &str, data: EntryData) -> ConfigEntry {
        self.entries
            .create_entry(NewConfigEntry {
                unique_id: Vin::from(vin),
                title: vin.to_string(),
                data,
            })
            .await
            .unwrap()
    }
}

pub fn credentials(username: &str, password: &str) -> FormInput {
    FormInput::new()
        .with(FieldKey::Username, username)
        .with(FieldKey::Password, password)
}

pub fn stored_data(vin: &str) -> EntryData {
    EntryData {
        username: "user@example.com".into(),
        password: "old-password".into(),
        vehicle: Vin::from(vin),
        resources: vec!["odometer".into()],
        update_interval: Some(1),
        spin: Some("".into()),
        debug: Some(false),
        mutable: Some(true),
        convert: Some(ConvertUnit::NoConversion),
        scandinavian_miles: None,
    }
}
