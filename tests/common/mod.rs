#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use async_trait::async_trait;
use bt_switch::domain::endpoint::BluetoothEndpoint;
use bt_switch::domain::errors::EndpointError;
use bt_switch::domain::models::{Action, Device, Effect, MacAddress};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Ordered record of every connect/disconnect issued on either endpoint.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<(String, Action)>>>);

impl Journal {
    pub fn actions(&self) -> Vec<(String, Action)> {
        self.0.lock().unwrap().clone()
    }

    pub fn on(&self, host: &str) -> Vec<Action> {
        self.actions()
            .into_iter()
            .filter(|(h, _)| h == host)
            .map(|(_, a)| a)
            .collect()
    }
}

/// What an endpoint does the next time an operation is called.
#[derive(Clone)]
pub enum Fault {
    /// The operation fails with this error.
    Fail(EndpointError),
    /// The operation reports success but the radio state does not change.
    Silent,
}

/// Bluetooth endpoint simulated in memory, with scripted faults.
pub struct SimEndpoint {
    host: String,
    connected: Mutex<bool>,
    journal: Journal,
    connect_faults: Mutex<VecDeque<Fault>>,
    disconnect_faults: Mutex<VecDeque<Fault>>,
    status_fault: Mutex<Option<EndpointError>>,
}

impl SimEndpoint {
    pub fn new(host: &str, connected: bool, journal: &Journal) -> Self {
        Self {
            host: host.to_string(),
            connected: Mutex::new(connected),
            journal: journal.clone(),
            connect_faults: Mutex::new(VecDeque::new()),
            disconnect_faults: Mutex::new(VecDeque::new()),
            status_fault: Mutex::new(None),
        }
    }

    pub fn fail_next_connect(&self, fault: Fault) {
        self.connect_faults.lock().unwrap().push_back(fault);
    }

    pub fn fail_next_disconnect(&self, fault: Fault) {
        self.disconnect_faults.lock().unwrap().push_back(fault);
    }

    pub fn fail_status(&self, err: Option<EndpointError>) {
        *self.status_fault.lock().unwrap() = err;
    }

    pub fn is_on(&self) -> bool {
        *self.connected.lock().unwrap()
    }

    pub fn operation_failed(&self, action: Action) -> EndpointError {
        EndpointError::OperationFailed {
            host: self.host.clone(),
            action,
            reason: "org.bluez.Error.Failed".to_string(),
        }
    }

    pub fn unreachable(&self) -> EndpointError {
        EndpointError::ChannelUnreachable {
            host: self.host.clone(),
            reason: "ssh: connect to host port 22: No route to host".to_string(),
        }
    }

    fn apply(&self, action: Action, want: bool) -> Result<Effect, EndpointError> {
        self.journal
            .0
            .lock()
            .unwrap()
            .push((self.host.clone(), action));
        let faults = match action {
            Action::Connect => &self.connect_faults,
            Action::Disconnect => &self.disconnect_faults,
        };
        match faults.lock().unwrap().pop_front() {
            Some(Fault::Fail(err)) => return Err(err),
            Some(Fault::Silent) => return Ok(Effect::Applied),
            None => {}
        }
        let mut connected = self.connected.lock().unwrap();
        let effect = if *connected == want {
            Effect::NoOp
        } else {
            Effect::Applied
        };
        *connected = want;
        Ok(effect)
    }
}

#[async_trait]
impl BluetoothEndpoint for SimEndpoint {
    fn host(&self) -> &str {
        &self.host
    }

    async fn connect(&self, _mac: &MacAddress) -> Result<Effect, EndpointError> {
        self.apply(Action::Connect, true)
    }

    async fn disconnect(&self, _mac: &MacAddress) -> Result<Effect, EndpointError> {
        self.apply(Action::Disconnect, false)
    }

    async fn is_connected(&self, _mac: &MacAddress) -> Result<bool, EndpointError> {
        if let Some(err) = self.status_fault.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.is_on())
    }
}

pub fn headphones() -> Device {
    Device {
        mac: "00:11:22:33:44:55".parse().unwrap(),
        name: "Test Headphones".to_string(),
    }
}

pub fn mouse() -> Device {
    Device {
        mac: "AA:BB:CC:DD:EE:FF".parse().unwrap(),
        name: "Test Mouse".to_string(),
    }
}

pub const SAMPLE_CONFIG: &str = r#"
[devices.headphones]
mac = "00:11:22:33:44:55"
name = "Test Headphones"

[devices.mouse]
mac = "AA:BB:CC:DD:EE:FF"
name = "Test Mouse"

[hosts.desktop]
address = "192.168.1.10"
user = "jean"
protocol = "ssh"

[defaults.laptop]
device = "headphones"
peer = "desktop"
"#;

/// An isolated config file for driving the binary.
pub struct TestEnv {
    _tmp: TempDir,
    pub config: PathBuf,
}

impl TestEnv {
    pub fn empty() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let config = tmp.path().join("bt-switch").join("config.toml");
        Self { _tmp: tmp, config }
    }

    pub fn with_config(raw: &str) -> Self {
        let env = Self::empty();
        fs::create_dir_all(env.config.parent().expect("config parent")).expect("create config dir");
        fs::write(&env.config, raw).expect("write config");
        env
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("bt-switch");
        cmd.env("BT_SWITCH_CONFIG", &self.config)
            .env_remove("RUST_LOG")
            .arg("--quiet");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(&self.config).expect("read config")
    }
}
