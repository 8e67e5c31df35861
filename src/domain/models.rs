use crate::domain::errors::{ConfigError, SwitchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bluetooth hardware address, always stored as `XX:XX:XX:XX:XX:XX` in upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MacAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let octets: Vec<&str> = trimmed.split(':').collect();
        let well_formed = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(ConfigError::Invalid(format!(
                "'{}' is not a Bluetooth address (expected XX:XX:XX:XX:XX:XX)",
                s
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Bluetooth accessory. Identity is the address; the name is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub mac: MacAddress,
    pub name: String,
}

/// Control protocol used to reach a remote host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Ssh,
}

/// Bluetooth stack running on a host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    #[default]
    Bluez,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ssh => f.write_str("ssh"),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Bluez => f.write_str("bluez"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub address: String,
    pub user: String,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub driver: DriverKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// One of the two endpoints taking part in a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Local,
    Remote,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Local => Side::Remote,
            Side::Remote => Side::Local,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Local => f.write_str("local"),
            Side::Remote => f.write_str("remote"),
        }
    }
}

/// Where a device is connected right now. Always computed from live queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    OnlyLocal,
    OnlyRemote,
    Neither,
    Both,
}

impl Location {
    pub fn from_status(local: bool, remote: bool) -> Self {
        match (local, remote) {
            (true, false) => Location::OnlyLocal,
            (false, true) => Location::OnlyRemote,
            (false, false) => Location::Neither,
            (true, true) => Location::Both,
        }
    }

    /// The location in which `side` is the single holder.
    pub fn held_by(side: Side) -> Self {
        match side {
            Side::Local => Location::OnlyLocal,
            Side::Remote => Location::OnlyRemote,
        }
    }

    /// The single side holding the device, if there is exactly one.
    pub fn holder(self) -> Option<Side> {
        match self {
            Location::OnlyLocal => Some(Side::Local),
            Location::OnlyRemote => Some(Side::Remote),
            Location::Neither | Location::Both => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Location::OnlyLocal => "only local",
            Location::OnlyRemote => "only remote",
            Location::Neither => "neither",
            Location::Both => "both",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Connect,
    Disconnect,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Connect => f.write_str("connect"),
            Action::Disconnect => f.write_str("disconnect"),
        }
    }
}

/// What a successful connect/disconnect actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Applied,
    /// The device was already in the requested state.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded(Effect),
    Failed(String),
}

/// One connect/disconnect issued during a switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub action: Action,
    pub side: Side,
    /// Display name of the endpoint's host.
    pub host: String,
    pub status: StepStatus,
}

impl Step {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, StepStatus::Succeeded(_))
    }
}

/// A resolved request to move `device` so that `target` is its only holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchRequest {
    pub device: Device,
    pub target: Side,
}

/// How a switch that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    AlreadyAtTarget,
    Done,
}

#[derive(Debug, Clone)]
pub struct SwitchOutcome {
    pub device: Device,
    /// Unknown only when the location could not be resolved in toggle mode.
    pub target: Option<Side>,
    pub initial: Option<Location>,
    pub final_location: Option<Location>,
    pub steps: Vec<Step>,
    pub result: Result<Completion, SwitchError>,
}

impl SwitchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(_) => 0,
            Err(e) => e.exit_code(),
        }
    }

    /// The step whose effect did not hold when verification failed.
    pub fn diverged_step(&self) -> Option<&Step> {
        match &self.result {
            Err(SwitchError::PartialFailure { .. }) => self.steps.last(),
            Err(_) => self.steps.iter().find(|s| !s.succeeded()),
            Ok(_) => None,
        }
    }
}
