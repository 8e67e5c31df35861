use crate::domain::errors::ConfigError;
use crate::domain::models::{Device, Host, MacAddress, Side};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The `[log]` table. Console output always goes to stderr; the file is
/// opt-in and rotates daily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub file: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: false,
            log_dir: default_log_dir(),
            color: default_color(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_color() -> bool {
    true
}
fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("bt-switch").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Per-operation time limits, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_status_secs")]
    pub status: u64,
    #[serde(default = "default_connect_secs")]
    pub connect: u64,
    #[serde(default = "default_disconnect_secs")]
    pub disconnect: u64,
    /// Handshake limit passed to the remote shell client.
    #[serde(default = "default_ssh_connect_secs")]
    pub ssh_connect: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            status: default_status_secs(),
            connect: default_connect_secs(),
            disconnect: default_disconnect_secs(),
            ssh_connect: default_ssh_connect_secs(),
        }
    }
}

impl Timeouts {
    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status)
    }

    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect)
    }

    pub fn disconnect(&self) -> Duration {
        Duration::from_secs(self.disconnect)
    }

    pub fn ssh_connect(&self) -> Duration {
        Duration::from_secs(self.ssh_connect)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            ("status", self.status),
            ("connect", self.connect),
            ("disconnect", self.disconnect),
            ("ssh_connect", self.ssh_connect),
        ];
        if let Some((name, _)) = all.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::Invalid(format!(
                "timeouts.{} must be at least 1 second",
                name
            )));
        }
        Ok(())
    }
}

fn default_status_secs() -> u64 {
    5
}
fn default_connect_secs() -> u64 {
    15
}
fn default_disconnect_secs() -> u64 {
    8
}
fn default_ssh_connect_secs() -> u64 {
    5
}

/// Default device and peer for one machine, keyed by that machine's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSettings {
    pub device: String,
    pub peer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub devices: BTreeMap<String, Device>,
    #[serde(default)]
    pub hosts: BTreeMap<String, Host>,
    #[serde(default)]
    pub defaults: BTreeMap<String, DefaultSettings>,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default)]
    pub log: LogSettings,
}

/// Command-line choices that override the per-machine defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub device: Option<String>,
    pub peer: Option<String>,
    pub to: Option<String>,
}

/// A switch request resolved against the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub device_alias: String,
    pub device: Device,
    pub peer_alias: String,
    pub peer: Host,
    /// `None` means toggle.
    pub target: Option<Side>,
}

impl AppConfig {
    pub fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.timeouts.validate()?;
        Ok(config)
    }

    /// Work out device, peer and direction for a run on machine `local_name`.
    pub fn resolve_request(
        &self,
        local_name: &str,
        overrides: &Overrides,
    ) -> Result<ResolvedRequest, ConfigError> {
        let defaults = self.defaults.get(local_name);
        let missing = |what: &str| {
            ConfigError::Invalid(format!(
                "no {} given and no [defaults.{}] entry in the config",
                what, local_name
            ))
        };

        let device_alias = match (&overrides.device, defaults) {
            (Some(d), _) => d.clone(),
            (None, Some(d)) => d.device.clone(),
            (None, None) => return Err(missing("device")),
        };

        let to_remote = overrides.to.as_deref().filter(|t| *t != local_name);
        let peer_alias = match (to_remote, &overrides.peer, defaults) {
            (Some(t), _, _) => t.to_string(),
            (None, Some(p), _) => p.clone(),
            (None, None, Some(d)) => d.peer.clone(),
            (None, None, None) => return Err(missing("peer")),
        };
        if peer_alias == local_name {
            return Err(ConfigError::Invalid(format!(
                "peer '{}' is this machine; nothing to switch",
                peer_alias
            )));
        }

        let device = self
            .devices
            .get(&device_alias)
            .cloned()
            .ok_or_else(|| ConfigError::Invalid(format!("Device '{}' not in [devices]", device_alias)))?;
        let peer = self
            .hosts
            .get(&peer_alias)
            .cloned()
            .ok_or_else(|| ConfigError::Invalid(format!("Host '{}' not in [hosts]", peer_alias)))?;

        let target = match overrides.to.as_deref() {
            None => None,
            Some(t) if t == local_name => Some(Side::Local),
            Some(_) => Some(Side::Remote),
        };

        Ok(ResolvedRequest {
            device_alias,
            device,
            peer_alias,
            peer,
            target,
        })
    }
}

/// Loads, edits and saves the TOML configuration file.
pub struct ConfigService {
    config: AppConfig,
    config_path: PathBuf,
}

impl ConfigService {
    /// Open `path` (or the default location); a missing file is an error.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p,
            None => Self::default_path()?,
        };
        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path));
        }
        let config = Self::load_from_file(&config_path)?;
        Ok(Self {
            config,
            config_path,
        })
    }

    /// Like [`ConfigService::load`], but a missing file yields an empty config.
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p,
            None => Self::default_path()?,
        };
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            AppConfig::default()
        };
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            ConfigError::Invalid("Could not determine config directory".to_string())
        })?;
        path.push("bt-switch");
        path.push("config.toml");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> Result<AppConfig, ConfigError> {
        let contents = fs::read_to_string(path)?;
        AppConfig::parse(&contents, path)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(&self.config)?;
        fs::write(&self.config_path, raw)?;
        Ok(())
    }

    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    // --- Devices ---

    pub fn add_device(&mut self, alias: &str, mac: &str, name: &str) -> Result<(), ConfigError> {
        if self.config.devices.contains_key(alias) {
            return Err(ConfigError::Invalid(format!(
                "Device '{}' already exists",
                alias
            )));
        }
        let mac: MacAddress = mac.parse()?;
        self.config.devices.insert(
            alias.to_string(),
            Device {
                mac,
                name: name.to_string(),
            },
        );
        self.save()
    }

    pub fn remove_device(&mut self, alias: &str) -> Result<(), ConfigError> {
        if self.config.devices.remove(alias).is_none() {
            return Err(ConfigError::Invalid(format!("Device '{}' not found", alias)));
        }
        self.save()
    }

    // --- Hosts ---

    pub fn add_host(&mut self, alias: &str, host: Host) -> Result<(), ConfigError> {
        if self.config.hosts.contains_key(alias) {
            return Err(ConfigError::Invalid(format!("Host '{}' already exists", alias)));
        }
        if host.address.trim().is_empty() || host.user.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Host address and user must not be empty".to_string(),
            ));
        }
        self.config.hosts.insert(alias.to_string(), host);
        self.save()
    }

    pub fn remove_host(&mut self, alias: &str) -> Result<(), ConfigError> {
        if self.config.hosts.remove(alias).is_none() {
            return Err(ConfigError::Invalid(format!("Host '{}' not found", alias)));
        }
        self.save()
    }

    // --- Defaults ---

    pub fn set_default(&mut self, hostname: &str, device: &str, peer: &str) -> Result<(), ConfigError> {
        if !self.config.devices.contains_key(device) {
            return Err(ConfigError::Invalid(format!(
                "Device '{}' not found in configuration",
                device
            )));
        }
        if !self.config.hosts.contains_key(peer) {
            return Err(ConfigError::Invalid(format!(
                "Host '{}' not found in configuration",
                peer
            )));
        }
        self.config.defaults.insert(
            hostname.to_string(),
            DefaultSettings {
                device: device.to_string(),
                peer: peer.to_string(),
            },
        );
        self.save()
    }

    pub fn remove_default(&mut self, hostname: &str) -> Result<(), ConfigError> {
        if self.config.defaults.remove(hostname).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Defaults for '{}' not found",
                hostname
            )));
        }
        self.save()
    }
}
