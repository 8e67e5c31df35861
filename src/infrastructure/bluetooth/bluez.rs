//! BlueZ endpoint driven through `bluetoothctl`.

use crate::domain::endpoint::BluetoothEndpoint;
use crate::domain::errors::{ChannelError, EndpointError};
use crate::domain::models::{Action, Effect, MacAddress};
use crate::domain::settings::Timeouts;
use crate::infrastructure::channel::CommandRunner;
use async_trait::async_trait;
use tracing::debug;

const BLUETOOTHCTL: &str = "bluetoothctl";

/// `bluetoothctl` on one host, reached through a [`CommandRunner`].
pub struct BluezController<R> {
    runner: R,
    timeouts: Timeouts,
}

impl<R: CommandRunner> BluezController<R> {
    pub fn new(runner: R, timeouts: Timeouts) -> Self {
        Self { runner, timeouts }
    }

    fn operation_failed(&self, action: Action, reason: String) -> EndpointError {
        EndpointError::OperationFailed {
            host: self.runner.host().to_string(),
            action,
            reason,
        }
    }
}

#[async_trait]
impl<R: CommandRunner> BluetoothEndpoint for BluezController<R> {
    fn host(&self) -> &str {
        self.runner.host()
    }

    async fn connect(&self, mac: &MacAddress) -> Result<Effect, EndpointError> {
        let result = self
            .runner
            .run(
                &[BLUETOOTHCTL, "connect", mac.as_str()],
                self.timeouts.connect(),
            )
            .await;
        match result {
            Ok(out) if contains(&out, "not available") => {
                Err(self.operation_failed(Action::Connect, last_line(&out)))
            }
            Ok(out) if contains(&out, "failed to connect") => {
                if contains(&out, "alreadyconnected") {
                    Ok(Effect::NoOp)
                } else {
                    Err(self.operation_failed(Action::Connect, last_line(&out)))
                }
            }
            Ok(out) if contains(&out, "already connected") => Ok(Effect::NoOp),
            Ok(_) => Ok(Effect::Applied),
            Err(e) if mentions(&e, &["alreadyconnected", "already connected"]) => Ok(Effect::NoOp),
            Err(e) => Err(self.classify(Action::Connect, e)),
        }
    }

    async fn disconnect(&self, mac: &MacAddress) -> Result<Effect, EndpointError> {
        let result = self
            .runner
            .run(
                &[BLUETOOTHCTL, "disconnect", mac.as_str()],
                self.timeouts.disconnect(),
            )
            .await;
        match result {
            Ok(out)
                if ["notconnected", "not connected", "not available"]
                    .iter()
                    .any(|n| contains(&out, n)) =>
            {
                Ok(Effect::NoOp)
            }
            Ok(out) if contains(&out, "failed to disconnect") => {
                Err(self.operation_failed(Action::Disconnect, last_line(&out)))
            }
            Ok(_) => Ok(Effect::Applied),
            // Nothing to disconnect: unknown device or already disconnected.
            Err(e) if mentions(&e, &["not available", "notconnected", "not connected"]) => {
                debug!("[{}] {} already disconnected", self.host(), mac);
                Ok(Effect::NoOp)
            }
            Err(e) => Err(self.classify(Action::Disconnect, e)),
        }
    }

    async fn is_connected(&self, mac: &MacAddress) -> Result<bool, EndpointError> {
        let result = self
            .runner
            .run(&[BLUETOOTHCTL, "info", mac.as_str()], self.timeouts.status())
            .await;
        match result {
            Ok(out) => match parse_connected(&out) {
                Some(connected) => Ok(connected),
                // Some bluetoothctl versions report an unknown device with exit 0.
                None if contains(&out, "not available") => Ok(false),
                None => Err(EndpointError::StatusUnknown {
                    host: self.host().to_string(),
                    reason: format!("no connection state in `{} info` output", BLUETOOTHCTL),
                }),
            },
            Err(ChannelError::Unreachable { host, reason }) => {
                Err(EndpointError::ChannelUnreachable { host, reason })
            }
            // A device the controller does not know cannot be connected to it.
            Err(e) if mentions(&e, &["not available"]) => Ok(false),
            Err(e) => Err(EndpointError::StatusUnknown {
                host: self.host().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl<R: CommandRunner> BluezController<R> {
    fn classify(&self, action: Action, err: ChannelError) -> EndpointError {
        match err {
            ChannelError::Unreachable { host, reason } => {
                EndpointError::ChannelUnreachable { host, reason }
            }
            failed @ ChannelError::CommandFailed { .. } => {
                self.operation_failed(action, failed.to_string())
            }
        }
    }
}

/// Read the `Connected: yes|no` line of `bluetoothctl info`.
pub fn parse_connected(info: &str) -> Option<bool> {
    info.lines()
        .filter_map(|line| line.trim().strip_prefix("Connected:"))
        .map(str::trim)
        .find_map(|value| match value {
            "yes" => Some(true),
            "no" => Some(false),
            _ => None,
        })
}

fn contains(text: &str, needle: &str) -> bool {
    text.to_ascii_lowercase().contains(needle)
}

fn mentions(err: &ChannelError, needles: &[&str]) -> bool {
    match err {
        ChannelError::CommandFailed { stdout, stderr, .. } => needles
            .iter()
            .any(|n| contains(stdout, n) || contains(stderr, n)),
        ChannelError::Unreachable { .. } => false,
    }
}

fn last_line(text: &str) -> String {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}
