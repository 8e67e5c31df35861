use crate::domain::models::{Action, Location, Side};
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a command channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel itself could not be used: host down, credentials rejected,
    /// tool missing, or the remote side hung past its timeout.
    #[error("cannot reach {host}: {reason}")]
    Unreachable { host: String, reason: String },
    /// The channel worked but the command exited non-zero (or timed out locally).
    #[error("`{command}` failed ({}): {stderr}", status_text(.status))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "no exit status".to_string(),
    }
}

/// Failure reported by one Bluetooth endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("connection status unknown on {host}: {reason}")]
    StatusUnknown { host: String, reason: String },
    #[error("cannot reach {host}: {reason}")]
    ChannelUnreachable { host: String, reason: String },
    #[error("{action} failed on {host}: {reason}")]
    OperationFailed {
        host: String,
        action: Action,
        reason: String,
    },
}

/// Why a switch stopped short of its goal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    #[error("location indeterminate: {0}")]
    LocationIndeterminate(String),
    #[error("{side} endpoint unreachable: {reason}")]
    ChannelUnreachable { side: Side, reason: String },
    #[error("{action} on {side} failed: {reason}")]
    OperationFailed {
        side: Side,
        action: Action,
        reason: String,
    },
    #[error("device is {actual} after switching, expected {expected}")]
    PartialFailure { expected: Location, actual: Location },
}

impl SwitchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SwitchError::LocationIndeterminate(_) => 3,
            SwitchError::ChannelUnreachable { .. } => 4,
            SwitchError::OperationFailed { .. } => 5,
            SwitchError::PartialFailure { .. } => 6,
        }
    }

    /// Classify an error raised by a connect/disconnect step.
    pub fn from_step(side: Side, action: Action, err: EndpointError) -> Self {
        match err {
            EndpointError::ChannelUnreachable { host, reason } => SwitchError::ChannelUnreachable {
                side,
                reason: format!("{}: {}", host, reason),
            },
            EndpointError::OperationFailed { reason, .. } => SwitchError::OperationFailed {
                side,
                action,
                reason,
            },
            EndpointError::StatusUnknown { reason, .. } => SwitchError::OperationFailed {
                side,
                action,
                reason,
            },
        }
    }

    /// Classify an error raised while querying connection status.
    pub fn from_query(side: Side, err: EndpointError) -> Self {
        match err {
            EndpointError::ChannelUnreachable { host, reason } => SwitchError::ChannelUnreachable {
                side,
                reason: format!("{}: {}", host, reason),
            },
            other => SwitchError::LocationIndeterminate(format!("{} side: {}", side, other)),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("config parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Invalid(String),
}
