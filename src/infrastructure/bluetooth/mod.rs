//! Bluetooth Module
//!
//! Concrete Bluetooth endpoints for the switcher.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Switcher                           │
//! │        (talks only to the BluetoothEndpoint trait)       │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!                       ▼
//!              ┌─────────────────┐
//!              │ BluezController │  bluetoothctl connect/disconnect/info
//!              └────────┬────────┘
//!                       │
//!         ┌─────────────┴─────────────┐
//!         ▼                           ▼
//! ┌───────────────┐          ┌────────────────┐
//! │  LocalShell   │          │   SshChannel   │
//! │ (this machine)│          │ (remote host)  │
//! └───────────────┘          └────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`bluez`] - `bluetoothctl` driver and output parsing

pub mod bluez;

pub use bluez::BluezController;

use crate::domain::models::{DriverKind, Host};
use crate::domain::settings::Timeouts;
use crate::infrastructure::channel::CommandChannel;

/// Endpoint for this machine. The local stack is always BlueZ.
pub fn local_endpoint(name: &str, timeouts: &Timeouts) -> BluezController<CommandChannel> {
    BluezController::new(CommandChannel::local(name), timeouts.clone())
}

/// Endpoint for the configured peer `alias`.
pub fn remote_endpoint(
    alias: &str,
    host: &Host,
    timeouts: &Timeouts,
) -> BluezController<CommandChannel> {
    let channel = CommandChannel::remote(alias, host, timeouts.ssh_connect());
    match host.driver {
        DriverKind::Bluez => BluezController::new(channel, timeouts.clone()),
    }
}
