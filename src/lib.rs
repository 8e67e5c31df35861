//! Move a Bluetooth accessory between this machine and one peer host.
//!
//! The [`domain::switcher::Switcher`] resolves where the device is connected,
//! disconnects it from the side that should not hold it, connects it on the
//! target side and verifies the result. Endpoints are reached through the
//! [`domain::endpoint::BluetoothEndpoint`] trait; the BlueZ implementation in
//! [`infrastructure::bluetooth`] runs `bluetoothctl` locally or over `ssh`.

pub mod cli;
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
