//! Capability interface every Bluetooth endpoint exposes.
//!
//! The resolver and the switcher are written once against
//! [`BluetoothEndpoint`] and never look at how an endpoint reaches its stack.

use crate::domain::errors::EndpointError;
use crate::domain::models::{Effect, MacAddress, Side};
use async_trait::async_trait;

/// Connect/disconnect/status operations against one Bluetooth stack.
///
/// `connect` and `disconnect` must be idempotent: asking for the state the
/// device is already in succeeds with [`Effect::NoOp`].
#[async_trait]
pub trait BluetoothEndpoint: Send + Sync {
    /// Display name of the host this endpoint drives.
    fn host(&self) -> &str;

    async fn connect(&self, mac: &MacAddress) -> Result<Effect, EndpointError>;

    async fn disconnect(&self, mac: &MacAddress) -> Result<Effect, EndpointError>;

    /// Must fail with [`EndpointError::StatusUnknown`] rather than guess `false`.
    async fn is_connected(&self, mac: &MacAddress) -> Result<bool, EndpointError>;
}

/// The two endpoints of one invocation.
#[derive(Clone, Copy)]
pub struct EndpointPair<'a> {
    pub local: &'a dyn BluetoothEndpoint,
    pub remote: &'a dyn BluetoothEndpoint,
}

impl<'a> EndpointPair<'a> {
    pub fn new(local: &'a dyn BluetoothEndpoint, remote: &'a dyn BluetoothEndpoint) -> Self {
        Self { local, remote }
    }

    pub fn get(&self, side: Side) -> &'a dyn BluetoothEndpoint {
        match side {
            Side::Local => self.local,
            Side::Remote => self.remote,
        }
    }
}
