//! In-memory endpoint used by unit tests.

use crate::domain::endpoint::BluetoothEndpoint;
use crate::domain::errors::EndpointError;
use crate::domain::models::{Action, Effect, MacAddress};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Shared log of every connect/disconnect issued, across both endpoints.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<(String, Action)>>>);

impl Journal {
    pub fn actions(&self) -> Vec<(String, Action)> {
        self.0.lock().unwrap().clone()
    }

    fn record(&self, host: &str, action: Action) {
        self.0.lock().unwrap().push((host.to_string(), action));
    }
}

pub struct FakeEndpoint {
    host: String,
    connected: Mutex<bool>,
    journal: Journal,
    unknown_status: bool,
}

impl FakeEndpoint {
    pub fn new(host: &str, connected: bool, journal: &Journal) -> Self {
        Self {
            host: host.to_string(),
            connected: Mutex::new(connected),
            journal: journal.clone(),
            unknown_status: false,
        }
    }

    pub fn with_unknown_status(mut self) -> Self {
        self.unknown_status = true;
        self
    }

    pub fn is_on(&self) -> bool {
        *self.connected.lock().unwrap()
    }

    fn set(&self, on: bool) -> Effect {
        let mut connected = self.connected.lock().unwrap();
        let effect = if *connected == on {
            Effect::NoOp
        } else {
            Effect::Applied
        };
        *connected = on;
        effect
    }
}

#[async_trait]
impl BluetoothEndpoint for FakeEndpoint {
    fn host(&self) -> &str {
        &self.host
    }

    async fn connect(&self, _mac: &MacAddress) -> Result<Effect, EndpointError> {
        self.journal.record(&self.host, Action::Connect);
        Ok(self.set(true))
    }

    async fn disconnect(&self, _mac: &MacAddress) -> Result<Effect, EndpointError> {
        self.journal.record(&self.host, Action::Disconnect);
        Ok(self.set(false))
    }

    async fn is_connected(&self, _mac: &MacAddress) -> Result<bool, EndpointError> {
        if self.unknown_status {
            return Err(EndpointError::StatusUnknown {
                host: self.host.clone(),
                reason: "unparseable output".to_string(),
            });
        }
        Ok(self.is_on())
    }
}
