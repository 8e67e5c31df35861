use crate::domain::endpoint::EndpointPair;
use crate::domain::errors::SwitchError;
use crate::domain::models::{Device, Location, Side};
use tracing::debug;

/// Computes a device's [`Location`] from live status queries on both endpoints.
pub struct LocationResolver<'a> {
    endpoints: EndpointPair<'a>,
}

impl<'a> LocationResolver<'a> {
    pub fn new(endpoints: EndpointPair<'a>) -> Self {
        Self { endpoints }
    }

    /// Query local then remote. Any query failure aborts resolution; the
    /// location is never guessed.
    pub async fn resolve(&self, device: &Device) -> Result<Location, SwitchError> {
        let local = self.query(Side::Local, device).await?;
        let remote = self.query(Side::Remote, device).await?;
        let location = Location::from_status(local, remote);
        debug!(
            "{} ({}): local={} remote={} -> {}",
            device.name, device.mac, local, remote, location
        );
        Ok(location)
    }

    async fn query(&self, side: Side, device: &Device) -> Result<bool, SwitchError> {
        self.endpoints
            .get(side)
            .is_connected(&device.mac)
            .await
            .map_err(|e| SwitchError::from_query(side, e))
    }
}
