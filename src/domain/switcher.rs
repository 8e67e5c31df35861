//! Switch orchestration.
//!
//! ```text
//! resolve ──► plan ──► AlreadyAtTarget
//!                 └──► disconnect(non-target) ──► connect(target) ──► verify
//! ```
//!
//! Steps run strictly one after another. The first failing step aborts the
//! rest; completed steps are kept in the outcome and nothing is rolled back
//! or retried. Re-running is the retry, which is safe because every step is
//! idempotent.

use crate::domain::endpoint::EndpointPair;
use crate::domain::errors::SwitchError;
use crate::domain::models::{
    Action, Completion, Device, Location, MacAddress, Side, Step, StepStatus, SwitchOutcome,
    SwitchRequest,
};
use crate::domain::resolver::LocationResolver;
use tracing::{info, warn};

/// What the switcher will do for a given location and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    AlreadyAtTarget,
    Move {
        disconnect_on: Side,
        connect_on: Side,
    },
}

impl Plan {
    pub fn for_location(location: Location, target: Side) -> Self {
        if location.holder() == Some(target) {
            return Plan::AlreadyAtTarget;
        }
        // Neither, Both and the opposite holder all free the non-target side
        // first. For Neither the disconnect is a no-op.
        Plan::Move {
            disconnect_on: target.other(),
            connect_on: target,
        }
    }
}

/// Target picked when the caller did not name one: a device held locally
/// (alone or on both sides) is pushed, anything else is pulled.
pub fn toggle_target(location: Location) -> Side {
    match location {
        Location::OnlyLocal | Location::Both => Side::Remote,
        Location::OnlyRemote | Location::Neither => Side::Local,
    }
}

pub struct Switcher<'a> {
    endpoints: EndpointPair<'a>,
    resolver: LocationResolver<'a>,
}

impl<'a> Switcher<'a> {
    pub fn new(endpoints: EndpointPair<'a>) -> Self {
        Self {
            endpoints,
            resolver: LocationResolver::new(endpoints),
        }
    }

    /// Current location of `device`, without changing anything.
    pub async fn status(&self, device: &Device) -> Result<Location, SwitchError> {
        self.resolver.resolve(device).await
    }

    /// Move the device so that `request.target` is its only holder.
    pub async fn switch(&self, request: &SwitchRequest) -> SwitchOutcome {
        let device = &request.device;
        info!(
            "Checking connection status for {} ({})...",
            device.name, device.mac
        );
        match self.resolver.resolve(device).await {
            Ok(location) => self.execute(device, request.target, location).await,
            Err(e) => aborted(device, Some(request.target), e),
        }
    }

    /// Push a locally held device, pull anything else.
    pub async fn toggle(&self, device: &Device) -> SwitchOutcome {
        info!(
            "Checking connection status for {} ({})...",
            device.name, device.mac
        );
        match self.resolver.resolve(device).await {
            Ok(location) => {
                let target = toggle_target(location);
                info!("Device is {}, switching to {} side", location, target);
                self.execute(device, target, location).await
            }
            Err(e) => aborted(device, None, e),
        }
    }

    async fn execute(&self, device: &Device, target: Side, initial: Location) -> SwitchOutcome {
        let mut outcome = SwitchOutcome {
            device: device.clone(),
            target: Some(target),
            initial: Some(initial),
            final_location: None,
            steps: Vec::new(),
            result: Ok(Completion::Done),
        };

        let (disconnect_on, connect_on) = match Plan::for_location(initial, target) {
            Plan::AlreadyAtTarget => {
                info!("{} is already on the {} side", device.name, target);
                outcome.final_location = Some(initial);
                outcome.result = Ok(Completion::AlreadyAtTarget);
                return outcome;
            }
            Plan::Move {
                disconnect_on,
                connect_on,
            } => (disconnect_on, connect_on),
        };

        match target {
            Side::Remote => info!("Initiating PUSH to {}", self.endpoints.remote.host()),
            Side::Local => info!("Initiating PULL from {}", self.endpoints.remote.host()),
        }

        for (action, side) in [
            (Action::Disconnect, disconnect_on),
            (Action::Connect, connect_on),
        ] {
            if let Err(e) = self.run_step(&mut outcome.steps, action, side, &device.mac).await {
                outcome.result = Err(e);
                return outcome;
            }
        }

        let expected = Location::held_by(target);
        match self.resolver.resolve(device).await {
            Ok(actual) if actual == expected => {
                info!("{} is now on the {} side", device.name, target);
                outcome.final_location = Some(actual);
            }
            Ok(actual) => {
                warn!(
                    "Verification failed for {}: expected {}, found {}",
                    device.name, expected, actual
                );
                outcome.final_location = Some(actual);
                outcome.result = Err(SwitchError::PartialFailure { expected, actual });
            }
            Err(e) => outcome.result = Err(e),
        }
        outcome
    }

    async fn run_step(
        &self,
        steps: &mut Vec<Step>,
        action: Action,
        side: Side,
        mac: &MacAddress,
    ) -> Result<(), SwitchError> {
        let endpoint = self.endpoints.get(side);
        info!("{} on {} ({})...", action, side, endpoint.host());
        let result = match action {
            Action::Connect => endpoint.connect(mac).await,
            Action::Disconnect => endpoint.disconnect(mac).await,
        };
        match result {
            Ok(effect) => {
                steps.push(Step {
                    action,
                    side,
                    host: endpoint.host().to_string(),
                    status: StepStatus::Succeeded(effect),
                });
                Ok(())
            }
            Err(e) => {
                warn!("{}", e);
                steps.push(Step {
                    action,
                    side,
                    host: endpoint.host().to_string(),
                    status: StepStatus::Failed(e.to_string()),
                });
                Err(SwitchError::from_step(side, action, e))
            }
        }
    }
}

fn aborted(device: &Device, target: Option<Side>, err: SwitchError) -> SwitchOutcome {
    warn!("Not switching {}: {}", device.name, err);
    SwitchOutcome {
        device: device.clone(),
        target,
        initial: None,
        final_location: None,
        steps: Vec::new(),
        result: Err(err),
    }
}
