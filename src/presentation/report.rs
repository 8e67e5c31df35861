//! Human-readable and JSON rendering of switch outcomes and config listings.

use crate::domain::errors::SwitchError;
use crate::domain::models::{
    Action, Completion, Effect, Location, Side, Step, StepStatus, SwitchOutcome,
};
use crate::domain::settings::AppConfig;
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub action: Action,
    pub side: Side,
    pub host: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Step> for StepReport {
    fn from(step: &Step) -> Self {
        let (effect, error) = match &step.status {
            StepStatus::Succeeded(effect) => (Some(*effect), None),
            StepStatus::Failed(reason) => (None, Some(reason.clone())),
        };
        Self {
            action: step.action,
            side: step.side,
            host: step.host.clone(),
            ok: error.is_none(),
            effect,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutcomeReport {
    pub device: String,
    pub mac: String,
    pub target: Option<Side>,
    pub initial: Option<Location>,
    #[serde(rename = "final")]
    pub final_location: Option<Location>,
    pub steps: Vec<StepReport>,
    /// `already_at_target`, `done`, or the failure class.
    pub verdict: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub exit_code: i32,
}

impl From<&SwitchOutcome> for OutcomeReport {
    fn from(outcome: &SwitchOutcome) -> Self {
        let (verdict, error) = match &outcome.result {
            Ok(Completion::AlreadyAtTarget) => ("already_at_target", None),
            Ok(Completion::Done) => ("done", None),
            Err(e) => (failure_class(e), Some(e.to_string())),
        };
        Self {
            device: outcome.device.name.clone(),
            mac: outcome.device.mac.to_string(),
            target: outcome.target,
            initial: outcome.initial,
            final_location: outcome.final_location,
            steps: outcome.steps.iter().map(StepReport::from).collect(),
            verdict: verdict.to_string(),
            error,
            exit_code: outcome.exit_code(),
        }
    }
}

fn failure_class(err: &SwitchError) -> &'static str {
    match err {
        SwitchError::LocationIndeterminate(_) => "location_indeterminate",
        SwitchError::ChannelUnreachable { .. } => "channel_unreachable",
        SwitchError::OperationFailed { .. } => "operation_failed",
        SwitchError::PartialFailure { .. } => "partial_failure",
    }
}

/// One line per step, then a verdict line.
pub fn render_outcome(outcome: &SwitchOutcome) -> String {
    let mut out = String::new();
    for step in &outcome.steps {
        let status = match &step.status {
            StepStatus::Succeeded(Effect::Applied) => "ok".to_string(),
            StepStatus::Succeeded(Effect::NoOp) => "ok (no-op)".to_string(),
            StepStatus::Failed(reason) => format!("FAILED: {}", reason),
        };
        let _ = writeln!(
            out,
            "{} on {} ({}) ... {}",
            step.action, step.side, step.host, status
        );
    }

    let device = &outcome.device.name;
    let verdict = match (&outcome.result, outcome.target) {
        (Ok(Completion::AlreadyAtTarget), Some(target)) => {
            format!("{} is already on the {} side; nothing to do", device, target)
        }
        (Ok(_), Some(target)) => format!("{} switched to the {} side", device, target),
        (Ok(_), None) => format!("{} switched", device),
        (Err(e @ SwitchError::PartialFailure { .. }), _) => match outcome.diverged_step() {
            Some(step) => format!(
                "partial failure: {} (after {} on {})",
                e, step.action, step.side
            ),
            None => format!("partial failure: {}", e),
        },
        (Err(e), _) => format!("switch failed: {}", e),
    };
    out.push_str(&verdict);
    out.push('\n');
    out
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub device: String,
    pub mac: String,
    pub peer: String,
    pub location: Location,
}

pub fn render_status(report: &StatusReport) -> String {
    format!(
        "{} ({}): {} [peer: {}]\n",
        report.device, report.mac, report.location, report.peer
    )
}

pub fn render_devices(config: &AppConfig) -> String {
    if config.devices.is_empty() {
        return "No devices configured.\n".to_string();
    }
    let mut out = format!("{:<15} {:<20} {}\n{}\n", "ALIAS", "MAC", "NAME", "-".repeat(50));
    for (alias, dev) in &config.devices {
        let _ = writeln!(out, "{:<15} {:<20} {}", alias, dev.mac.as_str(), dev.name);
    }
    out
}

pub fn render_hosts(config: &AppConfig) -> String {
    if config.hosts.is_empty() {
        return "No hosts configured.\n".to_string();
    }
    let mut out = format!(
        "{:<15} {:<20} {:<10} {:<8} {}\n{}\n",
        "ALIAS",
        "ADDRESS",
        "USER",
        "PROTO",
        "DRIVER",
        "-".repeat(65)
    );
    for (alias, host) in &config.hosts {
        let address = match host.port {
            Some(port) => format!("{}:{}", host.address, port),
            None => host.address.clone(),
        };
        let _ = writeln!(
            out,
            "{:<15} {:<20} {:<10} {:<8} {}",
            alias,
            address,
            host.user,
            host.protocol.to_string(),
            host.driver
        );
    }
    out
}

pub fn render_defaults(config: &AppConfig) -> String {
    if config.defaults.is_empty() {
        return "No defaults configured.\n".to_string();
    }
    let mut out = format!("{:<20} {:<15} {}\n{}\n", "HOSTNAME", "DEVICE", "PEER", "-".repeat(50));
    for (hostname, settings) in &config.defaults {
        let _ = writeln!(out, "{:<20} {:<15} {}", hostname, settings.device, settings.peer);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Device;

    fn outcome(steps: Vec<Step>, result: Result<Completion, SwitchError>) -> SwitchOutcome {
        SwitchOutcome {
            device: Device {
                mac: "00:11:22:33:44:55".parse().unwrap(),
                name: "headphones".to_string(),
            },
            target: Some(Side::Remote),
            initial: Some(Location::OnlyLocal),
            final_location: None,
            steps,
            result,
        }
    }

    fn step(action: Action, side: Side, host: &str, status: StepStatus) -> Step {
        Step {
            action,
            side,
            host: host.to_string(),
            status,
        }
    }

    #[test]
    fn test_render_done() {
        let text = render_outcome(&outcome(
            vec![
                step(
                    Action::Disconnect,
                    Side::Local,
                    "laptop",
                    StepStatus::Succeeded(Effect::Applied),
                ),
                step(
                    Action::Connect,
                    Side::Remote,
                    "desktop",
                    StepStatus::Succeeded(Effect::NoOp),
                ),
            ],
            Ok(Completion::Done),
        ));
        assert_eq!(
            text,
            "disconnect on local (laptop) ... ok\n\
             connect on remote (desktop) ... ok (no-op)\n\
             headphones switched to the remote side\n"
        );
    }

    #[test]
    fn test_render_partial_failure_names_diverged_step() {
        let text = render_outcome(&outcome(
            vec![
                step(
                    Action::Disconnect,
                    Side::Local,
                    "laptop",
                    StepStatus::Succeeded(Effect::Applied),
                ),
                step(
                    Action::Connect,
                    Side::Remote,
                    "desktop",
                    StepStatus::Succeeded(Effect::Applied),
                ),
            ],
            Err(SwitchError::PartialFailure {
                expected: Location::OnlyRemote,
                actual: Location::Neither,
            }),
        ));
        assert!(text.ends_with(
            "partial failure: device is neither after switching, expected only remote (after connect on remote)\n"
        ));
    }

    #[test]
    fn test_json_report_for_failed_step() {
        let report = OutcomeReport::from(&outcome(
            vec![step(
                Action::Disconnect,
                Side::Local,
                "laptop",
                StepStatus::Failed("busy".to_string()),
            )],
            Err(SwitchError::OperationFailed {
                side: Side::Local,
                action: Action::Disconnect,
                reason: "busy".to_string(),
            }),
        ));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["verdict"], "operation_failed");
        assert_eq!(value["exit_code"], 5);
        assert_eq!(value["steps"][0]["ok"], false);
        assert_eq!(value["steps"][0]["error"], "busy");
        assert_eq!(value["initial"], "OnlyLocal");
    }
}
