use crate::cli::{Cli, Commands, DefaultCommands, DeviceCommands, DriverArg, HostCommands, ProtocolArg};
use crate::domain::endpoint::EndpointPair;
use crate::domain::models::{DriverKind, Host, Protocol, SwitchRequest};
use crate::domain::settings::{ConfigService, Overrides, ResolvedRequest};
use crate::domain::switcher::Switcher;
use crate::infrastructure::bluetooth::{local_endpoint, remote_endpoint};
use crate::infrastructure::channel::{CommandRunner, LocalShell};
use crate::presentation::report::{
    render_defaults, render_devices, render_hosts, render_status, StatusReport,
};
use crate::presentation::{render_outcome, JsonOut, OutcomeReport};
use anyhow::Context;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Run one parsed command line and return the process exit code.
pub async fn run(cli: &Cli, mut service: ConfigService) -> anyhow::Result<i32> {
    match &cli.command {
        None | Some(Commands::Switch) => switch(cli, &service).await,
        Some(Commands::Status) => status(cli, &service).await,
        Some(Commands::Devices { command }) => {
            match command {
                DeviceCommands::List => {
                    print_listing(cli.json, &service.get().devices, render_devices(service.get()))?;
                }
                DeviceCommands::Add { alias, mac, name } => {
                    service.add_device(alias, mac, name)?;
                    print_done(cli.json, alias, format!("Device '{}' added.", alias))?;
                }
                DeviceCommands::Remove { alias } => {
                    service.remove_device(alias)?;
                    print_done(cli.json, alias, format!("Device '{}' removed.", alias))?;
                }
            }
            Ok(0)
        }
        Some(Commands::Hosts { command }) => {
            match command {
                HostCommands::List => {
                    print_listing(cli.json, &service.get().hosts, render_hosts(service.get()))?;
                }
                HostCommands::Add {
                    alias,
                    address,
                    user,
                    protocol,
                    driver,
                    port,
                } => {
                    let host = Host {
                        address: address.clone(),
                        user: user.clone(),
                        protocol: match protocol {
                            ProtocolArg::Ssh => Protocol::Ssh,
                        },
                        driver: match driver {
                            DriverArg::Bluez => DriverKind::Bluez,
                        },
                        port: *port,
                    };
                    service.add_host(alias, host)?;
                    print_done(cli.json, alias, format!("Host '{}' added.", alias))?;
                }
                HostCommands::Remove { alias } => {
                    service.remove_host(alias)?;
                    print_done(cli.json, alias, format!("Host '{}' removed.", alias))?;
                }
            }
            Ok(0)
        }
        Some(Commands::Defaults { command }) => {
            match command {
                DefaultCommands::List => {
                    print_listing(cli.json, &service.get().defaults, render_defaults(service.get()))?;
                }
                DefaultCommands::Set {
                    hostname,
                    device,
                    peer,
                } => {
                    service.set_default(hostname, device, peer)?;
                    print_done(cli.json, hostname, format!("Defaults set for '{}'.", hostname))?;
                }
                DefaultCommands::Remove { hostname } => {
                    service.remove_default(hostname)?;
                    print_done(
                        cli.json,
                        hostname,
                        format!("Defaults removed for '{}'.", hostname),
                    )?;
                }
            }
            Ok(0)
        }
    }
}

async fn switch(cli: &Cli, service: &ConfigService) -> anyhow::Result<i32> {
    let (local_name, request) = resolve(cli, service).await?;
    let config = service.get();
    let local = local_endpoint(&local_name, &config.timeouts);
    let remote = remote_endpoint(&request.peer_alias, &request.peer, &config.timeouts);
    let switcher = Switcher::new(EndpointPair::new(&local, &remote));

    let outcome = match request.target {
        Some(target) => {
            switcher
                .switch(&SwitchRequest {
                    device: request.device.clone(),
                    target,
                })
                .await
        }
        None => switcher.toggle(&request.device).await,
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: outcome.is_success(),
                data: OutcomeReport::from(&outcome),
            })?
        );
    } else {
        print!("{}", render_outcome(&outcome));
    }
    Ok(outcome.exit_code())
}

async fn status(cli: &Cli, service: &ConfigService) -> anyhow::Result<i32> {
    let (local_name, request) = resolve(cli, service).await?;
    let config = service.get();
    let local = local_endpoint(&local_name, &config.timeouts);
    let remote = remote_endpoint(&request.peer_alias, &request.peer, &config.timeouts);
    let switcher = Switcher::new(EndpointPair::new(&local, &remote));

    match switcher.status(&request.device).await {
        Ok(location) => {
            let report = StatusReport {
                device: request.device.name.clone(),
                mac: request.device.mac.to_string(),
                peer: request.peer_alias.clone(),
                location,
            };
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: &report
                    })?
                );
            } else {
                print!("{}", render_status(&report));
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(e.exit_code())
        }
    }
}

async fn resolve(cli: &Cli, service: &ConfigService) -> anyhow::Result<(String, ResolvedRequest)> {
    let local_name = match &cli.target.local {
        Some(name) => name.clone(),
        None => hostname().await?,
    };
    let overrides = Overrides {
        device: cli.target.device.clone(),
        peer: cli.target.peer.clone(),
        to: cli.target.to.clone(),
    };
    let request = service.get().resolve_request(&local_name, &overrides)?;
    debug!(
        "Resolved {} on {} with peer {} (target: {:?})",
        request.device_alias, local_name, request.peer_alias, request.target
    );
    Ok((local_name, request))
}

async fn hostname() -> anyhow::Result<String> {
    let name = LocalShell::new("localhost")
        .run(&["hostname"], Duration::from_secs(5))
        .await
        .context("Could not determine this machine's name; pass --local")?;
    Ok(name.trim().to_string())
}

fn print_listing<T: Serialize>(json: bool, data: &T, text: String) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        print!("{}", text);
    }
    Ok(())
}

fn print_done(json: bool, alias: &str, text: String) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: true,
                data: alias
            })?
        );
    } else {
        println!("{}", text);
    }
    Ok(())
}
