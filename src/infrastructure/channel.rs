//! Command channels: run a command line on this machine or on a remote host
//! and hand back its stdout.
//!
//! Every call spawns its own process and is bounded by a timeout; there is no
//! pooling and no retry at this layer.

use crate::domain::errors::ChannelError;
use crate::domain::models::{Host, Protocol};
use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// `ssh` exits with this status when the connection itself failed.
const SSH_CONNECTION_FAILURE: i32 = 255;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Display name of the host commands run on.
    fn host(&self) -> &str;

    async fn run(&self, argv: &[&str], timeout: Duration) -> Result<String, ChannelError>;
}

/// Runs commands directly on this machine.
#[derive(Debug, Clone)]
pub struct LocalShell {
    name: String,
}

impl LocalShell {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl CommandRunner for LocalShell {
    fn host(&self) -> &str {
        &self.name
    }

    async fn run(&self, argv: &[&str], timeout: Duration) -> Result<String, ChannelError> {
        let (program, args) = argv.split_first().ok_or_else(|| ChannelError::Unreachable {
            host: self.name.clone(),
            reason: "empty command".to_string(),
        })?;
        let command_line = argv.join(" ");
        debug!("[{}] $ {}", self.name, command_line);

        let mut cmd = Command::new(program);
        cmd.args(args);

        match capture(cmd, timeout).await {
            Spawned::Failed(e) => Err(ChannelError::Unreachable {
                host: self.name.clone(),
                reason: format!("cannot run {}: {}", program, e),
            }),
            Spawned::TimedOut => Err(ChannelError::CommandFailed {
                command: command_line,
                status: None,
                stdout: String::new(),
                stderr: format!("timed out after {}s", timeout.as_secs()),
            }),
            Spawned::Exited(output) => finish(command_line, output),
        }
    }
}

/// Runs commands on a remote host over `ssh`.
#[derive(Debug, Clone)]
pub struct SshChannel {
    alias: String,
    host: Host,
    connect_timeout: Duration,
    /// Client program and any leading arguments; `ssh` outside tests.
    client: Vec<String>,
}

impl SshChannel {
    pub fn new(alias: impl Into<String>, host: Host, connect_timeout: Duration) -> Self {
        Self {
            alias: alias.into(),
            host,
            connect_timeout,
            client: vec!["ssh".to_string()],
        }
    }

    #[cfg(test)]
    fn with_client(mut self, client: &[&str]) -> Self {
        self.client = client.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Full `ssh` argv for running `argv` on the remote host.
    pub fn ssh_argv(&self, argv: &[&str]) -> Vec<String> {
        let mut out = self.client.clone();
        out.extend([
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
        ]);
        if let Some(port) = self.host.port {
            out.push("-p".to_string());
            out.push(port.to_string());
        }
        out.push(format!("{}@{}", self.host.user, self.host.address));
        out.push("--".to_string());
        out.push(shell_join(argv));
        out
    }

    fn unreachable(&self, reason: String) -> ChannelError {
        ChannelError::Unreachable {
            host: self.alias.clone(),
            reason,
        }
    }
}

#[async_trait]
impl CommandRunner for SshChannel {
    fn host(&self) -> &str {
        &self.alias
    }

    async fn run(&self, argv: &[&str], timeout: Duration) -> Result<String, ChannelError> {
        let full = self.ssh_argv(argv);
        debug!("[{}] $ {}", self.alias, full.join(" "));

        let (program, args) = full
            .split_first()
            .ok_or_else(|| self.unreachable("no ssh client configured".to_string()))?;
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());

        match capture(cmd, timeout).await {
            Spawned::Failed(e) => Err(self.unreachable(format!("cannot run ssh: {}", e))),
            Spawned::TimedOut => Err(self.unreachable(format!(
                "no answer within {}s",
                timeout.as_secs()
            ))),
            Spawned::Exited(output) if output.status.code() == Some(SSH_CONNECTION_FAILURE) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                Err(self.unreachable(if stderr.is_empty() {
                    "ssh connection failed".to_string()
                } else {
                    stderr
                }))
            }
            Spawned::Exited(output) => finish(shell_join(argv), output),
        }
    }
}

/// Where an endpoint's commands run: this machine, or a remote host.
#[derive(Debug, Clone)]
pub enum CommandChannel {
    Local(LocalShell),
    Remote(SshChannel),
}

impl CommandChannel {
    pub fn local(name: impl Into<String>) -> Self {
        CommandChannel::Local(LocalShell::new(name))
    }

    pub fn remote(alias: &str, host: &Host, connect_timeout: Duration) -> Self {
        match host.protocol {
            Protocol::Ssh => {
                CommandChannel::Remote(SshChannel::new(alias, host.clone(), connect_timeout))
            }
        }
    }
}

#[async_trait]
impl CommandRunner for CommandChannel {
    fn host(&self) -> &str {
        match self {
            CommandChannel::Local(shell) => shell.host(),
            CommandChannel::Remote(ssh) => ssh.host(),
        }
    }

    async fn run(&self, argv: &[&str], timeout: Duration) -> Result<String, ChannelError> {
        match self {
            CommandChannel::Local(shell) => shell.run(argv, timeout).await,
            CommandChannel::Remote(ssh) => ssh.run(argv, timeout).await,
        }
    }
}

enum Spawned {
    Exited(Output),
    TimedOut,
    Failed(std::io::Error),
}

async fn capture(mut cmd: Command, timeout: Duration) -> Spawned {
    cmd.env("LC_ALL", "C")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return Spawned::Failed(e),
    };
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Spawned::Exited(output),
        Ok(Err(e)) => Spawned::Failed(e),
        Err(_) => Spawned::TimedOut,
    }
}

fn finish(command: String, output: Output) -> Result<String, ChannelError> {
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() {
        return Ok(stdout);
    }
    Err(ChannelError::CommandFailed {
        command,
        status: output.status.code(),
        stdout,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Join `argv` into one POSIX shell command line.
pub fn shell_join(argv: &[&str]) -> String {
    argv.iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}
