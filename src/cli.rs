use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bt-switch",
    version,
    about = "Move a Bluetooth device between this machine and a peer"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        env = "BT_SWITCH_CONFIG",
        help = "Config file (default: <config dir>/bt-switch/config.toml)"
    )]
    pub config: Option<PathBuf>,
    #[arg(short, long, global = true, conflicts_with = "quiet", help = "Debug logging")]
    pub verbose: bool,
    #[arg(short, long, global = true, help = "Only log warnings and errors")]
    pub quiet: bool,
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Which device to move, and where.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(long, global = true, help = "Device alias (default: from [defaults])")]
    pub device: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Host to move the device to; this machine's name pulls it here (default: toggle)"
    )]
    pub to: Option<String>,
    #[arg(long, global = true, help = "Peer host alias (default: from [defaults])")]
    pub peer: Option<String>,
    #[arg(long, global = true, help = "Name of this machine (default: hostname)")]
    pub local: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Switch the device (the default when no command is given)
    Switch,
    /// Show where the device is connected without changing anything
    Status,
    /// Manage bluetooth devices
    Devices {
        #[command(subcommand)]
        command: DeviceCommands,
    },
    /// Manage remote hosts
    Hosts {
        #[command(subcommand)]
        command: HostCommands,
    },
    /// Manage default device and peer per machine
    Defaults {
        #[command(subcommand)]
        command: DefaultCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommands {
    List,
    Add {
        alias: String,
        mac: String,
        name: String,
    },
    Remove {
        alias: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum HostCommands {
    List,
    Add {
        alias: String,
        address: String,
        user: String,
        #[arg(long, value_enum, default_value_t = ProtocolArg::Ssh)]
        protocol: ProtocolArg,
        #[arg(long, value_enum, default_value_t = DriverArg::Bluez)]
        driver: DriverArg,
        #[arg(long)]
        port: Option<u16>,
    },
    Remove {
        alias: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DefaultCommands {
    List,
    Set {
        hostname: String,
        device: String,
        peer: String,
    },
    Remove {
        hostname: String,
    },
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ProtocolArg {
    Ssh,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum DriverArg {
    Bluez,
}

impl Cli {
    /// Switching and status need an existing config file; editing commands
    /// start from an empty one.
    pub fn needs_config(&self) -> bool {
        matches!(self.command, None | Some(Commands::Switch) | Some(Commands::Status))
    }

    /// Log level forced by `-v`/`-q`, if any.
    pub fn level_override(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("warn")
        } else {
            None
        }
    }
}
