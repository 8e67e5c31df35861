use bt_switch::cli::Cli;
use bt_switch::commands;
use bt_switch::domain::settings::{ConfigService, LogSettings};
use bt_switch::infrastructure::logging;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let service = if cli.needs_config() {
        ConfigService::load(cli.config.clone())
    } else {
        ConfigService::load_or_default(cli.config.clone())
    };
    let log_settings = service
        .as_ref()
        .map(|s| s.get().log.clone())
        .unwrap_or_else(|_| LogSettings::default());
    let _guard = match logging::init_logger(&log_settings, cli.level_override()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {:#}", e);
            None
        }
    };

    let result = match service {
        Ok(service) => commands::run(&cli, service).await,
        Err(e) => Err(e.into()),
    };
    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
