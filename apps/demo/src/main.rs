#![allow(clippy::print_stdout)]

mod cli;
mod config;
mod session;
mod simulator;

use crate::cli::{Cli, Command};
use crate::config::{AppConfig, LogConfig};
use crate::simulator::SimulatedReader;
use anyhow::{Context, Result};
use clap::Parser;
use cmb_domain::Symbology;
use cmb_logger::{FileSink, Logger};
use cmb_scanner::{Request, Scanner};
use strum::IntoEnumIterator;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut app: AppConfig = config::load_config(cli.config.as_deref())?;
    let _logger = logger(&app.log)?;
    if let Some(path) = &cli.config {
        info!(path = %path.display(), "Config loaded");
    }

    match cli.command {
        Command::Run { device, scans } => {
            if let Some(device) = device {
                app.scanner.device = device;
            }
            let reader = SimulatedReader::new();
            let scanner = simulated_scanner(&app, &reader);
            let report = session::run(&scanner, &app.scanner, scans).await?;
            info!(
                triggers = reader.scans(),
                state = reader.connection_state().name(),
                "Simulated reader idle"
            );
            println!("{}", serde_json::to_string(&report)?);
        },
        Command::Symbologies => {
            for symbology in Symbology::iter() {
                println!("{:>2}  {}", symbology.code(), symbology.tag());
            }
        },
        Command::Exec { request } => {
            let request: Request = serde_json::from_str(&request)
                .context("Request must be {\"action\": .., \"args\": [..]}")?;
            let scanner = simulated_scanner(&app, &SimulatedReader::new());
            scanner.forward_all_events();
            let envelope = scanner.dispatch(request).await;
            println!("{}", serde_json::to_string(&envelope)?);
        },
    }

    Ok(())
}

fn simulated_scanner(app: &AppConfig, reader: &SimulatedReader) -> Scanner {
    Scanner::builder().bridge(reader.clone()).config(&app.scanner).build()
}

fn logger(log: &LogConfig) -> Result<Logger> {
    let mut builder =
        Logger::builder().name(env!("CARGO_PKG_NAME")).console(true).level(log.level_filter()?);
    if let Some(level) = log.bridge_level_filter()? {
        builder = builder.bridge_level(level);
    }
    if let Some(dir) = &log.directory {
        let sink = FileSink::new(dir);
        builder = builder.file(if log.json { sink.json() } else { sink });
    }
    Ok(builder.init()?)
}
