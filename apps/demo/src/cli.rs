use clap::{Parser, Subcommand};
use cmb_domain::DeviceType;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cmb-demo", version)]
#[command(about = "Drives the reader bridge against a simulated reader")]
pub(crate) struct Cli {
    /// Config file (TOML, YAML or JSON); `CMB__*` environment variables override it.
    #[arg(long, short, global = true)]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Loads, connects, configures and scans, then disconnects.
    Run {
        /// `mx` or `camera`; overrides the configured device.
        #[arg(long, value_parser = parse_device)]
        device: Option<DeviceType>,

        /// Number of scans to trigger once connected.
        #[arg(long, default_value_t = 3)]
        scans: u32,
    },
    /// Lists the symbology tags and their native codes.
    Symbologies,
    /// Dispatches one request and prints the envelope as JSON.
    ///
    /// Example: `{"action": "setSymbologyEnabled", "args": ["SYMBOL.QR", true]}`.
    Exec {
        request: String,
    },
}

fn parse_device(raw: &str) -> Result<DeviceType, String> {
    raw.parse().map_err(|_| format!("unknown device '{raw}', expected mx or camera"))
}
