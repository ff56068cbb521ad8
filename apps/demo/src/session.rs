//! The scripted reader session behind `cmb-demo run`.

use anyhow::{Context, Result, bail};
use cmb_domain::config::ScannerConfig;
use cmb_domain::{ConnectionState, ScanResult};
use cmb_scanner::{Envelope, Scanner};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// How long to wait for a connection-state or scan-result event.
const EVENT_WAIT: Duration = Duration::from_secs(5);
const DECODER_EFFORT: u8 = 3;

/// What happened during one session; printed as JSON when the run finishes.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct SessionReport {
    pub(crate) device: &'static str,
    pub(crate) model: Option<String>,
    pub(crate) firmware: Option<String>,
    pub(crate) commands: usize,
    pub(crate) failed: usize,
    pub(crate) reads: Vec<String>,
}

impl SessionReport {
    fn record(&mut self, envelope: &Envelope) {
        self.commands += 1;
        if envelope.status {
            info!(action = %envelope.action, result = ?envelope.result, "OK");
        } else {
            self.failed += 1;
            warn!(action = %envelope.action, err = ?envelope.err, "Failed");
        }
    }
}

/// Runs load, connect, configure, `scans` triggers and disconnect against `scanner`.
pub(crate) async fn run(scanner: &Scanner, config: &ScannerConfig, scans: u32) -> Result<SessionReport> {
    let mut report = SessionReport { device: config.device.name(), ..SessionReport::default() };

    let (state_tx, mut states) = mpsc::unbounded_channel();
    scanner.set_connection_state_listener(move |state| {
        let _ = state_tx.send(state);
    });
    let (result_tx, mut results) = mpsc::unbounded_channel();
    scanner.set_result_listener(move |result| {
        let _ = result_tx.send(result);
    });
    scanner.set_availability_listener(|availability| {
        info!(availability = availability.name(), "Availability changed");
    });
    scanner.set_scanning_state_listener(|scanning| debug!(scanning, "Scanning state changed"));

    if let Some(key) = config.registration_key.as_deref().filter(|k| !k.is_empty()) {
        report.record(&scanner.register_sdk(key).await);
    }

    let loaded = scanner.load_scanner(config.device).await;
    report.record(&loaded);
    if !loaded.status {
        let device = config.device.friendly_name();
        bail!("Loading {device} failed: {}", loaded.err.unwrap_or_default());
    }
    report.record(&scanner.get_sdk_version().await);

    let connected = scanner.connect().await;
    report.record(&connected);
    if !connected.status {
        bail!("Connecting failed: {}", connected.err.unwrap_or_default());
    }
    wait_for(&mut states, ConnectionState::Connected).await?;

    configure(scanner, config, &mut report).await;

    for _ in 0..scans {
        report.record(&scanner.start_scanning().await);
        let read = timeout(EVENT_WAIT, results.recv()).await.ok().flatten();
        report.reads.push(read.as_ref().map_or_else(|| "TIMEOUT".to_owned(), describe));
        report.record(&scanner.stop_scanning().await);
    }

    report.record(&scanner.disconnect().await);
    wait_for(&mut states, ConnectionState::Disconnected).await?;

    info!(
        commands = report.commands,
        failed = report.failed,
        reads = report.reads.len(),
        "Session finished"
    );
    Ok(report)
}

/// Profile, DMCC queries and the device-specific tail, sent once the reader is connected.
async fn configure(scanner: &Scanner, config: &ScannerConfig, report: &mut SessionReport) {
    for envelope in scanner.apply_profile(config).await {
        report.record(&envelope);
    }

    let model = scanner.send_command("GET DEVICE.TYPE").await;
    report.record(&model);
    report.model = text(&model);

    let firmware = scanner.send_command("GET DEVICE.FIRMWARE-VER").await;
    report.record(&firmware);
    report.firmware = text(&firmware);

    if config.device.is_camera() {
        report.record(&scanner.send_command(format!("SET DECODER.EFFORT {DECODER_EFFORT}")).await);
    } else {
        report.record(&scanner.get_device_battery_level().await);
        report.record(&scanner.send_command("CONFIG.SAVE").await);
    }
}

async fn wait_for(
    states: &mut UnboundedReceiver<ConnectionState>,
    wanted: ConnectionState,
) -> Result<()> {
    loop {
        let state = timeout(EVENT_WAIT, states.recv())
            .await
            .with_context(|| format!("No {} event within {EVENT_WAIT:?}", wanted.name()))?
            .context("Connection-state listener closed")?;
        info!(state = state.name(), "Connection state changed");
        if state == wanted {
            return Ok(());
        }
    }
}

fn describe(result: &ScanResult) -> String {
    result.first_good().map_or_else(
        || "NO READ".to_owned(),
        |read| {
            let symbology = read.symbology().map_or("UNKNOWN", |s| s.tag());
            format!("{symbology} {}", read.read_string)
        },
    )
}

fn text(envelope: &Envelope) -> Option<String> {
    envelope.result.as_ref().and_then(|v| v.as_str()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SimulatedReader;
    use cmb_domain::{DeviceType, Symbology, TriggerType};

    #[tokio::test]
    async fn mx_session_configures_and_scans() {
        let reader = SimulatedReader::new();
        let scanner = Scanner::builder().bridge(reader.clone()).build();
        let config =
            ScannerConfig { trigger: Some(TriggerType::Manual), ..ScannerConfig::default() };

        let report = run(&scanner, &config, 2).await.expect("session");

        assert_eq!(report.failed, 0, "{report:?}");
        assert_eq!(report.model.as_deref(), Some("MX-1502"));
        assert_eq!(report.reads, ["SYMBOL.DATAMATRIX SIM-0001", "SYMBOL.C128 SIM-0002"]);
        assert!(reader.is_enabled(Symbology::Codabar));
        assert_eq!(reader.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn camera_session_reports_no_read_without_symbologies() {
        let reader = SimulatedReader::new();
        let scanner = Scanner::builder().bridge(reader.clone()).build();
        let mut config =
            ScannerConfig { device: DeviceType::MobileDevice, ..ScannerConfig::default() };
        config.symbologies.enable.clear();

        let report = run(&scanner, &config, 1).await.expect("session");

        assert_eq!(report.device, "DEVICE_TYPE_MOBILE_DEVICE");
        assert_eq!(report.model.as_deref(), Some("Mobile Camera"));
        assert_eq!(report.reads, ["NO READ"]);
        assert_eq!(report.failed, 0, "{report:?}");
    }
}
