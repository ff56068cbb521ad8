//! An in-process reader standing in for the native SDK.
//!
//! Keeps symbology and light state, walks through connection transitions, answers the
//! DMCC commands the demo sends and emits a scan result for every trigger.

use cmb_domain::{Availability, ConnectionState, DeviceType, ReadResult, ScanResult, Symbology};
use cmb_scanner::{NativeBridge, NativeCallback, NativeCommand, NativeReply};
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, trace};

const READ_RESULT: &str = "didReceiveReadResultFromReaderCallback";
const AVAILABILITY: &str = "availabilityDidChangeOfReaderCallback";
const CONNECTION_STATE: &str = "connectionStateDidChangeOfReaderCallback";
const SCANNING_STATE: &str = "setActiveStartScanningCallback";

const SDK_VERSION: &str = "2.7.1-sim";
const MX_MODEL: &str = "MX-1502";
const CAMERA_MODEL: &str = "Mobile Camera";
const FIRMWARE: &str = "5.4.2.0061";

pub(crate) const NOT_LOADED: &str = "Reader device not initialized";
pub(crate) const NOT_CONNECTED: &str = "Reader is not connected";

#[derive(Debug)]
struct ReaderState {
    device: Option<DeviceType>,
    connection: ConnectionState,
    scanning: bool,
    lights: bool,
    battery: u8,
    enabled: FxHashSet<Symbology>,
    registrations: FxHashMap<&'static str, NativeCallback>,
    scans: u64,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self {
            device: None,
            connection: ConnectionState::Disconnected,
            scanning: false,
            lights: false,
            battery: 87,
            enabled: FxHashSet::default(),
            registrations: FxHashMap::default(),
            scans: 0,
        }
    }
}

/// Native events queued while the state lock is held and fired after it is released.
type Pending = Vec<(&'static str, NativeReply)>;

/// Simulated reader; clones share state.
#[derive(Debug, Clone, Default)]
pub(crate) struct SimulatedReader {
    state: Arc<Mutex<ReaderState>>,
}

impl SimulatedReader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_state(&self) -> ConnectionState {
        self.state.lock().connection
    }

    #[cfg(test)]
    pub(crate) fn is_enabled(&self, symbology: Symbology) -> bool {
        self.state.lock().enabled.contains(&symbology)
    }

    /// Triggers handled so far.
    pub(crate) fn scans(&self) -> u64 {
        self.state.lock().scans
    }

    fn handle(&self, command: &NativeCommand, events: &mut Pending) -> NativeReply {
        let mut state = self.state.lock();
        let arg = |i: usize| command.args.get(i).cloned().unwrap_or(Value::Null);

        match command.name {
            "loadScanner" => {
                let device = arg(0).as_i64().and_then(|c| DeviceType::try_from(c).ok());
                let Some(device) = device else {
                    return NativeReply::Error(json!("Unsupported device type"));
                };
                state.device = Some(device);
                let available = json!(Availability::Available.code());
                events.push((AVAILABILITY, NativeReply::Success(available)));
                NativeReply::Success(Value::Null)
            },
            "connect" => {
                if state.device.is_none() {
                    return NativeReply::Error(json!(NOT_LOADED));
                }
                let steps = [ConnectionState::Connecting, ConnectionState::Connected];
                transition(&mut state, events, &steps);
                NativeReply::Success(Value::Null)
            },
            "disconnect" => {
                if state.scanning {
                    state.scanning = false;
                    events.push((SCANNING_STATE, NativeReply::Success(json!(false))));
                }
                let steps = [ConnectionState::Disconnecting, ConnectionState::Disconnected];
                transition(&mut state, events, &steps);
                NativeReply::Success(Value::Null)
            },
            "getConnectionState" => NativeReply::Success(json!(state.connection.code())),
            "getAvailability" => {
                let availability = match state.device {
                    Some(_) => Availability::Available,
                    None => Availability::Unknown,
                };
                NativeReply::Success(json!(availability.code()))
            },
            "getSdkVersion" => NativeReply::Success(json!(SDK_VERSION)),
            "getDeviceBatteryLevel" => match state.device {
                Some(DeviceType::Mx1000) if state.connection == ConnectionState::Connected => {
                    NativeReply::Success(json!(state.battery))
                },
                Some(DeviceType::MobileDevice) => {
                    NativeReply::Error(json!("Battery level is not available for this device"))
                },
                _ => NativeReply::Error(json!(NOT_CONNECTED)),
            },
            "setSymbologyEnabled" => {
                let symbology = arg(0).as_i64().and_then(|c| Symbology::try_from(c).ok());
                let Some(symbology) = symbology else {
                    return NativeReply::Error(json!("Unknown symbology"));
                };
                if arg(1).as_bool().unwrap_or(false) {
                    state.enabled.insert(symbology);
                } else {
                    state.enabled.remove(&symbology);
                }
                NativeReply::Success(json!(true))
            },
            "isSymbologyEnabled" => {
                let enabled = arg(0)
                    .as_i64()
                    .and_then(|c| Symbology::try_from(c).ok())
                    .is_some_and(|s| state.enabled.contains(&s));
                NativeReply::Success(json!(u8::from(enabled)))
            },
            "setLightsOn" => {
                state.lights = arg(0).as_bool().unwrap_or(false);
                NativeReply::Success(json!(true))
            },
            "isLightsOn" => NativeReply::Success(json!(u8::from(state.lights))),
            "resetConfig" => {
                state.enabled.clear();
                state.lights = false;
                NativeReply::Success(Value::Null)
            },
            "sendCommand" => dmcc(&state, arg(0).as_str().unwrap_or_default()),
            "startScanning" => {
                if state.connection != ConnectionState::Connected {
                    return NativeReply::Error(json!(NOT_CONNECTED));
                }
                state.scanning = true;
                events.push((SCANNING_STATE, NativeReply::Success(json!(true))));
                let result = next_result(&mut state);
                events.push((READ_RESULT, NativeReply::Success(result)));
                state.scanning = false;
                events.push((SCANNING_STATE, NativeReply::Success(json!(false))));
                NativeReply::Success(Value::Null)
            },
            "stopScanning" => {
                if state.scanning {
                    state.scanning = false;
                    events.push((SCANNING_STATE, NativeReply::Success(json!(false))));
                }
                NativeReply::Success(Value::Null)
            },
            "scanImageFromUri" | "scanImageFromBase64" => {
                let result = next_result(&mut state);
                events.push((READ_RESULT, NativeReply::Success(result)));
                NativeReply::Success(Value::Null)
            },
            "checkCameraPermission" | "requestCameraPermission" => NativeReply::Success(json!(1)),
            "enableCameraFlag" | "disableCameraFlag" | "enableImage" | "enableImageGraphics"
            | "setPreviewOptions" | "setPreviewOverlayMode" | "setCameraMode"
            | "setPreviewContainerPositionAndSize" | "setPreviewContainerFullScreen"
            | "setPreviewContainerBelowStatusBar" | "showToast" | "hideToast" | "registerSDK"
            | "beep" | "setCameraDuplicatesTimeout" | "setParser" | "setStopScannerOnRotate" => {
                NativeReply::Success(Value::Null)
            },
            other => NativeReply::Error(json!(format!("Unsupported action: {other}"))),
        }
    }
}

impl NativeBridge for SimulatedReader {
    fn exec(&self, command: NativeCommand, callback: NativeCallback) {
        if [READ_RESULT, AVAILABILITY, CONNECTION_STATE, SCANNING_STATE].contains(&command.name) {
            trace!(registration = command.name, "Event callback registered");
            self.state.lock().registrations.insert(command.name, callback);
            return;
        }

        let mut events = Pending::new();
        let reply = self.handle(&command, &mut events);
        debug!(action = command.name, success = reply.is_success(), "Simulated reader answered");

        // Events first, so listeners observe the new state before the command settles.
        for (registration, event) in events {
            let target = self.state.lock().registrations.get(registration).cloned();
            if let Some(target) = target {
                target.reply(event);
            }
        }
        callback.reply(reply);
    }
}

fn transition(state: &mut ReaderState, events: &mut Pending, steps: &[ConnectionState]) {
    for &step in steps {
        state.connection = step;
        events.push((CONNECTION_STATE, NativeReply::Success(json!(step.code()))));
    }
}

/// Answers a DMCC command the way an MX reader does.
fn dmcc(state: &ReaderState, command: &str) -> NativeReply {
    let Some(device) = state.device else {
        return NativeReply::Error(json!(NOT_LOADED));
    };
    let mut words = command.split_whitespace();

    match (words.next(), words.next()) {
        (Some("GET"), Some("DEVICE.TYPE")) => {
            NativeReply::Success(json!(if device.is_camera() { CAMERA_MODEL } else { MX_MODEL }))
        },
        (Some("GET"), Some("DEVICE.FIRMWARE-VER")) => NativeReply::Success(json!(FIRMWARE)),
        (Some("GET"), Some("BATTERY.CHARGE")) => NativeReply::Success(json!(state.battery)),
        (Some("SET"), Some(_)) | (Some("CONFIG.SAVE" | "CONFIG.DEFAULT"), None) => {
            NativeReply::Success(Value::Null)
        },
        _ => NativeReply::Error(json!(format!("Unknown DMCC command: {command}"))),
    }
}

/// Reads the next enabled symbology in code order, or reports "NO READ" when none is enabled.
fn next_result(state: &mut ReaderState) -> Value {
    state.scans += 1;
    let mut enabled: Vec<Symbology> = state.enabled.iter().copied().collect();
    enabled.sort_unstable();

    let read = match enabled.len() {
        0 => ReadResult::no_read(),
        len => {
            let index = usize::try_from(state.scans - 1).unwrap_or_default() % len;
            ReadResult::good(enabled[index], format!("SIM-{:04}", state.scans))
        },
    };
    serde_json::to_value(ScanResult::single(read)).unwrap_or(Value::Null)
}
