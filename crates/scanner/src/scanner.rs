//! The command normalizer.
//!
//! Every command-style operation validates its input, issues at most one native call and
//! resolves to an [`Envelope`]. Failures never surface as `Err`; they are carried in
//! `status` / `err`.

use crate::builder::ScannerBuilder;
use crate::coerce;
use crate::envelope::Envelope;
use crate::error::BridgeError;
use crate::events::{self, EventChannel};
use crate::invoker::Invoker;
use crate::listeners::Listeners;
use crate::native::NativeCommand;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use cmb_domain::config::PreviewRect;
use cmb_domain::{
    Availability, CameraMode, CodeMask, ConnectionState, DeviceType, OverlayMode, PreviewOptions,
    ResultParser, ScanResult, Symbology, TriggerType,
};
use fxhash::FxHashSet;
use parking_lot::Mutex;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

pub(crate) const INVALID_URI: &str = "Invalid Uri";
pub(crate) const INVALID_BASE64: &str = "Invalid base64 string";

/// Accepts padded and unpadded input; whitespace is stripped before decoding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Native action names.
pub(crate) mod native {
    pub(crate) const LOAD_SCANNER: &str = "loadScanner";
    pub(crate) const CONNECT: &str = "connect";
    pub(crate) const DISCONNECT: &str = "disconnect";
    pub(crate) const GET_CONNECTION_STATE: &str = "getConnectionState";
    pub(crate) const GET_AVAILABILITY: &str = "getAvailability";
    pub(crate) const GET_SDK_VERSION: &str = "getSdkVersion";
    pub(crate) const GET_BATTERY_LEVEL: &str = "getDeviceBatteryLevel";
    pub(crate) const SET_SYMBOLOGY_ENABLED: &str = "setSymbologyEnabled";
    pub(crate) const IS_SYMBOLOGY_ENABLED: &str = "isSymbologyEnabled";
    pub(crate) const SET_LIGHTS_ON: &str = "setLightsOn";
    pub(crate) const IS_LIGHTS_ON: &str = "isLightsOn";
    pub(crate) const RESET_CONFIG: &str = "resetConfig";
    pub(crate) const SEND_COMMAND: &str = "sendCommand";
    pub(crate) const START_SCANNING: &str = "startScanning";
    pub(crate) const STOP_SCANNING: &str = "stopScanning";
    pub(crate) const SCAN_IMAGE_FROM_URI: &str = "scanImageFromUri";
    pub(crate) const SCAN_IMAGE_FROM_BASE64: &str = "scanImageFromBase64";
    pub(crate) const ENABLE_CAMERA_FLAG: &str = "enableCameraFlag";
    pub(crate) const DISABLE_CAMERA_FLAG: &str = "disableCameraFlag";
    pub(crate) const CHECK_CAMERA_PERMISSION: &str = "checkCameraPermission";
    pub(crate) const REQUEST_CAMERA_PERMISSION: &str = "requestCameraPermission";
    pub(crate) const ENABLE_IMAGE: &str = "enableImage";
    pub(crate) const ENABLE_IMAGE_GRAPHICS: &str = "enableImageGraphics";
    pub(crate) const SET_PREVIEW_OPTIONS: &str = "setPreviewOptions";
    pub(crate) const SET_PREVIEW_OVERLAY_MODE: &str = "setPreviewOverlayMode";
    pub(crate) const SET_CAMERA_MODE: &str = "setCameraMode";
    pub(crate) const SET_PREVIEW_POSITION_AND_SIZE: &str = "setPreviewContainerPositionAndSize";
    pub(crate) const SET_PREVIEW_FULL_SCREEN: &str = "setPreviewContainerFullScreen";
    pub(crate) const SET_PREVIEW_BELOW_STATUS_BAR: &str = "setPreviewContainerBelowStatusBar";
    pub(crate) const SHOW_TOAST: &str = "showToast";
    pub(crate) const HIDE_TOAST: &str = "hideToast";
    pub(crate) const REGISTER_SDK: &str = "registerSDK";
    pub(crate) const BEEP: &str = "beep";
    pub(crate) const SET_DUPLICATES_TIMEOUT: &str = "setCameraDuplicatesTimeout";
    pub(crate) const SET_PARSER: &str = "setParser";
    pub(crate) const SET_STOP_SCANNER_ON_ROTATE: &str = "setStopScannerOnRotate";
}

/// Handle to a reader behind a native bridge. Cheap to clone; clones share the same bridge,
/// listener context and timeout.
#[derive(Debug, Clone)]
pub struct Scanner {
    pub(crate) inner: Arc<ScannerInner>,
}

#[derive(Debug)]
pub(crate) struct ScannerInner {
    pub(crate) invoker: Invoker,
    pub(crate) listeners: Arc<Listeners>,
    /// Event channels whose forwarding callback is already registered natively.
    pub(crate) forwarding: Mutex<FxHashSet<&'static str>>,
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

impl Scanner {
    #[must_use = "Creates a new scanner builder"]
    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::new()
    }

    #[must_use]
    pub fn listeners(&self) -> &Arc<Listeners> {
        &self.inner.listeners
    }

    #[must_use]
    pub fn invoker(&self) -> &Invoker {
        &self.inner.invoker
    }

    /// Issues `command` and settles `envelope` with its outcome.
    pub(crate) async fn run(
        &self,
        envelope: Envelope,
        command: NativeCommand,
        shape: impl FnOnce(Value) -> Value,
    ) -> Envelope {
        let outcome = self.inner.invoker.call(command).await;
        settled(envelope.settle(outcome, shape))
    }

    // --- Reader lifecycle ---

    /// Prepares the reader for `device`. Does not connect.
    pub async fn load_scanner(&self, device: DeviceType) -> Envelope {
        let command = NativeCommand::new(native::LOAD_SCANNER).arg(device.code());
        let envelope = self.run(Envelope::new("LOAD READER"), command, coerce::non_empty).await;
        if envelope.status {
            envelope.with("type", device.code()).with("name", device.name())
        } else {
            envelope
        }
    }

    /// Connects to the loaded reader. State changes arrive on the connection-state listener.
    pub async fn connect(&self) -> Envelope {
        self.run(Envelope::new("CONNECT"), NativeCommand::new(native::CONNECT), |_| Value::Bool(true))
            .await
    }

    pub async fn disconnect(&self) -> Envelope {
        self.run(Envelope::new("DISCONNECT"), NativeCommand::new(native::DISCONNECT), |_| {
            Value::Bool(true)
        })
        .await
    }

    pub async fn get_connection_state(&self) -> Envelope {
        let command = NativeCommand::new(native::GET_CONNECTION_STATE);
        self.run(Envelope::new("GET CONNECTION.STATE"), command, coerce::non_empty).await
    }

    pub async fn get_availability(&self) -> Envelope {
        let command = NativeCommand::new(native::GET_AVAILABILITY);
        self.run(Envelope::new("GET AVAILABILITY"), command, coerce::non_empty).await
    }

    pub async fn get_sdk_version(&self) -> Envelope {
        let command = NativeCommand::new(native::GET_SDK_VERSION);
        self.run(Envelope::new("GET SDK.VERSION"), command, coerce::non_empty).await
    }

    /// Battery charge in percent; also exposed as the `charge` extra.
    pub async fn get_device_battery_level(&self) -> Envelope {
        let command = NativeCommand::new(native::GET_BATTERY_LEVEL);
        let envelope = self.run(Envelope::new("GET BATTERY.CHARGE"), command, coerce::non_empty).await;
        match envelope.result.clone() {
            Some(charge) => envelope.with("charge", charge),
            None => envelope,
        }
    }

    // --- Symbologies and lights ---

    /// `result` reports whether the reader confirmed the symbology as enabled.
    pub async fn set_symbology_enabled(&self, symbology: Symbology, enabled: bool) -> Envelope {
        let envelope = Envelope::new(format!("SET {} {}", symbology.tag(), on_off(enabled)));
        let command =
            NativeCommand::new(native::SET_SYMBOLOGY_ENABLED).arg(symbology.code()).arg(enabled);
        self.run(envelope, command, loose_flag).await
    }

    pub async fn is_symbology_enabled(&self, symbology: Symbology) -> Envelope {
        let envelope = Envelope::new(format!("GET {}", symbology.tag()));
        let command = NativeCommand::new(native::IS_SYMBOLOGY_ENABLED).arg(symbology.code());
        self.run(envelope, command, loose_flag).await
    }

    pub async fn set_lights_on(&self, on: bool) -> Envelope {
        let envelope = Envelope::new(format!("SET LIGHT.INTERNAL-ENABLE {}", on_off(on)));
        self.run(envelope, NativeCommand::new(native::SET_LIGHTS_ON).arg(on), loose_flag).await
    }

    pub async fn is_lights_on(&self) -> Envelope {
        let command = NativeCommand::new(native::IS_LIGHTS_ON);
        self.run(Envelope::new("GET LIGHT.INTERNAL-ENABLE"), command, loose_flag).await
    }

    /// Restores the reader's factory configuration.
    pub async fn reset_config(&self) -> Envelope {
        let command = NativeCommand::new(native::RESET_CONFIG);
        self.run(Envelope::new("CONFIG.DEFAULT"), command, coerce::non_empty).await
    }

    // --- DMCC ---

    /// Sends a DMCC command verbatim; `action` is the command text.
    pub async fn send_command(&self, command: impl Into<String>) -> Envelope {
        let text = command.into();
        let request = NativeCommand::new(native::SEND_COMMAND).arg(text.clone());
        self.run(Envelope::new(text), request, coerce::non_empty).await
    }

    /// Applies a trigger type through `SET TRIGGER.TYPE <code>`.
    pub async fn set_trigger_type(&self, trigger: TriggerType) -> Envelope {
        let text = format!("SET TRIGGER.TYPE {}", trigger.code());
        let envelope = Envelope::new(text.clone()).with("trigger", trigger.code());
        let command = NativeCommand::new(native::SEND_COMMAND).arg(text);
        self.run(envelope, command, coerce::non_empty).await
    }

    // --- Scanning ---

    pub async fn start_scanning(&self) -> Envelope {
        self.ensure_forwarding(EventChannel::ScanningState);
        let command = NativeCommand::new(native::START_SCANNING);
        self.run(Envelope::new("START SCANNING"), command, coerce::non_empty).await
    }

    pub async fn stop_scanning(&self) -> Envelope {
        self.ensure_forwarding(EventChannel::ScanningState);
        let command = NativeCommand::new(native::STOP_SCANNING);
        self.run(Envelope::new("STOP SCANNING"), command, coerce::non_empty).await
    }

    /// Starts scanning, installing `handler` as the scanning-state listener only if none is set.
    pub async fn start_scanning_with(
        &self,
        handler: impl Fn(bool) + Send + Sync + 'static,
    ) -> Envelope {
        self.inner.listeners.scanning_state.set_if_empty(handler);
        self.start_scanning().await
    }

    /// Stops scanning, installing `handler` as the scanning-state listener only if none is set.
    pub async fn stop_scanning_with(
        &self,
        handler: impl Fn(bool) + Send + Sync + 'static,
    ) -> Envelope {
        self.inner.listeners.scanning_state.set_if_empty(handler);
        self.stop_scanning().await
    }

    /// Decodes a stored image. Results arrive on the scan-result listener.
    pub async fn scan_image_from_uri(&self, uri: &str) -> Envelope {
        let envelope = Envelope::new("SCAN IMAGE URI").with("uri", uri);
        if !is_valid_uri(uri) {
            return rejected(envelope, INVALID_URI);
        }
        let command = NativeCommand::new(native::SCAN_IMAGE_FROM_URI).arg(uri);
        self.run(envelope, command, |_| Value::Bool(true)).await
    }

    /// Decodes a base64 image; a `data:*;base64,` prefix is accepted.
    pub async fn scan_image_from_base64(&self, data: &str) -> Envelope {
        let envelope = Envelope::new("SCAN IMAGE BASE64");
        if !is_valid_base64(data) {
            return rejected(envelope, INVALID_BASE64);
        }
        let command = NativeCommand::new(native::SCAN_IMAGE_FROM_BASE64).arg(data);
        self.run(envelope, command, |_| Value::Bool(true)).await
    }

    // --- Camera decoder ---

    pub async fn enable_camera_flag(&self, mask: CodeMask, flag: u32) -> Envelope {
        self.camera_flag(native::ENABLE_CAMERA_FLAG, "ENABLE", mask, flag).await
    }

    pub async fn disable_camera_flag(&self, mask: CodeMask, flag: u32) -> Envelope {
        self.camera_flag(native::DISABLE_CAMERA_FLAG, "DISABLE", mask, flag).await
    }

    async fn camera_flag(
        &self,
        name: &'static str,
        verb: &str,
        mask: CodeMask,
        flag: u32,
    ) -> Envelope {
        let envelope = Envelope::new(format!("{verb} CAMERA.FLAG {} {flag}", mask.bits()));
        let command = NativeCommand::new(name).arg(mask.bits()).arg(flag);
        self.run(envelope, command, |_| Value::Bool(true)).await
    }

    // --- Permissions ---

    /// On failure the `canRequest` extra tells whether asking the user is still possible.
    pub async fn check_camera_permission(&self) -> Envelope {
        self.permission(native::CHECK_CAMERA_PERMISSION, "CHECK CAMERA.PERMISSION").await
    }

    pub async fn request_camera_permission(&self) -> Envelope {
        self.permission(native::REQUEST_CAMERA_PERMISSION, "REQUEST CAMERA.PERMISSION").await
    }

    async fn permission(&self, name: &'static str, action: &'static str) -> Envelope {
        let envelope = Envelope::new(action);
        match self.inner.invoker.call(NativeCommand::new(name)).await {
            Ok(_) => settled(envelope.succeeded(Value::Bool(true))),
            Err(BridgeError::Native { message, payload }) => settled(
                envelope.with("canRequest", coerce::loosely_one(&payload)).failed(message),
            ),
            Err(err) => settled(envelope.failed(err.to_string())),
        }
    }

    // --- Configuration setters ---

    pub async fn enable_image(&self, enable: bool) -> Envelope {
        let envelope = Envelope::new(format!("SET IMAGE.ENABLE {}", on_off(enable)));
        self.run(envelope, NativeCommand::new(native::ENABLE_IMAGE).arg(enable), coerce::non_empty)
            .await
    }

    pub async fn enable_image_graphics(&self, enable: bool) -> Envelope {
        let envelope = Envelope::new(format!("SET IMAGE-GRAPHICS.ENABLE {}", on_off(enable)));
        let command = NativeCommand::new(native::ENABLE_IMAGE_GRAPHICS).arg(enable);
        self.run(envelope, command, coerce::non_empty).await
    }

    pub async fn set_preview_options(&self, options: PreviewOptions) -> Envelope {
        let envelope = Envelope::new(format!("SET PREVIEW.OPTIONS {}", options.bits()));
        let command = NativeCommand::new(native::SET_PREVIEW_OPTIONS).arg(options.bits());
        self.run(envelope, command, coerce::non_empty).await
    }

    pub async fn set_preview_overlay_mode(&self, mode: OverlayMode) -> Envelope {
        let envelope = Envelope::new(format!("SET PREVIEW.OVERLAY {}", mode.code()));
        let command = NativeCommand::new(native::SET_PREVIEW_OVERLAY_MODE).arg(mode.code());
        self.run(envelope, command, coerce::non_empty).await
    }

    pub async fn set_camera_mode(&self, mode: CameraMode) -> Envelope {
        let envelope = Envelope::new(format!("SET CAMERA.MODE {}", mode.code()));
        let command = NativeCommand::new(native::SET_CAMERA_MODE).arg(mode.code());
        self.run(envelope, command, coerce::non_empty).await
    }

    /// Places the preview container; every component is clamped to `0..=100` percent.
    pub async fn set_preview_container_position_and_size(&self, rect: PreviewRect) -> Envelope {
        let PreviewRect { x, y, width, height } = rect.clamped();
        let envelope = Envelope::new(format!("SET PREVIEW.CONTAINER {x} {y} {width} {height}"));
        let command = NativeCommand::new(native::SET_PREVIEW_POSITION_AND_SIZE)
            .arg(x)
            .arg(y)
            .arg(width)
            .arg(height);
        self.run(envelope, command, coerce::non_empty).await
    }

    pub async fn set_preview_container_full_screen(&self) -> Envelope {
        let command = NativeCommand::new(native::SET_PREVIEW_FULL_SCREEN);
        self.run(Envelope::new("SET PREVIEW.CONTAINER FULLSCREEN"), command, coerce::non_empty).await
    }

    pub async fn set_preview_container_below_status_bar(&self, below: bool) -> Envelope {
        let envelope = Envelope::new(format!("SET PREVIEW.BELOW-STATUS-BAR {}", on_off(below)));
        let command = NativeCommand::new(native::SET_PREVIEW_BELOW_STATUS_BAR).arg(below);
        self.run(envelope, command, coerce::non_empty).await
    }

    pub async fn show_toast(&self, message: &str) -> Envelope {
        let command = NativeCommand::new(native::SHOW_TOAST).arg(message);
        self.run(Envelope::new("SHOW TOAST"), command, coerce::non_empty).await
    }

    pub async fn hide_toast(&self) -> Envelope {
        let command = NativeCommand::new(native::HIDE_TOAST);
        self.run(Envelope::new("HIDE TOAST"), command, coerce::non_empty).await
    }

    /// Registers the SDK license key. The key is not echoed into the envelope.
    pub async fn register_sdk(&self, key: &str) -> Envelope {
        let command = NativeCommand::new(native::REGISTER_SDK).arg(key);
        self.run(Envelope::new("REGISTER SDK"), command, coerce::non_empty).await
    }

    pub async fn beep(&self) -> Envelope {
        self.run(Envelope::new("BEEP"), NativeCommand::new(native::BEEP), coerce::non_empty).await
    }

    /// Seconds during which the camera decoder ignores a repeated barcode.
    pub async fn set_camera_duplicates_timeout(&self, seconds: u32) -> Envelope {
        let envelope = Envelope::new(format!("SET CAMERA.DUPLICATES-TIMEOUT {seconds}"));
        let command = NativeCommand::new(native::SET_DUPLICATES_TIMEOUT).arg(seconds);
        self.run(envelope, command, coerce::non_empty).await
    }

    pub async fn set_parser(&self, parser: ResultParser) -> Envelope {
        let envelope = Envelope::new(format!("SET PARSER {}", parser.code()));
        let command = NativeCommand::new(native::SET_PARSER).arg(parser.code());
        self.run(envelope, command, coerce::non_empty).await
    }

    pub async fn set_stop_scanner_on_rotate(&self, enable: bool) -> Envelope {
        let envelope = Envelope::new(format!("SET STOP-ON-ROTATE {}", on_off(enable)));
        let command = NativeCommand::new(native::SET_STOP_SCANNER_ON_ROTATE).arg(enable);
        self.run(envelope, command, coerce::non_empty).await
    }

    // --- Listeners ---

    /// Replaces the scan-result listener.
    pub fn set_result_listener(&self, handler: impl Fn(ScanResult) + Send + Sync + 'static) {
        self.inner.listeners.scan_result.set(handler);
        self.ensure_forwarding(EventChannel::ReadResult);
    }

    pub fn set_availability_listener(&self, handler: impl Fn(Availability) + Send + Sync + 'static) {
        self.inner.listeners.availability.set(handler);
        self.ensure_forwarding(EventChannel::Availability);
    }

    pub fn set_connection_state_listener(
        &self,
        handler: impl Fn(ConnectionState) + Send + Sync + 'static,
    ) {
        self.inner.listeners.connection_state.set(handler);
        self.ensure_forwarding(EventChannel::ConnectionState);
    }

    /// Replaces the scanning-state listener (`true` while the reader is scanning).
    pub fn set_scanning_state_listener(&self, handler: impl Fn(bool) + Send + Sync + 'static) {
        self.inner.listeners.scanning_state.set(handler);
        self.ensure_forwarding(EventChannel::ScanningState);
    }

    /// Registers the native forwarding callbacks for every event class, so handlers placed
    /// directly into a shared [`Listeners`] context receive events.
    pub fn forward_all_events(&self) {
        for channel in EventChannel::ALL {
            self.ensure_forwarding(channel);
        }
    }

    /// Registers the native callback for `channel` once; it reads the slot at event time.
    fn ensure_forwarding(&self, channel: EventChannel) {
        if !self.inner.forwarding.lock().insert(channel.native_name()) {
            return;
        }
        let listeners = Arc::clone(&self.inner.listeners);
        self.inner
            .invoker
            .listen(NativeCommand::new(channel.native_name()), move |reply| {
                events::forward(channel, &listeners, reply);
            });
    }
}

fn loose_flag(payload: Value) -> Value {
    Value::Bool(coerce::loosely_one(&payload))
}

pub(crate) fn settled(envelope: Envelope) -> Envelope {
    debug!(action = %envelope.action, status = envelope.status, err = ?envelope.err, "Command settled");
    envelope
}

/// Settles `envelope` as a local validation failure; no native call is made.
pub(crate) fn rejected(envelope: Envelope, message: impl Into<Cow<'static, str>>) -> Envelope {
    let envelope = envelope.settle(Err(BridgeError::invalid(message)), |payload| payload);
    debug!(action = %envelope.action, err = ?envelope.err, "Command rejected locally");
    envelope
}

pub(crate) fn is_valid_uri(uri: &str) -> bool {
    let uri = uri.trim();
    !(uri.is_empty() || uri == "undefined" || uri == "null")
}

pub(crate) fn is_valid_base64(data: &str) -> bool {
    let body = match data.trim().strip_prefix("data:") {
        Some(rest) => match rest.split_once(";base64,") {
            Some((_, body)) => body,
            None => return false,
        },
        None => data,
    };
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    !compact.is_empty() && LENIENT_BASE64.decode(compact.as_bytes()).is_ok()
}
