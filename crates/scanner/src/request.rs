//! Loosely typed entry point for application shells.
//!
//! A [`Request`] names a plugin action and carries raw JSON arguments. [`Scanner::dispatch`]
//! performs the checks the typed API makes unnecessary, then routes to the typed operation.

use crate::coerce;
use crate::envelope::Envelope;
use crate::scanner::{self, Scanner, native};
use cmb_domain::config::PreviewRect;
use cmb_domain::{
    CameraMode, CodeMask, DeviceType, OverlayMode, PreviewOptions, ResultParser, Symbology,
    TriggerType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const INVALID_SYMBOL: &str = "Invalid Symbol";
pub const INVALID_DEVICE: &str = "Invalid Device, should be either 0 or 1";
pub const INVALID_COMMAND: &str = "commandString is not a String";
pub const UNSUPPORTED_TRIGGER: &str = "Unsupported Trigger Type";
pub const INVALID_CAMERA_MODE: &str = "Invalid Camera Mode [0,1,2,3]";
pub const INVALID_OVERLAY_MODE: &str = "Invalid Overlay Mode [0,1]";
pub const INVALID_PARSER: &str = "Invalid Parser [0-7]";

/// Action names that are not native commands but are accepted by [`Scanner::dispatch`].
const SET_TRIGGER_TYPE: &str = "setTriggerType";

/// One loosely typed call, e.g. `{"action": "setSymbologyEnabled", "args": ["SYMBOL.QR", true]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub action: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Request {
    pub fn new(action: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Self { action: action.into(), args: args.into_iter().collect() }
    }

    fn arg(&self, index: usize) -> &Value {
        self.args.get(index).unwrap_or(&Value::Null)
    }

    fn flag(&self, index: usize) -> bool {
        coerce::truthy(self.arg(index))
    }

    fn integer(&self, index: usize) -> Option<i64> {
        coerce::integer(self.arg(index))
    }

    fn text(&self, index: usize) -> Option<&str> {
        self.arg(index).as_str()
    }

    /// Text form of an argument inside an action string; a missing one reads `undefined`.
    fn shown(&self, index: usize) -> String {
        self.args.get(index).map_or_else(|| "undefined".to_owned(), coerce::display)
    }
}

impl Scanner {
    /// Routes a loosely typed request to the matching operation.
    ///
    /// Invalid arguments settle locally with the same messages the plugin API reports and
    /// issue no native call. Unknown actions settle with `Unknown action: <name>`.
    pub async fn dispatch(&self, request: Request) -> Envelope {
        debug!(action = %request.action, args = request.args.len(), "Dispatching request");

        match request.action.as_str() {
            native::LOAD_SCANNER => {
                let device = match request.args.first() {
                    None => Some(DeviceType::default()),
                    Some(Value::String(name)) => DeviceType::from_name(name),
                    Some(other) => coerce::integer(other).and_then(|c| DeviceType::try_from(c).ok()),
                };
                match device {
                    Some(device) => self.load_scanner(device).await,
                    None => scanner::rejected(Envelope::new("LOAD READER"), INVALID_DEVICE),
                }
            },
            native::CONNECT => self.connect().await,
            native::DISCONNECT => self.disconnect().await,
            native::GET_CONNECTION_STATE => self.get_connection_state().await,
            native::GET_AVAILABILITY => self.get_availability().await,
            native::GET_SDK_VERSION => self.get_sdk_version().await,
            native::GET_BATTERY_LEVEL => self.get_device_battery_level().await,

            native::SET_SYMBOLOGY_ENABLED => {
                let on = request.flag(1);
                match symbology(&request, 0) {
                    Ok(symbology) => self.set_symbology_enabled(symbology, on).await,
                    Err(tag) => {
                        let on_off = if on { "ON" } else { "OFF" };
                        scanner::rejected(Envelope::new(format!("SET {tag} {on_off}")), INVALID_SYMBOL)
                    },
                }
            },
            native::IS_SYMBOLOGY_ENABLED => match symbology(&request, 0) {
                Ok(symbology) => self.is_symbology_enabled(symbology).await,
                Err(tag) => scanner::rejected(Envelope::new(format!("GET {tag}")), INVALID_SYMBOL),
            },
            native::SET_LIGHTS_ON => self.set_lights_on(request.flag(0)).await,
            native::IS_LIGHTS_ON => self.is_lights_on().await,
            native::RESET_CONFIG => self.reset_config().await,

            native::SEND_COMMAND => match request.text(0) {
                Some(text) => self.send_command(text).await,
                None => scanner::rejected(Envelope::new(request.arg(0).clone()), INVALID_COMMAND),
            },
            SET_TRIGGER_TYPE => {
                match request.integer(0).and_then(|c| TriggerType::try_from(c).ok()) {
                    Some(trigger) => self.set_trigger_type(trigger).await,
                    None => scanner::rejected(
                        Envelope::new(format!("SET TRIGGER.TYPE {}", request.shown(0)))
                            .with("trigger", request.arg(0).clone()),
                        UNSUPPORTED_TRIGGER,
                    ),
                }
            },

            native::START_SCANNING => self.start_scanning().await,
            native::STOP_SCANNING => self.stop_scanning().await,
            native::SCAN_IMAGE_FROM_URI => match request.text(0) {
                Some(uri) => self.scan_image_from_uri(uri).await,
                None => scanner::rejected(
                    Envelope::new("SCAN IMAGE URI").with("uri", request.arg(0).clone()),
                    scanner::INVALID_URI,
                ),
            },
            native::SCAN_IMAGE_FROM_BASE64 => match request.text(0) {
                Some(data) => self.scan_image_from_base64(data).await,
                None => scanner::rejected(Envelope::new("SCAN IMAGE BASE64"), scanner::INVALID_BASE64),
            },

            name @ (native::ENABLE_CAMERA_FLAG | native::DISABLE_CAMERA_FLAG) => {
                let enable = name == native::ENABLE_CAMERA_FLAG;
                let verb = if enable { "ENABLE" } else { "DISABLE" };
                let mask = request.integer(0).and_then(|m| u32::try_from(m).ok());
                let flag = request.integer(1).and_then(|f| u32::try_from(f).ok());
                match (mask, flag) {
                    (Some(mask), Some(flag)) if enable => {
                        self.enable_camera_flag(CodeMask::from(mask), flag).await
                    },
                    (Some(mask), Some(flag)) => {
                        self.disable_camera_flag(CodeMask::from(mask), flag).await
                    },
                    _ => scanner::rejected(
                        Envelope::new(format!(
                            "{verb} CAMERA.FLAG {} {}",
                            request.shown(0),
                            request.shown(1)
                        )),
                        "Invalid code mask or flag, expected unsigned integers",
                    ),
                }
            },

            native::CHECK_CAMERA_PERMISSION => self.check_camera_permission().await,
            native::REQUEST_CAMERA_PERMISSION => self.request_camera_permission().await,

            native::ENABLE_IMAGE => self.enable_image(request.flag(0)).await,
            native::ENABLE_IMAGE_GRAPHICS => self.enable_image_graphics(request.flag(0)).await,
            native::SET_PREVIEW_OPTIONS => {
                match request.integer(0).and_then(|bits| u32::try_from(bits).ok()) {
                    Some(bits) => self.set_preview_options(PreviewOptions::from(bits)).await,
                    None => scanner::rejected(
                        Envelope::new(format!("SET PREVIEW.OPTIONS {}", request.shown(0))),
                        "Invalid preview options, expected an unsigned integer",
                    ),
                }
            },
            native::SET_PREVIEW_OVERLAY_MODE => {
                match request.integer(0).and_then(|c| OverlayMode::try_from(c).ok()) {
                    Some(mode) => self.set_preview_overlay_mode(mode).await,
                    None => scanner::rejected(
                        Envelope::new(format!("SET PREVIEW.OVERLAY {}", request.shown(0))),
                        INVALID_OVERLAY_MODE,
                    ),
                }
            },
            native::SET_CAMERA_MODE => {
                match request.integer(0).and_then(|c| CameraMode::try_from(c).ok()) {
                    Some(mode) => self.set_camera_mode(mode).await,
                    None => scanner::rejected(
                        Envelope::new(format!("SET CAMERA.MODE {}", request.shown(0))),
                        INVALID_CAMERA_MODE,
                    ),
                }
            },
            native::SET_PREVIEW_POSITION_AND_SIZE => {
                let rect = PreviewRect::new(
                    percent(request.arg(0), 0.0),
                    percent(request.arg(1), 0.0),
                    percent(request.arg(2), 100.0),
                    percent(request.arg(3), 35.0),
                );
                self.set_preview_container_position_and_size(rect).await
            },
            native::SET_PREVIEW_FULL_SCREEN => self.set_preview_container_full_screen().await,
            native::SET_PREVIEW_BELOW_STATUS_BAR => {
                self.set_preview_container_below_status_bar(request.flag(0)).await
            },
            native::SHOW_TOAST => self.show_toast(&coerce::display(request.arg(0))).await,
            native::HIDE_TOAST => self.hide_toast().await,
            native::REGISTER_SDK => self.register_sdk(&coerce::display(request.arg(0))).await,
            native::BEEP => self.beep().await,
            native::SET_DUPLICATES_TIMEOUT => {
                let seconds = request.integer(0).map_or(0, |s| u32::try_from(s.max(0)).unwrap_or(u32::MAX));
                self.set_camera_duplicates_timeout(seconds).await
            },
            native::SET_PARSER => match request.integer(0).and_then(|c| ResultParser::try_from(c).ok()) {
                Some(parser) => self.set_parser(parser).await,
                None => scanner::rejected(
                    Envelope::new(format!("SET PARSER {}", request.shown(0))),
                    INVALID_PARSER,
                ),
            },
            native::SET_STOP_SCANNER_ON_ROTATE => {
                self.set_stop_scanner_on_rotate(request.flag(0)).await
            },

            unknown => scanner::rejected(
                Envelope::new(unknown.to_owned()),
                format!("Unknown action: {unknown}"),
            ),
        }
    }
}

/// Resolves a symbology argument, returning its text form when it is not a known tag.
fn symbology(request: &Request, index: usize) -> Result<Symbology, String> {
    request.text(index).and_then(Symbology::from_tag).ok_or_else(|| request.shown(index))
}

/// Reads a percentage the way `parseFloat` does, falling back to `default` when nothing parses.
///
/// Clamping to `0..=100` happens in [`PreviewRect::new`].
#[allow(clippy::cast_possible_truncation)]
fn percent(value: &Value, default: f32) -> f32 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => leading_float(text),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).map_or(default, |f| f as f32)
}

/// The longest decimal literal at the start of `text`: `"12abc"` reads `12`, `"abc"` nothing.
fn leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits = |from: usize| {
        bytes.get(from..).map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits(end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(end + 1);
        if whole + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole + fraction == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let count = digits(exponent);
        if count > 0 {
            end = exponent + count;
        }
    }
    text[..end].parse().ok()
}
