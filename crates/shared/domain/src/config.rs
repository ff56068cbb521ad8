use crate::device::{CameraMode, DeviceType, OverlayMode, ResultParser, TriggerType};
use crate::flags::PreviewOptions;
use crate::symbology::Symbology;
use serde::{Deserialize, Serialize};

/// Reader profile applied by an application after the reader reports `Connected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub device: DeviceType,
    /// SDK license key, sent with `registerSDK` before loading a camera reader.
    pub registration_key: Option<String>,
    /// Upper bound for a single native call. `None` waits for the native reply indefinitely.
    pub call_timeout_ms: Option<u64>,
    pub camera_mode: CameraMode,
    pub preview: PreviewConfig,
    pub trigger: Option<TriggerType>,
    pub parser: ResultParser,
    pub symbologies: SymbologyProfile,
    pub results: ResultConfig,
}

/// Camera preview container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub options: PreviewOptions,
    pub overlay: OverlayMode,
    /// Position and size in percent of the screen.
    pub rect: Option<PreviewRect>,
    pub full_screen: bool,
    pub below_status_bar: bool,
}

/// Preview placement in percent, each component within `0..=100`.
///
/// Components are fractional; the native side reads them as floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PreviewRect {
    const MAX: f32 = 100.0;

    /// Builds a rect, clamping each component to `0..=100`.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }.clamped()
    }

    /// `NaN` components collapse to `0`.
    #[must_use]
    pub fn clamped(self) -> Self {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, Self::MAX) };
        Self {
            x: clamp(self.x),
            y: clamp(self.y),
            width: clamp(self.width),
            height: clamp(self.height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbologyProfile {
    pub enable: Vec<Symbology>,
    pub disable: Vec<Symbology>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResultConfig {
    pub image: bool,
    pub image_graphics: bool,
    /// Seconds during which the camera decoder ignores a repeated barcode.
    pub duplicates_timeout_secs: Option<u32>,
    pub stop_on_rotate: bool,
}

// --- Default ---

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            device: DeviceType::default(),
            registration_key: None,
            call_timeout_ms: None,
            camera_mode: CameraMode::default(),
            preview: PreviewConfig::default(),
            trigger: None,
            parser: ResultParser::default(),
            symbologies: SymbologyProfile::default(),
            results: ResultConfig::default(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            options: PreviewOptions::default(),
            overlay: OverlayMode::default(),
            rect: None,
            full_screen: false,
            below_status_bar: false,
        }
    }
}

impl Default for SymbologyProfile {
    fn default() -> Self {
        Self {
            enable: vec![
                Symbology::DataMatrix,
                Symbology::Code128,
                Symbology::UpcEan,
                Symbology::Codabar,
                Symbology::Code93,
            ],
            disable: Vec::new(),
        }
    }
}

impl Default for ResultConfig {
    fn default() -> Self {
        Self {
            image: false,
            image_graphics: false,
            duplicates_timeout_secs: None,
            stop_on_rotate: false,
        }
    }
}
