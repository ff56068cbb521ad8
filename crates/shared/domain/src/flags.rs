use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Camera preview overrides passed to `setPreviewOptions`. Empty means SDK defaults.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct PreviewOptions: u32 {
        const NO_ZOOM_BTN = 1;
        const NO_ILLUM_BTN = 1 << 1;
        /// Volume-down acts as a hardware trigger.
        const HARDWARE_TRIGGER = 1 << 2;
        /// Preview is shown but decoding waits for a trigger press.
        const PREVIEW_PAUSED = 1 << 3;
        const PREVIEW_ALWAYS_SHOW = 1 << 4;
        /// 1920x1080 instead of 1280x720.
        const HIGH_RESOLUTION = 1 << 6;
        /// 60 FPS instead of 30.
        const HIGH_FRAME_RATE = 1 << 7;
        const SHOW_CLOSE_BUTTON = 1 << 8;
    }
}

bitflags! {
    /// Parts of a read result the native side should include.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ResultTypes: u32 {
        const READ_STRING = 1;
        const READ_XML = 1 << 1;
        const XML_STATISTICS = 1 << 2;
        const IMAGE = 1 << 3;
        const IMAGE_GRAPHICS = 1 << 4;
        const TRAINING_RESULTS = 1 << 5;
        const CODE_QUALITY_DATA = 1 << 6;
    }
}

bitflags! {
    /// Decoder families addressed by `enableCameraFlag` / `disableCameraFlag`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CodeMask: u32 {
        const QR = 0x0000_0001;
        const DM = 0x0000_0002;
        const RSS = 0x0000_0004;
        const CODE_39 = 0x0000_0008;
        const EANUPC = 0x0000_0010;
        const CODE_128 = 0x0000_0020;
        const PDF = 0x0000_0040;
        const AZTEC = 0x0000_0080;
        const CODE_25 = 0x0000_0100;
        const CODE_93 = 0x0000_0200;
        const CODABAR = 0x0000_0400;
        const DOTCODE = 0x0000_0800;
        const CODE_11 = 0x0000_1000;
        const MSI = 0x0000_2000;
        const MAXICODE = 0x0000_4000;
        const POSTAL = 0x0000_8000;

        const ALL = u32::MAX;
    }
}

/// Per-decoder configuration flags. Values overlap between decoders, so they are
/// only meaningful together with the [`CodeMask`] they are sent with.
pub mod decoder {
    pub const CODE39_REQUIRE_CHECKSUM: u32 = 0x2;
    pub const CODE39_DONT_REQUIRE_STOP: u32 = 0x4;
    pub const CODE39_EXTENDED_MODE: u32 = 0x8;
    pub const CODE39_CODE32_ENABLED: u32 = 0x10;
    pub const CODE39_CODE32_PREFIX: u32 = 0x20;
    pub const CODE93_EXTENDED_MODE: u32 = 0x8;
    pub const EANUPC_DISABLE_ADDON: u32 = 0x1;
    pub const EANUPC_DONT_EXPAND_UPCE: u32 = 0x2;
    pub const CODE25_REQ_CHKSUM: u32 = 0x1;
    pub const CODE11_REQ_SINGLE_CHKSUM: u32 = 0x1;
    pub const CODE11_REQ_DOUBLE_CHKSUM: u32 = 0x2;
    pub const MSI_REQ_10_CHKSUM: u32 = 0x01;
    pub const MSI_REQ_1010_CHKSUM: u32 = 0x02;
    pub const MSI_REQ_11_IBM_CHKSUM: u32 = 0x04;
    pub const MSI_REQ_11_NCR_CHKSUM: u32 = 0x08;
    pub const MSI_REQ_1110_IBM_CHKSUM: u32 = 0x10;
    pub const MSI_REQ_1110_NCR_CHKSUM: u32 = 0x20;
    pub const CODABAR_INCLUDE_STARTSTOP: u32 = 0x1;
    pub const GLOBAL_HORIZONTAL_SHARPENING: u32 = 0x01;
    pub const GLOBAL_VERTICAL_SHARPENING: u32 = 0x02;
    pub const GLOBAL_SHARPENING: u32 = 0x03;
    pub const GLOBAL_ROTATE90: u32 = 0x04;
    pub const GLOBAL_ROTATE180: u32 = 0x08;
    pub const GLOBAL_CALCULATE_1D_LOCATION: u32 = 0x10;
    pub const GLOBAL_VERIFY_1D_LOCATION: u32 = 0x20;
    pub const GLOBAL_USE_CENTRIC_SCANNING: u32 = 0x40;
    pub const GLOBAL_DISABLE_PREPROCESSING: u32 = 0x80;
}

// Flag sets travel as plain integers, both to the native side and in config files.
macro_rules! bits_serde {
    ($($ty:ty),+) => {$(
        impl From<u32> for $ty {
            fn from(bits: u32) -> Self {
                Self::from_bits_retain(bits)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u32(self.bits())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                u32::deserialize(deserializer).map(Self::from_bits_retain)
            }
        }
    )+};
}

bits_serde!(PreviewOptions, ResultTypes, CodeMask);

impl Default for PreviewOptions {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for ResultTypes {
    fn default() -> Self {
        Self::READ_STRING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_option_bits_match_native_values() {
        let bits: Vec<u32> = PreviewOptions::all().iter().map(|f| f.bits()).collect();
        assert_eq!(bits, [1, 2, 4, 8, 16, 64, 128, 256]);
    }

    #[test]
    fn code_mask_all_covers_every_decoder() {
        assert!(CodeMask::ALL.contains(CodeMask::POSTAL | CodeMask::QR));
        assert_eq!(CodeMask::ALL.bits(), 0xffff_ffff);
    }
}
