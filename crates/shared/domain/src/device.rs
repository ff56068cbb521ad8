//! Coded enums for reader selection, camera behaviour and reader state.

use crate::code::native_code;

native_code! {
    /// Which reader `loadScanner` should prepare.
    pub enum DeviceType as "device type" {
        #[strum(to_string = "DEVICE_TYPE_MX_1000", serialize = "mx", serialize = "mx1000")]
        Mx1000 = 0,
        #[strum(to_string = "DEVICE_TYPE_MOBILE_DEVICE", serialize = "camera", serialize = "mobile")]
        MobileDevice = 1,
    }
}

impl DeviceType {
    /// Label shown to users ("MX Device" / "Camera").
    #[must_use]
    pub const fn friendly_name(self) -> &'static str {
        match self {
            Self::Mx1000 => "MX Device",
            Self::MobileDevice => "Camera",
        }
    }

    /// Whether the reader is the phone's own camera rather than an attached MX sled.
    #[must_use]
    pub const fn is_camera(self) -> bool {
        matches!(self, Self::MobileDevice)
    }
}

native_code! {
    /// Trigger behaviour, applied through the `SET TRIGGER.TYPE` DMCC command.
    pub enum TriggerType as "trigger type" {
        #[strum(to_string = "MANUAL_TRIGGER", serialize = "manual")]
        Manual = 2,
        #[strum(to_string = "CONTINUOUS_TRIGGER", serialize = "continuous")]
        Continuous = 5,
    }
}

native_code! {
    pub enum CameraMode as "camera mode" {
        /// Preview on, illumination available.
        #[strum(to_string = "NO_AIMER")]
        NoAimer = 0,
        /// Basic aimer; preview off, no illumination.
        #[strum(to_string = "PASSIVE_AIMER")]
        PassiveAimer = 1,
        /// Active aimer (MX-100); preview off, illumination available.
        #[strum(to_string = "ACTIVE_AIMER")]
        ActiveAimer = 2,
        #[strum(to_string = "FRONT_CAMERA")]
        FrontCamera = 3,
    }
}

native_code! {
    /// Preview overlay style.
    pub enum OverlayMode as "overlay mode" {
        #[strum(to_string = "OM_CMB", serialize = "cmb")]
        Cmb = 0,
        #[strum(to_string = "OM_LEGACY", serialize = "legacy")]
        Legacy = 1,
    }
}

native_code! {
    /// Post-decode data parser.
    pub enum ResultParser as "parser" {
        #[strum(to_string = "NONE")]
        None = 0,
        #[strum(to_string = "AUTO")]
        Auto = 1,
        #[strum(to_string = "AAMVA")]
        Aamva = 2,
        #[strum(to_string = "GS1")]
        Gs1 = 3,
        #[strum(to_string = "HIBC")]
        Hibc = 4,
        #[strum(to_string = "ISBT128")]
        Isbt128 = 5,
        #[strum(to_string = "IUID")]
        Iuid = 6,
        #[strum(to_string = "SCM")]
        Scm = 7,
    }
}

native_code! {
    /// Connection state of the reader, owned by the native side.
    pub enum ConnectionState as "connection state" {
        #[strum(to_string = "DISCONNECTED")]
        Disconnected = 0,
        #[strum(to_string = "CONNECTING")]
        Connecting = 1,
        #[strum(to_string = "CONNECTED")]
        Connected = 2,
        #[strum(to_string = "DISCONNECTING")]
        Disconnecting = 3,
    }
}

native_code! {
    pub enum Availability as "availability" {
        #[strum(to_string = "UNKNOWN")]
        Unknown = 0,
        #[strum(to_string = "AVAILABLE")]
        Available = 1,
        #[strum(to_string = "UNAVAILABLE")]
        Unavailable = 2,
    }
}

impl Default for DeviceType {
    fn default() -> Self {
        Self::Mx1000
    }
}

impl Default for CameraMode {
    fn default() -> Self {
        Self::NoAimer
    }
}

impl Default for OverlayMode {
    fn default() -> Self {
        Self::Cmb
    }
}

impl Default for ResultParser {
    fn default() -> Self {
        Self::None
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn codes_round_trip_through_try_from() {
        for state in ConnectionState::iter() {
            assert_eq!(ConnectionState::try_from(state.code()), Ok(state));
        }
        for parser in ResultParser::iter() {
            assert_eq!(ResultParser::try_from(parser.code()), Ok(parser));
        }
    }

    #[test]
    fn device_type_rejects_out_of_range_codes() {
        let err = DeviceType::try_from(2).unwrap_err();
        assert_eq!(err.kind, "device type");
        assert!(DeviceType::try_from(-1).is_err());
    }

    #[test]
    fn trigger_type_only_accepts_manual_and_continuous() {
        assert_eq!(TriggerType::try_from(2), Ok(TriggerType::Manual));
        assert_eq!(TriggerType::try_from(5), Ok(TriggerType::Continuous));
        assert!((0..10).filter(|c| TriggerType::try_from(*c).is_ok()).eq([2, 5]));
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("camera".parse::<DeviceType>(), Ok(DeviceType::MobileDevice));
        assert_eq!("DEVICE_TYPE_MX_1000".parse::<DeviceType>(), Ok(DeviceType::Mx1000));
        assert_eq!("Continuous".parse::<TriggerType>(), Ok(TriggerType::Continuous));
        assert_eq!(DeviceType::MobileDevice.name(), "DEVICE_TYPE_MOBILE_DEVICE");
        assert_eq!(DeviceType::Mx1000.friendly_name(), "MX Device");
    }

    #[test]
    fn from_name_matches_canonical_names_exactly() {
        assert_eq!(DeviceType::from_name("DEVICE_TYPE_MX_1000"), Some(DeviceType::Mx1000));
        assert_eq!(DeviceType::from_name("DEVICE_TYPE_MOBILE_DEVICE"), Some(DeviceType::MobileDevice));
        for alias in ["camera", "mx", "mobile", "device_type_mx_1000"] {
            assert_eq!(DeviceType::from_name(alias), None, "{alias}");
        }
    }
}
