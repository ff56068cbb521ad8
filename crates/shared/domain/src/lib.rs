//! # Domain Models
//!
//! The vocabulary shared between the bridge and its callers, expressed in the native encoding
//! the reader SDK expects (integer codes, `SYMBOL.*` tags, bit masks).
//! Keep it lean: no I/O, no async, no logging. Just data and conversions.

pub mod config;
pub mod device;
pub mod flags;
pub mod scan;
pub mod symbology;

mod code;

pub use crate::code::UnknownCode;
pub use crate::device::{
    Availability, CameraMode, ConnectionState, DeviceType, OverlayMode, ResultParser, TriggerType,
};
pub use crate::flags::{CodeMask, PreviewOptions, ResultTypes};
pub use crate::scan::{ReadResult, ScanResult};
pub use crate::symbology::Symbology;
