//! The 31 barcode symbologies the reader can be configured for.
//!
//! Every symbology has a `SYMBOL.*` tag (used in action strings and by application shells)
//! and a native integer code in `1..=31`. Code `0` (`SYMBOL.UNKNOWN`) is not a valid input.

use crate::code::{CodeOrName, UnknownCode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumCount, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, IntoStaticStr,
    EnumCount,
)]
pub enum Symbology {
    #[strum(serialize = "SYMBOL.DATAMATRIX")]
    DataMatrix = 1,
    #[strum(serialize = "SYMBOL.QR")]
    Qr = 2,
    #[strum(serialize = "SYMBOL.C128")]
    Code128 = 3,
    #[strum(serialize = "SYMBOL.UPC-EAN")]
    UpcEan = 4,
    #[strum(serialize = "SYMBOL.C11")]
    Code11 = 5,
    #[strum(serialize = "SYMBOL.C39")]
    Code39 = 6,
    #[strum(serialize = "SYMBOL.C93")]
    Code93 = 7,
    #[strum(serialize = "SYMBOL.I2O5")]
    Interleaved2of5 = 8,
    #[strum(serialize = "SYMBOL.CODABAR")]
    Codabar = 9,
    #[strum(serialize = "SYMBOL.EAN-UCC")]
    EanUcc = 10,
    #[strum(serialize = "SYMBOL.PHARMACODE")]
    Pharmacode = 11,
    #[strum(serialize = "SYMBOL.MAXICODE")]
    MaxiCode = 12,
    #[strum(serialize = "SYMBOL.PDF417")]
    Pdf417 = 13,
    #[strum(serialize = "SYMBOL.MICROPDF417")]
    MicroPdf417 = 14,
    #[strum(serialize = "SYMBOL.DATABAR")]
    DataBar = 15,
    #[strum(serialize = "SYMBOL.POSTNET")]
    Postnet = 16,
    #[strum(serialize = "SYMBOL.PLANET")]
    Planet = 17,
    #[strum(serialize = "SYMBOL.4STATE-JAP")]
    FourStateJap = 18,
    #[strum(serialize = "SYMBOL.4STATE-AUS")]
    FourStateAus = 19,
    #[strum(serialize = "SYMBOL.4STATE-UPU")]
    FourStateUpu = 20,
    #[strum(serialize = "SYMBOL.4STATE-IMB")]
    FourStateImb = 21,
    #[strum(serialize = "SYMBOL.VERICODE")]
    VeriCode = 22,
    #[strum(serialize = "SYMBOL.RPC")]
    Rpc = 23,
    #[strum(serialize = "SYMBOL.MSI")]
    Msi = 24,
    #[strum(serialize = "SYMBOL.AZTECCODE")]
    AztecCode = 25,
    #[strum(serialize = "SYMBOL.DOTCODE")]
    DotCode = 26,
    #[strum(serialize = "SYMBOL.C25")]
    Code25 = 27,
    #[strum(serialize = "SYMBOL.C39-CONVERT-TO-C32")]
    Code39ConvertToCode32 = 28,
    #[strum(serialize = "SYMBOL.OCR")]
    Ocr = 29,
    #[strum(serialize = "SYMBOL.4STATE-RMC")]
    FourStateRmc = 30,
    #[strum(serialize = "SYMBOL.TELEPEN")]
    Telepen = 31,
}

impl Symbology {
    /// Native integer code sent to `setSymbologyEnabled` / `isSymbologyEnabled`.
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// The `SYMBOL.*` tag, e.g. `SYMBOL.DATAMATRIX`.
    #[must_use]
    pub fn tag(self) -> &'static str {
        self.into()
    }

    /// Looks a tag up exactly as written. Tags are case-sensitive.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.parse().ok()
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl TryFrom<i64> for Symbology {
    type Error = UnknownCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        use strum::IntoEnumIterator;

        Self::iter().find(|s| s.code() == code).ok_or_else(|| UnknownCode::new("symbology", code))
    }
}

impl Serialize for Symbology {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for Symbology {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match CodeOrName::deserialize(deserializer)? {
            CodeOrName::Code(code) => Self::try_from(code).map_err(serde::de::Error::custom),
            CodeOrName::Name(tag) => Self::from_tag(&tag)
                .ok_or_else(|| serde::de::Error::custom(UnknownCode::new("symbology", tag))),
        }
    }
}
