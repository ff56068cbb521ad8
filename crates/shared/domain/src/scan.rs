//! Scan results as delivered by the native read-result callback.

use crate::symbology::Symbology;
use serde::{Deserialize, Serialize};

/// Native `symbology` value reported for a failed read.
pub const NO_READ_CODE: i64 = -1;

/// One decode attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadResult {
    pub read_string: String,
    /// Native symbology code, `-1` for "NO READ".
    pub symbology: i64,
    pub symbology_string: Option<String>,
    pub good_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml: Option<String>,
    /// SVG overlay of the decoded region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_graphics: Option<String>,
    /// Base64-encoded PNG of the captured frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_text: Option<String>,
    #[serde(rename = "parsedJSON", skip_serializing_if = "Option::is_none")]
    pub parsed_json: Option<String>,
    #[serde(rename = "isGS1")]
    pub is_gs1: bool,
}

impl ReadResult {
    /// A good read of `text` in `symbology`.
    pub fn good(symbology: Symbology, text: impl Into<String>) -> Self {
        Self {
            read_string: text.into(),
            symbology: symbology.code(),
            symbology_string: Some(symbology.tag().trim_start_matches("SYMBOL.").to_owned()),
            good_read: true,
            ..Self::default()
        }
    }

    /// The "NO READ" placeholder the reader reports when decoding failed.
    #[must_use]
    pub fn no_read() -> Self {
        Self {
            symbology: NO_READ_CODE,
            symbology_string: Some("NO READ".to_owned()),
            ..Self::default()
        }
    }

    /// The decoded symbology, if the code is one of the known 31.
    #[must_use]
    pub fn symbology(&self) -> Option<Symbology> {
        Symbology::try_from(self.symbology).ok()
    }
}

/// Payload of the read-result callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanResult {
    /// Every result, sub-results included.
    pub read_results: Vec<ReadResult>,
    pub sub_read_results: Vec<ReadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml: Option<String>,
}

impl ScanResult {
    pub fn single(result: ReadResult) -> Self {
        Self { read_results: vec![result], ..Self::default() }
    }

    /// The first good read, if any.
    #[must_use]
    pub fn first_good(&self) -> Option<&ReadResult> {
        self.read_results.iter().find(|r| r.good_read)
    }
}
