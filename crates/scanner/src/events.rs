use crate::coerce;
use crate::error::{BridgeError, BridgeErrorExt};
use crate::listeners::Listeners;
use crate::native::NativeReply;
use cmb_domain::{Availability, ConnectionState, ScanResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{trace, warn};

/// Native event streams and their registration actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EventChannel {
    ReadResult,
    Availability,
    ConnectionState,
    ScanningState,
}

impl EventChannel {
    pub(crate) const ALL: [Self; 4] =
        [Self::ReadResult, Self::Availability, Self::ConnectionState, Self::ScanningState];

    pub(crate) const fn native_name(self) -> &'static str {
        match self {
            Self::ReadResult => "didReceiveReadResultFromReaderCallback",
            Self::Availability => "availabilityDidChangeOfReaderCallback",
            Self::ConnectionState => "connectionStateDidChangeOfReaderCallback",
            Self::ScanningState => "setActiveStartScanningCallback",
        }
    }
}

/// Decodes one native event and hands it to the listener currently in the matching slot.
pub(crate) fn forward(channel: EventChannel, listeners: &Listeners, reply: NativeReply) {
    trace!(channel = channel.native_name(), ?reply, "Native event received");

    match channel {
        // Both channels carry the scanning state; an error means "not scanning".
        EventChannel::ScanningState => {
            let scanning = match reply {
                NativeReply::Success(payload) => coerce::truthy(&payload),
                NativeReply::Error(_) => false,
            };
            listeners.scanning_state.emit(scanning);
        },
        EventChannel::ReadResult => {
            if let Some(result) = decode_success::<ScanResult>(channel, reply) {
                listeners.scan_result.emit(result);
            }
        },
        EventChannel::Availability => {
            if let Some(availability) = decode_success::<Availability>(channel, reply) {
                listeners.availability.emit(availability);
            }
        },
        EventChannel::ConnectionState => {
            if let Some(state) = decode_success::<ConnectionState>(channel, reply) {
                listeners.connection_state.emit(state);
            }
        },
    }
}

fn decode_success<T: DeserializeOwned>(channel: EventChannel, reply: NativeReply) -> Option<T> {
    let payload = match reply {
        NativeReply::Success(payload) => payload,
        NativeReply::Error(payload) => {
            warn!(channel = channel.native_name(), %payload, "Native event reported an error; dropped");
            return None;
        },
    };

    decode(payload)
        .context(channel.native_name())
        .inspect_err(|err| warn!(error = %err, "Undecodable native event dropped"))
        .ok()
}

/// Decodes a payload; JSON-encoded strings are unwrapped first.
pub(crate) fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, BridgeError> {
    match payload {
        Value::String(text) if text.trim_start().starts_with(['{', '[']) => {
            Ok(serde_json::from_str(&text)?)
        },
        other => Ok(serde_json::from_value(other)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn connection_state_codes_are_decoded() {
        let listeners = Listeners::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        listeners.connection_state.set(move |state| sink.lock().push(state));

        forward(EventChannel::ConnectionState, &listeners, NativeReply::Success(json!(2)));
        forward(EventChannel::ConnectionState, &listeners, NativeReply::Success(json!(9)));
        forward(EventChannel::ConnectionState, &listeners, NativeReply::Error(json!("boom")));

        assert_eq!(*seen.lock(), [ConnectionState::Connected]);
    }

    #[test]
    fn scanning_state_error_means_not_scanning() {
        let listeners = Listeners::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        listeners.scanning_state.set(move |on| sink.lock().push(on));

        forward(EventChannel::ScanningState, &listeners, NativeReply::Success(json!(true)));
        forward(EventChannel::ScanningState, &listeners, NativeReply::Error(json!("stopped")));

        assert_eq!(*seen.lock(), [true, false]);
    }

    #[test]
    fn json_text_payloads_are_unwrapped() {
        let result: ScanResult =
            decode(json!(r#"{"readResults":[{"readString":"A1","symbology":2,"goodRead":true}]}"#))
                .expect("decode");
        assert_eq!(result.read_results[0].read_string, "A1");
    }
}
