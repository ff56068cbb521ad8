use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;

/// Why a native call produced no success payload.
///
/// The normalizer never returns this to callers; it renders it into the envelope's `err`.
#[cmb_derive::cmb_error]
pub enum BridgeError {
    /// The native side answered on its error channel. Displays the payload verbatim.
    #[error("{message}")]
    Native { message: Cow<'static, str>, payload: Value },

    #[error("Native bridge dropped the callback without replying")]
    CallbackDropped { command: &'static str },

    #[error("Native call '{command}' timed out after {}ms", .after.as_millis())]
    TimedOut { command: &'static str, after: Duration },

    /// Rejected locally before reaching the native side.
    #[error("{message}")]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Payload decode failure{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

impl BridgeError {
    /// Wraps a native error payload. Strings are kept as-is, other JSON values use their JSON text.
    #[must_use]
    pub fn native(payload: Value) -> Self {
        let message = match &payload {
            Value::String(text) => Cow::Owned(text.clone()),
            other => Cow::Owned(other.to_string()),
        };
        Self::Native { message, payload }
    }

    /// A local validation failure; displays `message` verbatim.
    pub fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument { message: message.into(), context: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn native_errors_render_verbatim() {
        assert_eq!(BridgeError::native(json!("Reader device not connected")).to_string(), "Reader device not connected");
        assert_eq!(BridgeError::native(json!(1)).to_string(), "1");
        assert_eq!(BridgeError::native(json!({"code": 4})).to_string(), r#"{"code":4}"#);
    }

    #[test]
    fn invalid_arguments_render_verbatim() {
        assert_eq!(BridgeError::invalid("Invalid Symbol").to_string(), "Invalid Symbol");
        let err = BridgeError::invalid(format!("Unknown action: {}", "selfDestruct"));
        assert!(matches!(&err, BridgeError::InvalidArgument { context: None, .. }));
        assert_eq!(err.to_string(), "Unknown action: selfDestruct");
    }

    #[test]
    fn context_is_attached_to_decode_errors() {
        let err = serde_json::from_str::<u8>("x").context("Decoding battery level").unwrap_err();
        assert!(err.to_string().starts_with("Payload decode failure (Decoding battery level)"));
    }
}
