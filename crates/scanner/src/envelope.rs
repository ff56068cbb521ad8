use crate::coerce;
use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;

/// Uniform outcome of every command-style operation.
///
/// On success `status` is `true` and `result` is present; on failure `status` is `false`
/// and `err` carries the reason. Command-specific extras (`type`, `name`, `trigger`, `uri`, ...)
/// are flattened next to the core fields when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub action: Value,
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default)]
    pub err: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Skeleton with `action` filled in, not yet settled.
    pub fn new(action: impl Into<Value>) -> Self {
        Self { action: action.into(), status: false, result: None, err: None, extra: Map::new() }
    }

    #[must_use]
    pub fn succeeded(mut self, result: Value) -> Self {
        self.status = true;
        self.result = Some(result);
        self.err = None;
        self
    }

    #[must_use]
    pub fn failed(mut self, err: impl Into<String>) -> Self {
        self.status = false;
        self.result = None;
        self.err = Some(err.into());
        self
    }

    /// Adds a command-specific field next to the core ones.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_owned(), value.into());
        self
    }

    /// Settles with the outcome of a native call, shaping a success payload with `shape`.
    #[must_use]
    pub fn settle(self, outcome: Result<Value, BridgeError>, shape: impl FnOnce(Value) -> Value) -> Self {
        match outcome {
            Ok(payload) => self.succeeded(shape(payload)),
            Err(err) => self.failed(err.to_string()),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status
    }

    /// `result` read with loose `== 1` semantics; `false` when absent.
    #[must_use]
    pub fn result_flag(&self) -> bool {
        self.result.as_ref().is_some_and(coerce::loosely_one)
    }

    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Optional completion handler for envelope futures.
///
/// Without it an operation resolves to the envelope itself; with it the handler sees the
/// settled envelope exactly once and its return value becomes the output.
pub trait EnvelopeFutureExt: Future<Output = Envelope> + Sized {
    fn complete_with<T, H>(self, handler: H) -> impl Future<Output = T> + Send
    where
        Self: Send,
        H: FnOnce(Envelope) -> T + Send,
    {
        async move { handler(self.await) }
    }
}

impl<F: Future<Output = Envelope>> EnvelopeFutureExt for F {}
