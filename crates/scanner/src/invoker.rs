use crate::error::BridgeError;
use crate::native::{NativeBridge, NativeCallback, NativeCommand, NativeReply};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, instrument, trace, warn};

/// Forwards commands to the native bridge and turns its two callback channels into a future.
///
/// No validation, no retries. Cheap to clone.
#[derive(Clone)]
pub struct Invoker {
    bridge: Arc<dyn NativeBridge>,
    timeout: Option<Duration>,
}

impl Invoker {
    pub fn new(bridge: Arc<dyn NativeBridge>) -> Self {
        Self { bridge, timeout: None }
    }

    /// Bounds every [`Invoker::call`]. `None` waits for the native reply indefinitely.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Issues one native call and waits for its first reply.
    ///
    /// Later replies on the same callback are ignored.
    ///
    /// # Errors
    /// * [`BridgeError::Native`] when the native side answers on its error channel.
    /// * [`BridgeError::CallbackDropped`] when every clone of the callback is dropped unanswered.
    /// * [`BridgeError::TimedOut`] when a timeout is configured and elapses first.
    #[instrument(level = "debug", name = "native_call", skip_all, fields(command = command.name))]
    pub async fn call(&self, command: NativeCommand) -> Result<Value, BridgeError> {
        let name = command.name;
        let (tx, rx) = oneshot::channel();
        let pending = Mutex::new(Some(tx));

        let callback = NativeCallback::new(move |reply: NativeReply| {
            let Some(tx) = pending.lock().take() else {
                warn!(command = name, success = reply.is_success(), "Ignoring duplicate native reply");
                return;
            };
            if tx.send(reply).is_err() {
                debug!(command = name, "Caller stopped waiting before the native reply arrived");
            }
        });

        debug!(args = ?command.args, "Issuing native call");
        self.bridge.exec(command, callback);

        let reply = match self.timeout {
            Some(after) => match tokio::time::timeout(after, rx).await {
                Ok(reply) => reply,
                Err(_) => {
                    warn!(command = name, timeout_ms = after.as_millis(), "Native call timed out");
                    return Err(BridgeError::TimedOut { command: name, after });
                },
            },
            None => rx.await,
        };

        match reply {
            Ok(NativeReply::Success(payload)) => {
                trace!(%payload, "Native call succeeded");
                Ok(payload)
            },
            Ok(NativeReply::Error(payload)) => {
                debug!(%payload, "Native call failed");
                Err(BridgeError::native(payload))
            },
            Err(_) => {
                warn!(command = name, "Native bridge dropped the callback without replying");
                Err(BridgeError::CallbackDropped { command: name })
            },
        }
    }

    /// Issues a registration command whose callback the native side keeps.
    /// Every reply, on either channel, is handed to `sink`.
    pub fn listen(&self, command: NativeCommand, sink: impl Fn(NativeReply) + Send + Sync + 'static) {
        debug!(command = command.name, "Registering native event callback");
        self.bridge.exec(command, NativeCallback::new(sink));
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker").field("timeout", &self.timeout).finish_non_exhaustive()
    }
}
