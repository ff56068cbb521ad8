//! The seam to the native reader SDK.
//!
//! A [`NativeBridge`] receives a [`NativeCommand`] and a [`NativeCallback`]. It answers by
//! invoking the callback on its success or error channel, now or later, from any thread.
//! Registration commands keep the callback and invoke it once per event.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A named native action plus positional arguments in the native encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCommand {
    pub name: &'static str,
    pub args: Vec<Value>,
}

impl NativeCommand {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, args: Vec::new() }
    }

    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }
}

/// One answer from the native side.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeReply {
    Success(Value),
    Error(Value),
}

impl NativeReply {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Cloneable reply handle given to the native side with every command.
#[derive(Clone)]
pub struct NativeCallback {
    handler: Arc<dyn Fn(NativeReply) + Send + Sync>,
}

impl NativeCallback {
    pub fn new(handler: impl Fn(NativeReply) + Send + Sync + 'static) -> Self {
        Self { handler: Arc::new(handler) }
    }

    pub fn reply(&self, reply: NativeReply) {
        (self.handler)(reply);
    }

    pub fn success(&self, payload: impl Into<Value>) {
        self.reply(NativeReply::Success(payload.into()));
    }

    pub fn error(&self, payload: impl Into<Value>) {
        self.reply(NativeReply::Error(payload.into()));
    }
}

impl fmt::Debug for NativeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCallback").field("clones", &Arc::strong_count(&self.handler)).finish()
    }
}

/// The native collaborator: executes commands and reports through callbacks.
///
/// Implementations must not block; long-running work should reply later from another
/// thread or task. Dropping every clone of the callback without replying is reported to the
/// caller as a dropped callback.
pub trait NativeBridge: Send + Sync + 'static {
    fn exec(&self, command: NativeCommand, callback: NativeCallback);
}

impl<B: NativeBridge + ?Sized> NativeBridge for Arc<B> {
    fn exec(&self, command: NativeCommand, callback: NativeCallback) {
        (**self).exec(command, callback);
    }
}
