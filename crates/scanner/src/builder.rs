use crate::invoker::Invoker;
use crate::listeners::Listeners;
use crate::native::NativeBridge;
use crate::scanner::{Scanner, ScannerInner};
use cmb_domain::config::ScannerConfig;
use fxhash::FxHashSet;
use parking_lot::Mutex;
use private::Sealed;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Default)]
pub struct NoBridge;

pub struct WithBridge(Arc<dyn NativeBridge>);

impl std::fmt::Debug for WithBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WithBridge")
    }
}

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoBridge {}
impl Sealed for WithBridge {}

/// Assembles a [`Scanner`]. A native bridge is required before [`ScannerBuilder::build`].
#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct ScannerBuilder<S: Sealed = NoBridge> {
    state: S,
    listeners: Option<Arc<Listeners>>,
    timeout: Option<Duration>,
}

#[allow(private_bounds)]
impl<S: Sealed> ScannerBuilder<S> {
    /// Shares an existing listener context instead of creating a fresh one.
    #[must_use = "Sets the listener context the scanner dispatches events to"]
    pub fn listeners(mut self, listeners: Arc<Listeners>) -> Self {
        self.listeners = Some(listeners);
        self
    }

    /// Bounds each native call; a call exceeding it settles with `status = false`.
    #[must_use = "Sets the per-call timeout for native commands"]
    pub const fn call_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Takes the call timeout from a profile (`call_timeout_ms`). Other profile fields are
    /// applied after connecting, see [`Scanner::apply_profile`].
    #[must_use = "Applies scanner configuration to the builder"]
    pub fn config(mut self, config: &ScannerConfig) -> Self {
        self.timeout = config.call_timeout_ms.map(Duration::from_millis);
        self
    }
}

impl ScannerBuilder<NoBridge> {
    #[must_use = "Creates a new scanner builder"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the native bridge commands are sent to"]
    pub fn bridge(self, bridge: impl NativeBridge) -> ScannerBuilder<WithBridge> {
        self.shared_bridge(Arc::new(bridge))
    }

    #[must_use = "Sets the native bridge commands are sent to"]
    pub fn shared_bridge(self, bridge: Arc<dyn NativeBridge>) -> ScannerBuilder<WithBridge> {
        ScannerBuilder {
            state: WithBridge(bridge),
            listeners: self.listeners,
            timeout: self.timeout,
        }
    }
}

impl ScannerBuilder<WithBridge> {
    /// Builds the scanner. No native call is issued until the first operation.
    #[must_use]
    pub fn build(self) -> Scanner {
        debug!(timeout = ?self.timeout, shared_listeners = self.listeners.is_some(), "Scanner built");
        Scanner {
            inner: Arc::new(ScannerInner {
                invoker: Invoker::new(self.state.0).with_timeout(self.timeout),
                listeners: self.listeners.unwrap_or_default(),
                forwarding: Mutex::new(FxHashSet::default()),
            }),
        }
    }
}
