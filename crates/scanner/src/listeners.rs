use cmb_domain::{Availability, ConnectionState, ScanResult};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type Handler<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Holds at most one handler for one event class. Registering replaces the previous handler.
pub struct ListenerSlot<T> {
    name: &'static str,
    handler: RwLock<Option<Handler<T>>>,
}

impl<T> ListenerSlot<T> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, handler: RwLock::new(None) }
    }

    /// Stores `handler`, returning `true` if it replaced an existing one.
    pub fn set(&self, handler: impl Fn(T) + Send + Sync + 'static) -> bool {
        let replaced = self.handler.write().replace(Arc::new(handler)).is_some();
        trace!(slot = self.name, replaced, "Listener registered");
        replaced
    }

    /// Stores `handler` only when the slot is empty. Returns whether it was installed.
    pub fn set_if_empty(&self, handler: impl Fn(T) + Send + Sync + 'static) -> bool {
        let mut slot = self.handler.write();
        if slot.is_some() {
            return false;
        }
        *slot = Some(Arc::new(handler));
        trace!(slot = self.name, "Listener registered into empty slot");
        true
    }

    pub fn clear(&self) -> bool {
        self.handler.write().take().is_some()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.handler.read().is_some()
    }

    /// Hands `event` to the current handler. Returns `false` when the slot is empty.
    ///
    /// The handler runs outside the lock, so it may re-register itself.
    pub fn emit(&self, event: T) -> bool {
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => {
                trace!(slot = self.name, "Dispatching event");
                handler(event);
                true
            },
            None => {
                trace!(slot = self.name, "No listener registered; event dropped");
                false
            },
        }
    }
}

impl<T> fmt::Debug for ListenerSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSlot").field("name", &self.name).field("set", &self.is_set()).finish()
    }
}

/// The application-level handlers for native events, one slot per event class.
///
/// Owned by a [`crate::Scanner`]; share one `Arc<Listeners>` between several scanners or
/// with the code that composes them via [`crate::ScannerBuilder::listeners`].
#[derive(Debug)]
pub struct Listeners {
    pub connection_state: ListenerSlot<ConnectionState>,
    pub availability: ListenerSlot<Availability>,
    pub scan_result: ListenerSlot<ScanResult>,
    pub scanning_state: ListenerSlot<bool>,
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Listeners {
    fn default() -> Self {
        Self {
            connection_state: ListenerSlot::new("connection_state"),
            availability: ListenerSlot::new("availability"),
            scan_result: ListenerSlot::new("scan_result"),
            scanning_state: ListenerSlot::new("scanning_state"),
        }
    }
}
