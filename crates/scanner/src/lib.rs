//! # Scanner
//!
//! Turns a callback-style native barcode-reader bridge into async commands that always
//! resolve to a uniform [`Envelope`] (`action`, `status`, `result`, `err`).
//!
//! * [`NativeBridge`]: the seam to the reader SDK. It receives a [`NativeCommand`] and
//!   answers through a [`NativeCallback`].
//! * [`Invoker`]: forwards one command and awaits the first reply, optionally bounded by a
//!   timeout.
//! * [`Scanner`]: the normalizer. It validates input, shapes results and never returns `Err`.
//!   It also owns the [`Listeners`] for connection-state, availability, scan-result and
//!   scanning-state events.
//! * [`Request`] / [`Scanner::dispatch`]: the loosely typed boundary for application shells.
//!
//! ## Example
//!
//! ```rust
//! use cmb_scanner::{NativeBridge, NativeCallback, NativeCommand, Scanner};
//! use cmb_domain::Symbology;
//!
//! struct AlwaysOn;
//!
//! impl NativeBridge for AlwaysOn {
//!     fn exec(&self, _command: NativeCommand, callback: NativeCallback) {
//!         callback.success(1);
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let scanner = Scanner::builder().bridge(AlwaysOn).build();
//! let envelope = scanner.set_symbology_enabled(Symbology::DataMatrix, true).await;
//!
//! assert_eq!(envelope.action, "SET SYMBOL.DATAMATRIX ON");
//! assert!(envelope.status);
//! # }
//! ```

mod builder;
mod coerce;
mod envelope;
mod error;
mod events;
mod invoker;
mod listeners;
mod native;
mod profile;
mod request;
mod scanner;

pub use crate::builder::{NoBridge, ScannerBuilder, WithBridge};
pub use crate::coerce::{loosely_one, non_empty, truthy};
pub use crate::envelope::{Envelope, EnvelopeFutureExt};
pub use crate::error::{BridgeError, BridgeErrorExt};
pub use crate::invoker::Invoker;
pub use crate::listeners::{ListenerSlot, Listeners};
pub use crate::native::{NativeBridge, NativeCallback, NativeCommand, NativeReply};
pub use crate::request::{
    INVALID_CAMERA_MODE, INVALID_COMMAND, INVALID_DEVICE, INVALID_OVERLAY_MODE, INVALID_PARSER,
    INVALID_SYMBOL, Request, UNSUPPORTED_TRIGGER,
};
pub use crate::scanner::Scanner;
