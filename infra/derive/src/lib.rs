#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros shared by the reader bridge crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! cmb-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its own macros;
//! see `tests/ui` for compiled usage.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns a plain enum into a crate error type wired for `?` and contextual messages.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug` and `thiserror::Error` unless already derived.
/// * **Context**: a companion `<Name>Ext` trait adding `.context(..)` to
///   `Result<T, Name>` and to `Result<T, Source>` for every source-carrying variant.
/// * **Conversions**: `From<Source>` for variants with a `source` field (or one marked
///   `#[source]` / `#[from]`), and `From<&'static str>` / `From<String>` when an
///   `Internal { message, context }` variant exists.
/// * **Formatting**: a module-level `format_context` helper rendering `" (ctx)"` or `""`.
///
/// # Requirements
///
/// 1. Applied to an enum with named-field variants only.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Source-carrying variants must also carry `context`.
///
/// # Example
///
/// ```rust,ignore
/// use cmb_derive::cmb_error;
/// use std::borrow::Cow;
///
/// #[cmb_error]
/// pub enum BridgeError {
///     #[error("Payload decode failure{}: {source}", format_context(.context))]
///     Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal bridge error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn decode(raw: &str) -> Result<serde_json::Value, BridgeError> {
///     serde_json::from_str(raw).context("Decoding scan result")
/// }
/// ```
#[proc_macro_attribute]
pub fn cmb_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
