//! Bridge Runtime - Method registry and adapters for JavaScript hosts
//!
//! This crate turns a wrapped object's exposed methods into host-callable
//! adapters. Each call decodes a JSON argument list, coerces every element to
//! the declared parameter type, invokes the method, and encodes the results.
//!
//! ## Features
//!
//! - `wasm` - Enable the wasm-bindgen host binding

pub use bridge_types;
pub use bridge_types::*;

pub use bridge_macros::exposed;

mod adapter;
mod bridge;
mod coerce;
mod config;
mod registry;
mod results;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use adapter::*;
pub use bridge::*;
pub use coerce::*;
pub use config::*;
pub use registry::*;
pub use results::*;
