//! Bridge Types - Core type definitions for the method bridge
//!
//! This crate contains the pure data structures shared by the bridge runtime
//! and its JavaScript hosts: method descriptions, call errors, and the
//! rendering of call outcomes. It is designed to compile to WASM.

mod error;
mod outcome;
mod types;

pub use error::*;
pub use outcome::*;
pub use types::*;
