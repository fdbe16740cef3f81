//! QuickJS host for exposed objects
//!
//! Installs a bridge's instance factory as a global function in a QuickJS
//! context, so scripts can construct wrapped objects and call their methods.
//!
//! # Example
//!
//! ```javascript
//! const phase = NewPhase();
//! console.log(phase.Add("[2,3]"));   // {"ok":true,"value":[5]}
//! ```
//!
//! # Global Objects
//!
//! - `console.log(...)` - Print to stdout
//! - `console.info(...)` - Log at info level
//! - `console.warn(...)` - Log at warn level
//! - `console.error(...)` - Log at error level
//! - `console.debug(...)` - Log at debug level
//! - The factory, under the bridge's configured global name

mod globals;
mod runtime;

pub use globals::{bind_instance, register_console, register_factory};
pub use runtime::{JsError, JsHost, JsResult};
