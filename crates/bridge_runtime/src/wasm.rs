//! wasm-bindgen host binding
//!
//! Turns bound objects into plain JS objects whose fields are the enumerated
//! method names, each holding a closure that takes one JSON-array string.

use bridge_types::CallError;
use js_sys::{Array, Function, Object, Reflect};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::adapter::Adapter;
use crate::bridge::{Bridge, Exposed};

fn set_field(obj: &Object, key: &str, value: &JsValue) {
    if let Err(err) = Reflect::set(obj, &JsValue::from_str(key), value) {
        warn!("Failed to set field {}: {:?}", key, err);
    }
}

/// Normalize the single host argument
///
/// Only a missing argument counts as absent. An explicit `undefined`, `null`
/// or any other non-string fails; extra arguments are ignored.
pub fn host_argument(args: &Array) -> Result<Option<String>, CallError> {
    if args.length() == 0 {
        return Ok(None);
    }
    let arg = args.get(0);
    if let Some(json) = arg.as_string() {
        return Ok(Some(json));
    }
    let type_name = if arg.is_null() {
        "null".to_string()
    } else {
        arg.js_typeof().as_string().unwrap_or_default()
    };
    Err(CallError::non_string_argument(&type_name))
}

// wasm-bindgen closures see a missing argument as `undefined`, so a variadic
// shim forwards the real argument list.
const VARIADIC_SHIM: &str = "return function (...args) { return call(args); };";

fn adapter_function<T: 'static>(adapter: Adapter<T>) -> JsValue {
    // Without the shim the closure is called directly with the raw argument
    let call = Closure::<dyn Fn(JsValue) -> String>::new(move |args: JsValue| {
        let args = args.dyn_into::<Array>().unwrap_or_else(|arg| Array::of1(&arg));
        match host_argument(&args) {
            Ok(json) => adapter.respond(json.as_deref()),
            Err(err) => adapter.reject(err),
        }
    })
    .into_js_value();

    match Function::new_with_args("call", VARIADIC_SHIM).call1(&JsValue::NULL, &call) {
        Ok(shim) => shim,
        Err(err) => {
            warn!("Failed to build variadic shim: {:?}", err);
            call
        }
    }
}

/// Construct one instance and expose it as a JS object
///
/// On enumeration failure the object carries only an `error` field, rendered
/// in the bridge's response mode.
pub fn bind_instance<T: Exposed>(bridge: &Bridge<T>) -> Object {
    let obj = Object::new();
    match bridge.instantiate() {
        Ok(bound) => {
            for adapter in bound.into_adapters() {
                let name = adapter.name().to_string();
                set_field(&obj, &name, &adapter_function(adapter));
            }
        }
        Err(err) => {
            let rendered = bridge.config().response_mode.render_enumeration_error(&err);
            set_field(&obj, "error", &JsValue::from_str(&rendered));
        }
    }
    obj
}

/// Install the instance factory as a global function under the configured name
pub fn install_global<T: Exposed>(bridge: Bridge<T>) -> Result<(), JsValue> {
    let name = bridge.config().global_name.clone();
    let factory = Closure::<dyn Fn() -> JsValue>::new(move || JsValue::from(bind_instance(&bridge)));
    Reflect::set(&js_sys::global(), &JsValue::from_str(&name), &factory.into_js_value())?;
    Ok(())
}
