//! WASM bindings for Phase
//!
//! JavaScript calls `initBridge(options?)` once and receives a handle that
//! builds `Phase` objects. Nothing is installed globally unless the caller
//! asks for it with `installGlobal()`.

use bridge_runtime::wasm as host;
use bridge_runtime::{Bridge, BridgeConfig};
use wasm_bindgen::prelude::*;

use crate::Phase;

/// Initialize the bridge
///
/// `options` is an optional object such as
/// `{ globalName: "NewPhase", responseMode: "legacy" }`.
#[wasm_bindgen(js_name = initBridge)]
pub fn init_bridge(options: JsValue) -> Result<BridgeHandle, JsValue> {
    console_error_panic_hook::set_once();

    let config: BridgeConfig = if options.is_undefined() || options.is_null() {
        BridgeConfig::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid bridge options: {}", e)))?
    };

    Ok(BridgeHandle {
        bridge: Bridge::new(config),
    })
}

/// Handle returned by `initBridge`
#[wasm_bindgen]
pub struct BridgeHandle {
    bridge: Bridge<Phase>,
}

#[wasm_bindgen]
impl BridgeHandle {
    /// Construct a Phase and return its method object
    #[wasm_bindgen(js_name = newPhase)]
    pub fn new_phase(&self) -> js_sys::Object {
        host::bind_instance(&self.bridge)
    }

    /// Install the factory as a global function under `globalName`
    #[wasm_bindgen(js_name = installGlobal)]
    pub fn install_global(&self) -> Result<(), JsValue> {
        host::install_global(self.bridge.clone())
    }

    #[wasm_bindgen(getter = globalName)]
    pub fn global_name(&self) -> String {
        self.bridge.config().global_name.clone()
    }
}

/// Get version information
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
