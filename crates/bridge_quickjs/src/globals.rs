//! JavaScript Global Objects
//!
//! Registers `console` and the instance factory in a QuickJS context.

use bridge_runtime::{Bridge, CallError, Exposed};
use rquickjs::function::Rest;
use rquickjs::{Ctx, Function, Object, Result as JsResult, Value};

/// Register the console object with log, info, warn, error and debug methods
pub fn register_console(ctx: &Ctx<'_>) -> JsResult<()> {
    let globals = ctx.globals();

    // Check if console already exists
    if globals.get::<_, Object>("console").is_ok() {
        return Ok(());
    }

    let console = Object::new(ctx.clone())?;

    console.set("log", Function::new(ctx.clone(), |args: Rest<String>| {
        println!("{}", args.0.join(" "));
    })?)?;

    console.set("info", Function::new(ctx.clone(), |args: Rest<String>| {
        tracing::info!(target: "bridge.js.console", "{}", args.0.join(" "));
    })?)?;

    console.set("warn", Function::new(ctx.clone(), |args: Rest<String>| {
        tracing::warn!(target: "bridge.js.console", "{}", args.0.join(" "));
    })?)?;

    console.set("error", Function::new(ctx.clone(), |args: Rest<String>| {
        tracing::error!(target: "bridge.js.console", "{}", args.0.join(" "));
    })?)?;

    console.set("debug", Function::new(ctx.clone(), |args: Rest<String>| {
        tracing::debug!(target: "bridge.js.console", "{}", args.0.join(" "));
    })?)?;

    globals.set("console", console)?;

    Ok(())
}

/// JS `typeof` name of a value
fn js_type_name(value: &Value<'_>) -> &'static str {
    match value.type_of() {
        rquickjs::Type::Bool => "boolean",
        rquickjs::Type::Int | rquickjs::Type::Float => "number",
        rquickjs::Type::Symbol => "symbol",
        rquickjs::Type::Function => "function",
        rquickjs::Type::Undefined | rquickjs::Type::Uninitialized => "undefined",
        rquickjs::Type::Null => "null",
        _ => "object",
    }
}

/// Normalize the single host argument
///
/// Only a missing argument counts as absent. An explicit `undefined`, `null`
/// or any other non-string fails.
fn host_argument(arg: Option<&Value<'_>>) -> Result<Option<String>, CallError> {
    let Some(value) = arg else {
        return Ok(None);
    };
    if value.is_string() {
        return value
            .get::<String>()
            .map(Some)
            .map_err(|e| CallError::InvalidJson(e.to_string()));
    }
    Err(CallError::non_string_argument(js_type_name(value)))
}

/// Construct one instance and expose it as a JS object
///
/// On enumeration failure the object carries only an `error` field, rendered
/// in the bridge's response mode.
pub fn bind_instance<'js, T: Exposed>(ctx: &Ctx<'js>, bridge: &Bridge<T>) -> JsResult<Object<'js>> {
    let obj = Object::new(ctx.clone())?;

    match bridge.instantiate() {
        Ok(bound) => {
            for adapter in bound.into_adapters() {
                let name = adapter.name().to_string();
                let func = Function::new(ctx.clone(), move |args: Rest<Value<'js>>| -> String {
                    match host_argument(args.0.first()) {
                        Ok(json) => adapter.respond(json.as_deref()),
                        Err(err) => adapter.reject(err),
                    }
                })?;
                obj.set(name, func)?;
            }
        }
        Err(err) => {
            let rendered = bridge.config().response_mode.render_enumeration_error(&err);
            obj.set("error", rendered)?;
        }
    }

    Ok(obj)
}

/// Register the instance factory under the bridge's configured global name
pub fn register_factory<'js, T: Exposed>(ctx: &Ctx<'js>, bridge: Bridge<T>) -> JsResult<()> {
    let name = bridge.config().global_name.clone();
    let factory = Function::new(ctx.clone(), move |ctx: Ctx<'js>| bind_instance(&ctx, &bridge))?;
    ctx.globals().set(name.as_str(), factory)?;

    tracing::debug!("Registered factory {} for {}", name, T::TYPE_NAME);
    Ok(())
}
