//! QuickJS Host
//!
//! Provides a safe wrapper around the QuickJS JavaScript engine with bridge
//! factories installed as globals.

use bridge_runtime::{Bridge, Exposed};
use rquickjs::{Context, Ctx, Function, Runtime, Value as JsValue};
use serde_json::Value;

use super::globals::{register_console, register_factory};

// ─────────────────────────────────────────────────────────────────────────────
// JS Host Error
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur in the JavaScript host
#[derive(Debug, thiserror::Error)]
pub enum JsError {
    #[error("JavaScript error: {0}")]
    Js(String),

    #[error("Failed to create runtime: {0}")]
    RuntimeCreation(String),

    #[error("Failed to evaluate script: {0}")]
    Eval(String),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Type conversion error: {0}")]
    Conversion(String),
}

pub type JsResult<T> = Result<T, JsError>;

/// Message of a pending exception, or the error's own text
fn error_message(ctx: &Ctx<'_>, err: rquickjs::Error) -> String {
    if !matches!(err, rquickjs::Error::Exception) {
        return err.to_string();
    }

    let caught = ctx.catch();
    if let Some(exception) = caught.as_exception() {
        return exception.message().unwrap_or_else(|| err.to_string());
    }
    caught.get::<String>().unwrap_or_else(|_| err.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// JS Host
// ─────────────────────────────────────────────────────────────────────────────

/// A JavaScript runtime with bridge factories installed
pub struct JsHost {
    runtime: Runtime,
    context: Context,
}

impl JsHost {
    /// Create a new host with `console` registered
    pub fn new() -> JsResult<Self> {
        let runtime = Runtime::new().map_err(|e| JsError::RuntimeCreation(e.to_string()))?;
        let context = Context::full(&runtime).map_err(|e| JsError::RuntimeCreation(e.to_string()))?;

        context.with(|ctx| register_console(&ctx).map_err(|e| JsError::Js(e.to_string())))?;

        Ok(Self { runtime, context })
    }

    /// Install a bridge's instance factory under its configured global name
    pub fn install<T: Exposed>(&self, bridge: &Bridge<T>) -> JsResult<()> {
        self.context.with(|ctx| {
            register_factory(&ctx, bridge.clone()).map_err(|e| JsError::Js(error_message(&ctx, e)))
        })
    }

    /// Evaluate a JavaScript script
    pub fn eval(&self, script: &str) -> JsResult<Value> {
        self.context.with(|ctx| {
            let result: JsValue = ctx
                .eval(script)
                .map_err(|e| JsError::Eval(error_message(&ctx, e)))?;
            js_to_json(&result)
        })
    }

    /// Evaluate a script file
    pub fn eval_file(&self, name: &str, script: &str) -> JsResult<Value> {
        self.context.with(|ctx| {
            let mut options = rquickjs::context::EvalOptions::default();
            options.global = true;
            options.strict = true;
            options.backtrace_barrier = true;

            let result: JsValue = ctx
                .eval_with_options(script, options)
                .map_err(|e| JsError::Eval(format!("{}: {}", name, error_message(&ctx, e))))?;
            js_to_json(&result)
        })
    }

    /// Check if a function exists in the global scope
    pub fn has_function(&self, name: &str) -> bool {
        self.context
            .with(|ctx| ctx.globals().get::<_, Function>(name).is_ok())
    }

    /// Call a global function with JSON arguments
    pub fn call_function(&self, name: &str, args: &[Value]) -> JsResult<Value> {
        self.context.with(|ctx| {
            let func: Function = ctx
                .globals()
                .get(name)
                .map_err(|_| JsError::FunctionNotFound(name.to_string()))?;

            let mut call_args = rquickjs::function::Args::new(ctx.clone(), args.len());
            for arg in args {
                call_args
                    .push_arg(json_to_js(&ctx, arg)?)
                    .map_err(|e| JsError::Conversion(e.to_string()))?;
            }

            let result: JsValue = func
                .call_arg(call_args)
                .map_err(|e| JsError::Js(format!("Error calling {}: {}", name, error_message(&ctx, e))))?;

            js_to_json(&result)
        })
    }

    /// Run garbage collection
    pub fn gc(&self) {
        self.runtime.run_gc();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Value Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a JavaScript value to JSON; functions and symbols become `null`
fn js_to_json(js: &JsValue<'_>) -> JsResult<Value> {
    match js.type_of() {
        rquickjs::Type::Bool => {
            let b: bool = js.get().map_err(|e| JsError::Conversion(e.to_string()))?;
            Ok(Value::Bool(b))
        }
        rquickjs::Type::Int => {
            let i: i32 = js.get().map_err(|e| JsError::Conversion(e.to_string()))?;
            Ok(Value::from(i))
        }
        rquickjs::Type::Float => {
            let f: f64 = js.get().map_err(|e| JsError::Conversion(e.to_string()))?;
            Ok(serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number))
        }
        rquickjs::Type::String => {
            let s: String = js.get().map_err(|e| JsError::Conversion(e.to_string()))?;
            Ok(Value::String(s))
        }
        rquickjs::Type::Array => {
            let arr: rquickjs::Array = js.get().map_err(|e| JsError::Conversion(e.to_string()))?;
            let mut values = Vec::with_capacity(arr.len());
            for i in 0..arr.len() {
                let item: JsValue = arr.get(i).map_err(|e| JsError::Conversion(e.to_string()))?;
                values.push(js_to_json(&item)?);
            }
            Ok(Value::Array(values))
        }
        rquickjs::Type::Object => {
            let obj: rquickjs::Object = js.get().map_err(|e| JsError::Conversion(e.to_string()))?;
            let mut fields = serde_json::Map::new();
            for prop in obj.props::<String, JsValue>() {
                let (key, val) = prop.map_err(|e| JsError::Conversion(e.to_string()))?;
                fields.insert(key, js_to_json(&val)?);
            }
            Ok(Value::Object(fields))
        }
        _ => Ok(Value::Null),
    }
}

/// Convert a serde_json::Value to a JavaScript value
fn json_to_js<'js>(ctx: &Ctx<'js>, json: &Value) -> JsResult<JsValue<'js>> {
    use rquickjs::IntoJs;

    match json {
        Value::Null => Ok(JsValue::new_null(ctx.clone())),
        Value::Bool(b) => Ok(JsValue::new_bool(ctx.clone(), *b)),
        Value::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => Ok(JsValue::new_int(ctx.clone(), i)),
            None => Ok(JsValue::new_float(ctx.clone(), n.as_f64().unwrap_or(f64::NAN))),
        },
        Value::String(s) => s
            .as_str()
            .into_js(ctx)
            .map_err(|e| JsError::Conversion(e.to_string())),
        Value::Array(arr) => {
            let js_arr = rquickjs::Array::new(ctx.clone())
                .map_err(|e| JsError::Conversion(e.to_string()))?;
            for (i, item) in arr.iter().enumerate() {
                js_arr
                    .set(i, json_to_js(ctx, item)?)
                    .map_err(|e| JsError::Conversion(e.to_string()))?;
            }
            Ok(js_arr.into_value())
        }
        Value::Object(obj) => {
            let js_obj = rquickjs::Object::new(ctx.clone())
                .map_err(|e| JsError::Conversion(e.to_string()))?;
            for (key, val) in obj {
                js_obj
                    .set(key.as_str(), json_to_js(ctx, val)?)
                    .map_err(|e| JsError::Conversion(e.to_string()))?;
            }
            Ok(js_obj.into_value())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
