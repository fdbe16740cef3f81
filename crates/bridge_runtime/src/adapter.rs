//! Method adapters
//!
//! An `Adapter` binds one exposed method of one wrapped instance to a
//! host-callable entry point. Every call runs decode → coerce → invoke →
//! encode in one uninterrupted step on the caller's thread.

use std::sync::Arc;

use bridge_types::{CallError, CallResult, InstanceId, ResponseMode};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::MethodEntry;

/// Wrapped instance shared by every adapter created for it
pub type SharedInstance<T> = Arc<Mutex<T>>;

/// Host-callable binding of one method on one wrapped instance
pub struct Adapter<T> {
    instance_id: InstanceId,
    method: String,
    entry: Option<Arc<MethodEntry<T>>>,
    instance: SharedInstance<T>,
    mode: ResponseMode,
}

impl<T> Clone for Adapter<T> {
    fn clone(&self) -> Self {
        Self {
            instance_id: self.instance_id,
            method: self.method.clone(),
            entry: self.entry.clone(),
            instance: Arc::clone(&self.instance),
            mode: self.mode,
        }
    }
}

impl<T> Adapter<T> {
    /// Bind `method` on `instance`; `entry` is `None` when the name is not in
    /// the method table, in which case every call fails with method-not-found
    pub fn new(
        instance_id: InstanceId,
        method: impl Into<String>,
        entry: Option<Arc<MethodEntry<T>>>,
        instance: SharedInstance<T>,
        mode: ResponseMode,
    ) -> Self {
        Self {
            instance_id,
            method: method.into(),
            entry,
            instance,
            mode,
        }
    }

    /// Exposed method name
    pub fn name(&self) -> &str {
        &self.method
    }

    /// Instance this adapter is bound to
    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    /// Whether the method exists in the table
    pub fn is_bound(&self) -> bool {
        self.entry.is_some()
    }

    /// Run one call
    ///
    /// `arg` is the single host argument: a JSON-array string, or `None` when
    /// the host passed nothing. An empty string counts as nothing.
    pub fn call(&self, arg: Option<&str>) -> CallResult {
        let Some(entry) = &self.entry else {
            return Err(CallError::MethodNotFound(self.method.clone()));
        };
        let expected = entry.arity();

        let args = match arg {
            None | Some("") => {
                if expected != 0 {
                    return Err(CallError::MissingArguments);
                }
                Vec::new()
            }
            Some(json) => {
                let params: Option<Vec<Value>> =
                    serde_json::from_str(json).map_err(|e| CallError::InvalidJson(e.to_string()))?;
                let params = params.unwrap_or_default();
                if params.len() != expected {
                    return Err(CallError::ArgumentCount {
                        expected,
                        actual: params.len(),
                    });
                }
                params
            }
        };

        let mut target = self.instance.lock();
        entry.invoke(&mut target, args)
    }

    /// Run one call and render its outcome for the host
    pub fn respond(&self, arg: Option<&str>) -> String {
        let result = self.call(arg);
        match &result {
            Ok(values) => debug!(
                instance = %self.instance_id,
                method = %self.method,
                results = values.len(),
                "call completed"
            ),
            Err(err) => warn!(
                instance = %self.instance_id,
                method = %self.method,
                kind = ?err.kind(),
                "call failed: {}",
                err
            ),
        }
        self.mode.render(&result)
    }

    /// Render a failure detected by the host before the call could start
    pub fn reject(&self, err: CallError) -> String {
        warn!(
            instance = %self.instance_id,
            method = %self.method,
            kind = ?err.kind(),
            "call rejected: {}",
            err
        );
        self.mode.render(&Err(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MethodTable;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Probe {
        calls: usize,
        last_list: Vec<i64>,
        last_map: HashMap<i64, f64>,
    }

    fn probe_table() -> MethodTable<Probe> {
        let mut table = MethodTable::new();
        table.register("Ping", None, |p: &mut Probe| {
            p.calls += 1;
            "pong"
        });
        table.register("Add", None, |p: &mut Probe, a: i64, b: i64| {
            p.calls += 1;
            a + b
        });
        table.register("Store", None, |p: &mut Probe, list: Vec<i64>, map: HashMap<i64, f64>| {
            p.calls += 1;
            p.last_list = list;
            p.last_map = map;
        });
        table.register("Pair", None, |_: &mut Probe| (7_i64, "ok"));
        table
    }

    fn adapter(table: &MethodTable<Probe>, name: &str, instance: &SharedInstance<Probe>) -> Adapter<Probe> {
        Adapter::new(
            InstanceId::new(),
            name,
            table.get(name),
            Arc::clone(instance),
            ResponseMode::Legacy,
        )
    }

    #[test]
    fn test_niladic_call_without_argument() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let ping = adapter(&table, "Ping", &instance);

        assert_eq!(ping.respond(None), r#"["pong"]"#);
        assert_eq!(ping.respond(Some("")), r#"["pong"]"#);
        assert_eq!(ping.respond(Some("[]")), r#"["pong"]"#);
        assert_eq!(instance.lock().calls, 3);
    }

    #[test]
    fn test_missing_arguments_never_invokes() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let add = adapter(&table, "Add", &instance);

        assert_eq!(add.call(None), Err(CallError::MissingArguments));
        assert_eq!(add.respond(Some("")), "No arguments provided");
        assert_eq!(instance.lock().calls, 0);
    }

    #[test]
    fn test_argument_count_mismatch() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let add = adapter(&table, "Add", &instance);

        assert_eq!(add.respond(Some("[1]")), "Expected 2 parameters, got 1");
        assert_eq!(add.respond(Some("[1,2,3]")), "Expected 2 parameters, got 3");
        assert_eq!(add.respond(Some("null")), "Expected 2 parameters, got 0");
        assert_eq!(instance.lock().calls, 0);

        let ping = adapter(&table, "Ping", &instance);
        assert_eq!(ping.respond(Some("[1]")), "Expected 0 parameters, got 1");
    }

    #[test]
    fn test_malformed_json_never_invokes() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let add = adapter(&table, "Add", &instance);

        let err = add.call(Some("[1,2")).unwrap_err();
        assert!(matches!(err, CallError::InvalidJson(_)));
        assert!(add.respond(Some("[1,2")).starts_with("Invalid JSON input: "));

        let err = add.call(Some(r#"{"a":1}"#)).unwrap_err();
        assert!(matches!(err, CallError::InvalidJson(_)));
        assert_eq!(instance.lock().calls, 0);
    }

    #[test]
    fn test_coerced_collections_reach_the_method() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let store = adapter(&table, "Store", &instance);

        assert_eq!(store.respond(Some(r#"[[1,2,3],{"1":2.5,"2":3.0}]"#)), "[]");

        let probe = instance.lock();
        assert_eq!(probe.last_list, vec![1, 2, 3]);
        assert_eq!(probe.last_map, HashMap::from([(1, 2.5), (2, 3.0)]));
    }

    #[test]
    fn test_type_mismatch_names_parameter() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let add = adapter(&table, "Add", &instance);

        assert_eq!(
            add.respond(Some(r#"[1,"2"]"#)),
            "Parameter 1: expected integer, got string"
        );
        assert_eq!(instance.lock().calls, 0);
    }

    #[test]
    fn test_multiple_results() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let pair = adapter(&table, "Pair", &instance);
        assert_eq!(pair.call(None).unwrap(), vec![json!(7), json!("ok")]);
        assert_eq!(pair.respond(None), r#"[7,"ok"]"#);
    }

    #[test]
    fn test_unknown_method() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let missing = adapter(&table, "Missing", &instance);
        assert!(!missing.is_bound());
        assert_eq!(missing.respond(Some("[1]")), "Method Missing not found");
    }

    #[test]
    fn test_tagged_mode() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let add = Adapter::new(
            InstanceId::new(),
            "Add",
            table.get("Add"),
            Arc::clone(&instance),
            ResponseMode::Tagged,
        );

        assert_eq!(add.respond(Some("[2,3]")), r#"{"ok":true,"value":[5]}"#);
        let failure: Value = serde_json::from_str(&add.respond(None)).unwrap();
        assert_eq!(failure["ok"], json!(false));
        assert_eq!(failure["error"]["kind"], json!("missing_arguments"));
    }

    #[test]
    fn test_reject_renders_host_failure() {
        let table = probe_table();
        let instance = SharedInstance::default();
        let add = adapter(&table, "Add", &instance);
        let rendered = add.reject(CallError::InvalidJson("expected a JSON-encoded string argument".into()));
        assert_eq!(
            rendered,
            "Invalid JSON input: expected a JSON-encoded string argument"
        );
    }
}
