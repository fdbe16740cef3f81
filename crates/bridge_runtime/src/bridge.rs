//! Instance factory
//!
//! A `Bridge` owns the method table of one wrapped type. Each
//! `instantiate` call constructs a fresh instance, asks it to self-enumerate,
//! and binds one adapter per enumerated name.

use std::fmt::Display;
use std::sync::Arc;

use bridge_types::{CallError, CallResult, EnumerationError, InstanceId, MethodInfo, ResponseMode};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::adapter::Adapter;
use crate::config::BridgeConfig;
use crate::registry::MethodTable;

// ─────────────────────────────────────────────────────────────────────────────
// Collaborator Contract
// ─────────────────────────────────────────────────────────────────────────────

/// A wrapped object whose methods can be exposed to a JavaScript host
///
/// Usually implemented with `#[bridge_runtime::exposed]` on the type's
/// inherent impl block.
pub trait Exposed: Send + Sized + 'static {
    /// Type name used in logs
    const TYPE_NAME: &'static str;

    /// Construct a fresh instance
    fn construct() -> Self;

    /// Build the table of exposed methods
    fn method_table() -> MethodTable<Self>;

    /// List the names to bind on a fresh instance
    ///
    /// Defaults to the table's registration order.
    fn enumerate(&mut self, table: &MethodTable<Self>) -> Result<Vec<String>, EnumerationError> {
        Ok(table.names().map(str::to_string).collect())
    }
}

/// Values a self-enumeration method may return
pub trait MethodListing {
    fn into_method_names(self) -> Result<Vec<String>, EnumerationError>;
}

impl MethodListing for Vec<String> {
    fn into_method_names(self) -> Result<Vec<String>, EnumerationError> {
        Ok(self)
    }
}

impl MethodListing for Vec<&'static str> {
    fn into_method_names(self) -> Result<Vec<String>, EnumerationError> {
        Ok(self.into_iter().map(str::to_string).collect())
    }
}

impl MethodListing for Vec<MethodInfo> {
    fn into_method_names(self) -> Result<Vec<String>, EnumerationError> {
        Ok(self.into_iter().map(|info| info.method_name).collect())
    }
}

impl<L: MethodListing, E: Display> MethodListing for Result<L, E> {
    fn into_method_names(self) -> Result<Vec<String>, EnumerationError> {
        self.map_err(|e| EnumerationError(e.to_string()))?
            .into_method_names()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bridge
// ─────────────────────────────────────────────────────────────────────────────

/// Factory binding fresh instances of `T` to adapters
pub struct Bridge<T> {
    table: Arc<MethodTable<T>>,
    config: Arc<BridgeConfig>,
}

impl<T> Clone for Bridge<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T: Exposed> Bridge<T> {
    /// Build the method table once and keep it for every instance
    pub fn new(config: BridgeConfig) -> Self {
        let table = T::method_table();
        info!(
            "Bridge for {} ready: {} methods, global {}",
            T::TYPE_NAME,
            table.len(),
            config.global_name
        );

        Self {
            table: Arc::new(table),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn table(&self) -> &MethodTable<T> {
        &self.table
    }

    /// Construct one instance and bind an adapter per enumerated method
    pub fn instantiate(&self) -> Result<BoundObject<T>, EnumerationError> {
        let mut instance = T::construct();
        let names = instance.enumerate(&self.table).inspect_err(|e| {
            warn!("Failed to enumerate {} methods: {}", T::TYPE_NAME, e);
        })?;

        let id = InstanceId::new();
        let instance = Arc::new(Mutex::new(instance));
        let mut adapters: Vec<Adapter<T>> = Vec::with_capacity(names.len());

        for name in names {
            if adapters.iter().any(|a| a.name() == name) {
                continue;
            }
            let entry = self.table.get(&name);
            if entry.is_none() {
                warn!(instance = %id, "{} enumerated unknown method {}", T::TYPE_NAME, name);
            }
            adapters.push(Adapter::new(
                id,
                name,
                entry,
                Arc::clone(&instance),
                self.config.response_mode,
            ));
        }

        debug!(instance = %id, "Bound {} with {} adapters", T::TYPE_NAME, adapters.len());
        Ok(BoundObject {
            id,
            adapters,
            mode: self.config.response_mode,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bound Object
// ─────────────────────────────────────────────────────────────────────────────

/// The adapters bound to one instance, in enumeration order
pub struct BoundObject<T> {
    id: InstanceId,
    adapters: Vec<Adapter<T>>,
    mode: ResponseMode,
}

impl<T> BoundObject<T> {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// How this object's adapters render outcomes
    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn adapters(&self) -> &[Adapter<T>] {
        &self.adapters
    }

    pub fn into_adapters(self) -> Vec<Adapter<T>> {
        self.adapters
    }

    /// Get an adapter by method name
    pub fn adapter(&self, name: &str) -> Option<&Adapter<T>> {
        self.adapters.iter().find(|a| a.name() == name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.adapters.iter().map(|a| a.name())
    }

    /// Call a method by name
    pub fn call(&self, name: &str, arg: Option<&str>) -> CallResult {
        match self.adapter(name) {
            Some(adapter) => adapter.call(arg),
            None => Err(CallError::MethodNotFound(name.to_string())),
        }
    }

    /// Call a method by name and render the outcome for the host
    pub fn respond(&self, name: &str, arg: Option<&str>) -> String {
        match self.adapter(name) {
            Some(adapter) => adapter.respond(arg),
            None => self.mode.render(&Err(CallError::MethodNotFound(name.to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::Response;
    use serde_json::json;

    struct Accumulator {
        total: i64,
    }

    impl Exposed for Accumulator {
        const TYPE_NAME: &'static str = "Accumulator";

        fn construct() -> Self {
            Self { total: 10 }
        }

        fn method_table() -> MethodTable<Self> {
            let mut table = MethodTable::new();
            table.register("Add", None, |_: &mut Self, x: i64, y: i64| x + y);
            table.register("Bump", None, |a: &mut Self| {
                a.total += 1;
                a.total
            });
            table
        }
    }

    struct Faulty;

    impl Exposed for Faulty {
        const TYPE_NAME: &'static str = "Faulty";

        fn construct() -> Self {
            Faulty
        }

        fn method_table() -> MethodTable<Self> {
            let mut table = MethodTable::new();
            table.register("Noop", None, |_: &mut Self| ());
            table
        }

        fn enumerate(&mut self, _table: &MethodTable<Self>) -> Result<Vec<String>, EnumerationError> {
            Err::<Vec<String>, _>("registry offline").into_method_names()
        }
    }

    struct Listed;

    impl Exposed for Listed {
        const TYPE_NAME: &'static str = "Listed";

        fn construct() -> Self {
            Listed
        }

        fn method_table() -> MethodTable<Self> {
            let mut table = MethodTable::new();
            table.register("One", None, |_: &mut Self| 1_i64);
            table
        }

        fn enumerate(&mut self, _table: &MethodTable<Self>) -> Result<Vec<String>, EnumerationError> {
            vec!["One", "Ghost", "One"].into_method_names()
        }
    }

    fn legacy() -> BridgeConfig {
        BridgeConfig::default().with_response_mode(ResponseMode::Legacy)
    }

    #[test]
    fn test_end_to_end_add() {
        let bridge = Bridge::<Accumulator>::new(legacy());
        let bound = bridge.instantiate().unwrap();

        assert_eq!(bound.method_names().collect::<Vec<_>>(), vec!["Add", "Bump"]);
        assert_eq!(bound.call("Add", Some("[2,3]")).unwrap(), vec![json!(5)]);
        assert_eq!(bound.respond("Add", Some("[2,3]")), "[5]");
    }

    #[test]
    fn test_instances_are_independent() {
        let bridge = Bridge::<Accumulator>::new(legacy());
        let first = bridge.instantiate().unwrap();
        let second = bridge.instantiate().unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(first.call("Bump", None).unwrap(), vec![json!(11)]);
        assert_eq!(first.call("Bump", None).unwrap(), vec![json!(12)]);
        assert_eq!(second.call("Bump", None).unwrap(), vec![json!(11)]);
    }

    #[test]
    fn test_enumeration_failure_binds_nothing() {
        let bridge = Bridge::<Faulty>::new(legacy());
        let err = bridge.instantiate().err().unwrap();
        assert_eq!(err.to_string(), "Error getting methods: registry offline");
    }

    #[test]
    fn test_enumerated_names_dedupe_and_unknowns() {
        let bridge = Bridge::<Listed>::new(legacy());
        let bound = bridge.instantiate().unwrap();

        assert_eq!(bound.method_names().collect::<Vec<_>>(), vec!["One", "Ghost"]);
        assert!(!bound.adapter("Ghost").unwrap().is_bound());
        assert_eq!(
            bound.respond("Ghost", None),
            "Method Ghost not found"
        );
    }

    #[test]
    fn test_unlisted_name_is_not_found() {
        let bridge = Bridge::<Accumulator>::new(legacy());
        let bound = bridge.instantiate().unwrap();
        assert_eq!(
            bound.call("Subtract", Some("[1,1]")),
            Err(CallError::MethodNotFound("Subtract".to_string()))
        );
    }

    #[test]
    fn test_bridge_uses_configured_mode() {
        let bridge = Bridge::<Accumulator>::new(BridgeConfig::default());
        let bound = bridge.instantiate().unwrap();
        let add = bound.adapter("Add").unwrap();
        assert_eq!(add.respond(Some("[2,3]")), r#"{"ok":true,"value":[5]}"#);
    }

    #[test]
    fn test_bound_object_renders_in_bridge_mode() {
        let bound = Bridge::<Accumulator>::new(BridgeConfig::default())
            .instantiate()
            .unwrap();
        assert_eq!(bound.mode(), ResponseMode::Tagged);
        assert_eq!(bound.respond("Add", Some("[2,3]")), r#"{"ok":true,"value":[5]}"#);

        let missing = Response::parse(&bound.respond("Subtract", None)).unwrap();
        assert_eq!(missing.error.unwrap().kind, bridge_types::ErrorKind::MethodNotFound);

        let bound = Bridge::<Accumulator>::new(legacy()).instantiate().unwrap();
        assert_eq!(bound.respond("Add", Some("[2,3]")), "[5]");
        assert_eq!(bound.respond("Subtract", None), "Method Subtract not found");
    }
}
