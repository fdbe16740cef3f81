// Tests for the #[exposed] attribute macro

use std::collections::HashMap;
use std::time::Duration;

use bridge_runtime::{
    Bridge, BridgeConfig, CallError, Exposed, MethodInfo, ParamType, ResponseMode, exposed,
};
use serde_json::json;

#[derive(Default)]
struct Gauge {
    readings: Vec<i32>,
    scale: f64,
}

/// Opaque handle with no coercion rule
#[derive(Default)]
struct Filter {
    depth: u8,
}

#[exposed(name = "Gauge")]
impl Gauge {
    /// Sum two integers.
    #[expose(name = "Add")]
    fn add(&self, a: i64, b: i64) -> i64 {
        a + b
    }

    #[expose(name = "Push")]
    fn push(&mut self, values: Vec<i32>) -> usize {
        self.readings.extend(values);
        self.readings.len()
    }

    #[expose(name = "Scale")]
    fn set_scale(&mut self, weights: HashMap<u32, f64>) {
        self.scale = weights.values().sum();
    }

    #[expose(name = "Wait")]
    fn wait(&self, d: std::time::Duration) -> Duration {
        d * 2
    }

    #[expose(name = "Apply")]
    fn apply(&self, filter: Filter) -> u8 {
        filter.depth
    }

    fn hidden(&self) -> i64 {
        42
    }

    /// List exposed methods.
    #[expose(name = "Methods", enumerate)]
    fn methods(&self, filter: Filter) -> Result<Vec<MethodInfo>, String> {
        if filter.depth != 0 {
            return Err("unexpected filter".to_string());
        }
        Ok(<Self as Exposed>::method_table().describe())
    }
}

struct Broken;

impl Broken {
    fn new() -> Self {
        Broken
    }
}

#[exposed(constructor = "new")]
impl Broken {
    #[expose]
    fn ping(&self) -> &'static str {
        "pong"
    }

    #[expose(enumerate)]
    fn listing(&self) -> Result<Vec<String>, String> {
        Err("introspection unavailable".to_string())
    }
}

fn legacy_bridge<T: Exposed>() -> Bridge<T> {
    Bridge::new(BridgeConfig::default().with_response_mode(ResponseMode::Legacy))
}

#[test]
fn test_table_lists_only_marked_methods() {
    let table = Gauge::method_table();
    assert_eq!(
        table.names().collect::<Vec<_>>(),
        vec!["Add", "Push", "Scale", "Wait", "Apply", "Methods"]
    );
    assert!(!table.contains("hidden"));
    assert_eq!(table.enumeration_method(), Some("Methods"));
    assert_eq!(Gauge::TYPE_NAME, "Gauge");
    assert_eq!(Gauge::default().hidden(), 42);
}

#[test]
fn test_descriptions_and_param_types() {
    let described = Gauge::method_table().describe();
    let add = &described[0];
    assert_eq!(add.description.as_deref(), Some("Sum two integers."));
    assert_eq!(add.params, vec![ParamType::Int, ParamType::Int]);

    assert_eq!(described[1].params, vec![ParamType::IntList]);
    assert_eq!(described[2].params, vec![ParamType::IntFloatMap]);
    assert_eq!(described[3].params, vec![ParamType::Duration]);
    assert!(!described[4].params[0].is_supported());
}

#[test]
fn test_enumeration_drives_binding() {
    let bound = legacy_bridge::<Gauge>().instantiate().unwrap();
    assert_eq!(
        bound.method_names().collect::<Vec<_>>(),
        vec!["Add", "Push", "Scale", "Wait", "Apply", "Methods"]
    );
}

#[test]
fn test_calls_through_generated_handlers() {
    let bound = legacy_bridge::<Gauge>().instantiate().unwrap();

    assert_eq!(bound.respond("Add", Some("[2,3]")), "[5]");
    assert_eq!(bound.respond("Push", Some("[[1,2,3]]")), "[3]");
    assert_eq!(bound.respond("Push", Some("[[4]]")), "[4]");
    assert_eq!(
        bound.respond("Scale", Some(r#"[{"1":2.5,"2":3.0}]"#)),
        "[]"
    );
    assert_eq!(bound.call("Wait", Some("[1000]")).unwrap(), vec![json!(2000)]);
}

#[test]
fn test_unsupported_parameter_fails_outside_enumeration() {
    let bound = legacy_bridge::<Gauge>().instantiate().unwrap();
    let err = bound.call("Apply", Some("[{}]")).unwrap_err();
    assert!(matches!(err, CallError::UnsupportedType { index: 0, .. }));
}

#[test]
fn test_enumeration_accessor_gets_zero_value() {
    let bound = legacy_bridge::<Gauge>().instantiate().unwrap();
    let values = bound.call("Methods", Some(r#"["ignored"]"#)).unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0][0]["methodName"], json!("Add"));
    assert_eq!(values[1], json!(null));
}

#[test]
fn test_failing_enumeration() {
    let err = legacy_bridge::<Broken>().instantiate().err().unwrap();
    assert_eq!(err.to_string(), "Error getting methods: introspection unavailable");
    assert_eq!(Broken::TYPE_NAME, "Broken");
    assert!(Broken::method_table().contains("ping"));
}

#[test]
fn test_static_str_return() {
    let ping = Broken::method_table().get("ping").unwrap();
    let values = ping.invoke(&mut Broken::new(), vec![]).unwrap();
    assert_eq!(values, vec![json!("pong")]);
}
