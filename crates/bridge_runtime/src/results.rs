//! Result encoding - method return values into the JSON result list

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::hash::Hash;
use std::time::Duration;

use bridge_types::{CallError, MethodInfo};
use serde::Serialize;
use serde_json::Value;

/// Conversion of one return value into its JSON representation
pub trait IntoResult {
    fn into_result(self) -> Result<Value, CallError>;
}

/// Conversion of a method's whole return into the ordered result list
pub trait IntoResults {
    /// Number of result values the declared return type produces
    const ARITY: usize;

    fn into_results(self) -> Result<Vec<Value>, CallError>;
}

fn to_json<T: Serialize>(value: T) -> Result<Value, CallError> {
    serde_json::to_value(value).map_err(|e| CallError::Serialization(e.to_string()))
}

/// Wrapper for returning any `Serialize` type from an exposed method
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

// ─────────────────────────────────────────────────────────────────────────────
// Single Values
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! serialize_results {
    ($($t:ty),* $(,)?) => {$(
        impl IntoResult for $t {
            fn into_result(self) -> Result<Value, CallError> {
                to_json(self)
            }
        }
    )*};
}

serialize_results!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, String, &'static str, MethodInfo,
);

// JSON has no representation for NaN or infinities
macro_rules! float_results {
    ($($t:ty),*) => {$(
        impl IntoResult for $t {
            fn into_result(self) -> Result<Value, CallError> {
                if !self.is_finite() {
                    return Err(CallError::Serialization(format!("unsupported value: {}", self)));
                }
                to_json(self)
            }
        }
    )*};
}

float_results!(f32, f64);

impl IntoResult for Value {
    fn into_result(self) -> Result<Value, CallError> {
        Ok(self)
    }
}

/// Durations leave as raw nanosecond tick counts, mirroring how they arrive
impl IntoResult for Duration {
    fn into_result(self) -> Result<Value, CallError> {
        u64::try_from(self.as_nanos())
            .map(Value::from)
            .map_err(|_| CallError::Serialization(format!("duration {:?} overflows tick count", self)))
    }
}

impl<T: Serialize> IntoResult for Vec<T> {
    fn into_result(self) -> Result<Value, CallError> {
        to_json(self)
    }
}

impl<T: Serialize> IntoResult for Option<T> {
    fn into_result(self) -> Result<Value, CallError> {
        to_json(self)
    }
}

impl<K: Serialize + Eq + Hash, V: Serialize> IntoResult for HashMap<K, V> {
    fn into_result(self) -> Result<Value, CallError> {
        to_json(self)
    }
}

impl<K: Serialize + Ord, V: Serialize> IntoResult for BTreeMap<K, V> {
    fn into_result(self) -> Result<Value, CallError> {
        to_json(self)
    }
}

impl<T: Serialize> IntoResult for Json<T> {
    fn into_result(self) -> Result<Value, CallError> {
        to_json(self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Lists
// ─────────────────────────────────────────────────────────────────────────────

impl IntoResults for () {
    const ARITY: usize = 0;

    fn into_results(self) -> Result<Vec<Value>, CallError> {
        Ok(Vec::new())
    }
}

impl<T: IntoResult> IntoResults for T {
    const ARITY: usize = 1;

    fn into_results(self) -> Result<Vec<Value>, CallError> {
        Ok(vec![self.into_result()?])
    }
}

macro_rules! tuple_results {
    ($arity:literal; $($name:ident),*) => {
        impl<$($name: IntoResult),*> IntoResults for ($($name,)*) {
            const ARITY: usize = $arity;

            #[allow(non_snake_case)]
            fn into_results(self) -> Result<Vec<Value>, CallError> {
                let ($($name,)*) = self;
                Ok(vec![$($name.into_result()?),*])
            }
        }
    };
}

tuple_results!(2; A, B);
tuple_results!(3; A, B, C);
tuple_results!(4; A, B, C, D);

/// `Ok` yields the value list followed by `null`; `Err` yields `null`
/// placeholders followed by the error message.
impl<R: IntoResults, E: Display> IntoResults for Result<R, E> {
    const ARITY: usize = R::ARITY + 1;

    fn into_results(self) -> Result<Vec<Value>, CallError> {
        match self {
            Ok(value) => {
                let mut values = value.into_results()?;
                values.push(Value::Null);
                Ok(values)
            }
            Err(err) => {
                let mut values = vec![Value::Null; R::ARITY];
                values.push(Value::String(err.to_string()));
                Ok(values)
            }
        }
    }
}
