// Argument Coercion - JSON values into declared parameter types
//
// JSON numbers are treated as f64 throughout, so integer parameters accept
// any number and truncate it toward zero.

use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;
use std::time::Duration;

use bridge_types::{CallError, JsonKind, ParamType};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// FromArg Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Conversion from an untyped JSON argument into a declared parameter type
pub trait FromArg: Sized {
    /// The declared type as reported by self-enumeration
    fn param_type() -> ParamType;

    /// Coerce the argument at position `index`
    fn from_arg(index: usize, value: Value) -> Result<Self, CallError>;
}

fn mismatch(index: usize, expected: ParamType, value: &Value) -> CallError {
    CallError::TypeMismatch {
        index,
        expected,
        actual: JsonKind::of(value),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scalars
// ─────────────────────────────────────────────────────────────────────────────

/// Integer types usable as parameters, list elements, and map keys
pub trait Integer: Copy + FromStr {
    /// Truncate a JSON number toward zero (saturating at the type's bounds)
    fn truncate(number: f64) -> Self;
}

macro_rules! integer_args {
    ($($t:ty),* $(,)?) => {$(
        impl Integer for $t {
            fn truncate(number: f64) -> Self {
                number as $t
            }
        }

        impl FromArg for $t {
            fn param_type() -> ParamType {
                ParamType::Int
            }

            fn from_arg(index: usize, value: Value) -> Result<Self, CallError> {
                match value.as_f64() {
                    Some(number) => Ok(<$t as Integer>::truncate(number)),
                    None => Err(mismatch(index, ParamType::Int, &value)),
                }
            }
        }
    )*};
}

integer_args!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromArg for f64 {
    fn param_type() -> ParamType {
        ParamType::Float
    }

    fn from_arg(index: usize, value: Value) -> Result<Self, CallError> {
        value
            .as_f64()
            .ok_or_else(|| mismatch(index, ParamType::Float, &value))
    }
}

impl FromArg for f32 {
    fn param_type() -> ParamType {
        ParamType::Float
    }

    fn from_arg(index: usize, value: Value) -> Result<Self, CallError> {
        value
            .as_f64()
            .map(|number| number as f32)
            .ok_or_else(|| mismatch(index, ParamType::Float, &value))
    }
}

impl FromArg for bool {
    fn param_type() -> ParamType {
        ParamType::Bool
    }

    fn from_arg(index: usize, value: Value) -> Result<Self, CallError> {
        value
            .as_bool()
            .ok_or_else(|| mismatch(index, ParamType::Bool, &value))
    }
}

impl FromArg for String {
    fn param_type() -> ParamType {
        ParamType::String
    }

    fn from_arg(index: usize, value: Value) -> Result<Self, CallError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch(index, ParamType::String, &other)),
        }
    }
}

/// Durations arrive as raw nanosecond tick counts
impl FromArg for Duration {
    fn param_type() -> ParamType {
        ParamType::Duration
    }

    fn from_arg(index: usize, value: Value) -> Result<Self, CallError> {
        match value.as_f64() {
            Some(ticks) if ticks >= 0.0 => Ok(Duration::from_nanos(ticks as u64)),
            Some(ticks) => Err(CallError::DurationRange { index, ticks }),
            None => Err(mismatch(index, ParamType::Duration, &value)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collections
// ─────────────────────────────────────────────────────────────────────────────

impl<T: Integer> FromArg for Vec<T> {
    fn param_type() -> ParamType {
        ParamType::IntList
    }

    fn from_arg(index: usize, value: Value) -> Result<Self, CallError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item.as_f64() {
                    Some(number) => Ok(T::truncate(number)),
                    None => Err(CallError::InvalidElement {
                        index,
                        actual: JsonKind::of(&item),
                    }),
                })
                .collect(),
            other => Err(mismatch(index, ParamType::IntList, &other)),
        }
    }
}

/// Parse the entries of a JSON object whose keys are integers
fn int_float_entries<K: Integer>(index: usize, value: Value) -> Result<Vec<(K, f64)>, CallError> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, val)| {
                let Ok(parsed) = key.parse::<K>() else {
                    return Err(CallError::InvalidMapKey { index, key });
                };
                match val.as_f64() {
                    Some(number) => Ok((parsed, number)),
                    None => Err(CallError::InvalidMapValue {
                        index,
                        key,
                        actual: JsonKind::of(&val),
                    }),
                }
            })
            .collect(),
        other => Err(mismatch(index, ParamType::IntFloatMap, &other)),
    }
}

impl<K: Integer + Eq + Hash> FromArg for HashMap<K, f64> {
    fn param_type() -> ParamType {
        ParamType::IntFloatMap
    }

    fn from_arg(index: usize, value: Value) -> Result<Self, CallError> {
        Ok(int_float_entries(index, value)?.into_iter().collect())
    }
}

impl<K: Integer + Ord> FromArg for BTreeMap<K, f64> {
    fn param_type() -> ParamType {
        ParamType::IntFloatMap
    }

    fn from_arg(index: usize, value: Value) -> Result<Self, CallError> {
        Ok(int_float_entries(index, value)?.into_iter().collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Types Without A Coercion Rule
// ─────────────────────────────────────────────────────────────────────────────

/// Parameter of a type with no coercion rule, replaced by its zero value
///
/// Only the self-enumeration method may declare these; the `#[exposed]`
/// macro wraps its unrecognized parameter types in `Placeholder`.
pub struct Placeholder<T>(pub T);

impl<T> Placeholder<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Default> FromArg for Placeholder<T> {
    fn param_type() -> ParamType {
        ParamType::Unsupported(std::any::type_name::<T>().to_string())
    }

    fn from_arg(_index: usize, _value: Value) -> Result<Self, CallError> {
        Ok(Placeholder(T::default()))
    }
}

/// Parameter of a type with no coercion rule; every call naming it fails
///
/// Values of this type cannot be constructed.
pub struct Unsupported<T>(Infallible, PhantomData<T>);

impl<T> Unsupported<T> {
    pub fn into_inner(self) -> T {
        match self.0 {}
    }
}

impl<T> FromArg for Unsupported<T> {
    fn param_type() -> ParamType {
        ParamType::Unsupported(std::any::type_name::<T>().to_string())
    }

    fn from_arg(index: usize, _value: Value) -> Result<Self, CallError> {
        Err(CallError::UnsupportedType {
            index,
            type_name: std::any::type_name::<T>().to_string(),
        })
    }
}
