// Method Registry - Stores exposed methods and their handlers
//
// The table maps each exposed name to a strongly typed handler closure. It is
// built once per bridge, from the `#[exposed]` registration list or from
// explicit `register` calls, and shared by every instance's adapters.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use bridge_types::{CallError, MethodInfo, ParamType};
use serde_json::Value;

use crate::coerce::FromArg;
use crate::results::IntoResults;

// ─────────────────────────────────────────────────────────────────────────────
// Handler Traits
// ─────────────────────────────────────────────────────────────────────────────

/// Type-erased invocation of one exposed method
pub trait MethodHandler<T>: Send + Sync {
    /// Coerce `args` positionally, invoke the method on `target`, and encode
    /// its return values
    fn invoke(&self, target: &mut T, args: Vec<Value>) -> Result<Vec<Value>, CallError>;
}

/// Closures usable as method handlers
///
/// Implemented for `Fn(&mut T, A0, .., An) -> R` (up to six parameters) where
/// every `Ai: FromArg` and `R: IntoResults`. `Args` is the marker tuple
/// `(R, A0, .., An)`.
pub trait Handler<T, Args>: Send + Sync + 'static {
    /// Declared parameter types, in order
    fn param_types() -> Vec<ParamType>;

    fn handle(&self, target: &mut T, args: Vec<Value>) -> Result<Vec<Value>, CallError>;
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $(, $tail:ident)*) => { 1usize + count!($($tail),*) };
}

macro_rules! impl_handler {
    ($($arg:ident),*) => {
        impl<T, F, R, $($arg,)*> Handler<T, (R, $($arg,)*)> for F
        where
            F: Fn(&mut T, $($arg),*) -> R + Send + Sync + 'static,
            R: IntoResults,
            $($arg: FromArg,)*
        {
            fn param_types() -> Vec<ParamType> {
                vec![$(<$arg as FromArg>::param_type()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn handle(&self, target: &mut T, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
                let expected = count!($($arg),*);
                if args.len() != expected {
                    return Err(CallError::ArgumentCount {
                        expected,
                        actual: args.len(),
                    });
                }

                let mut args = args.into_iter().enumerate();
                $(
                    let $arg = match args.next() {
                        Some((index, value)) => <$arg as FromArg>::from_arg(index, value)?,
                        None => return Err(CallError::ArgumentCount { expected, actual: 0 }),
                    };
                )*

                (self)(target, $($arg),*).into_results()
            }
        }
    };
}

impl_handler!();
impl_handler!(A0);
impl_handler!(A0, A1);
impl_handler!(A0, A1, A2);
impl_handler!(A0, A1, A2, A3);
impl_handler!(A0, A1, A2, A3, A4);
impl_handler!(A0, A1, A2, A3, A4, A5);

/// Erases the parameter tuple of a `Handler`
struct FnMethodHandler<F, Args> {
    func: F,
    _args: PhantomData<fn() -> Args>,
}

impl<T, F, Args> MethodHandler<T> for FnMethodHandler<F, Args>
where
    F: Handler<T, Args>,
{
    fn invoke(&self, target: &mut T, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        self.func.handle(target, args)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Method Table
// ─────────────────────────────────────────────────────────────────────────────

/// Entry in the method table
pub struct MethodEntry<T> {
    info: MethodInfo,
    enumeration: bool,
    handler: Arc<dyn MethodHandler<T>>,
}

impl<T> MethodEntry<T> {
    /// Self-description of this method
    pub fn info(&self) -> &MethodInfo {
        &self.info
    }

    /// Exposed name
    pub fn name(&self) -> &str {
        &self.info.method_name
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.info.arity()
    }

    /// Whether this is the type's self-enumeration accessor
    pub fn is_enumeration(&self) -> bool {
        self.enumeration
    }

    pub fn invoke(&self, target: &mut T, args: Vec<Value>) -> Result<Vec<Value>, CallError> {
        self.handler.invoke(target, args)
    }
}

/// Registry of the methods one wrapped type exposes
pub struct MethodTable<T> {
    methods: HashMap<String, Arc<MethodEntry<T>>>,
    /// Registration order, which is also the default enumeration order
    order: Vec<String>,
}

impl<T: 'static> Default for MethodTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> MethodTable<T> {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a method handler under `name`
    ///
    /// Registering a name twice replaces the handler but keeps its position.
    pub fn register<Args, H>(&mut self, name: impl Into<String>, description: Option<&str>, handler: H)
    where
        H: Handler<T, Args>,
        Args: 'static,
    {
        self.insert(name.into(), description, false, handler);
    }

    /// Register the type's self-enumeration accessor
    pub fn register_enumeration<Args, H>(
        &mut self,
        name: impl Into<String>,
        description: Option<&str>,
        handler: H,
    ) where
        H: Handler<T, Args>,
        Args: 'static,
    {
        self.insert(name.into(), description, true, handler);
    }

    fn insert<Args, H>(&mut self, name: String, description: Option<&str>, enumeration: bool, handler: H)
    where
        H: Handler<T, Args>,
        Args: 'static,
    {
        let mut info =
            MethodInfo::new(name.clone()).with_params(<H as Handler<T, Args>>::param_types());
        if let Some(desc) = description {
            info = info.with_description(desc);
        }

        let entry = MethodEntry {
            info,
            enumeration,
            handler: Arc::new(FnMethodHandler {
                func: handler,
                _args: PhantomData,
            }),
        };

        if self.methods.insert(name.clone(), Arc::new(entry)).is_none() {
            self.order.push(name);
        }
    }

    /// Get a method entry by name
    pub fn get(&self, name: &str) -> Option<Arc<MethodEntry<T>>> {
        self.methods.get(name).map(Arc::clone)
    }

    /// Check if a method is registered
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Exposed names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Self-descriptions in registration order
    pub fn describe(&self) -> Vec<MethodInfo> {
        self.order
            .iter()
            .filter_map(|name| self.methods.get(name))
            .map(|entry| entry.info.clone())
            .collect()
    }

    /// Name of the self-enumeration accessor, if one is registered
    pub fn enumeration_method(&self) -> Option<&str> {
        self.order
            .iter()
            .find(|name| self.methods.get(*name).is_some_and(|e| e.enumeration))
            .map(|s| s.as_str())
    }

    /// Get method count
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Check if table is empty
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
