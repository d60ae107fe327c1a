use indexmap::IndexMap;
use sandbox_linker_types::{FunctionType, Mutability, Type, Value};
use sandbox_linker_vm::{
    Caller, Compartment, CompartmentHandle, Extern, HostFunction, InstanceHandle, Trap,
    VMFunction, VMGlobal, VMInstance,
};
use std::{fmt, sync::Arc};

#[derive(Clone)]
enum Definition {
    Function { ty: FunctionType, host: HostFunction },
    Global { value: Value, mutability: Mutability },
}

/// A named collection of host functions and globals that can be
/// instantiated into a compartment.
///
/// The collection itself holds no runtime objects. Every call to
/// [`IntrinsicModule::instantiate`] creates fresh functions and globals in
/// the target compartment, so one collection can serve any number of
/// compartments.
#[derive(Clone)]
pub struct IntrinsicModule {
    name: String,
    definitions: IndexMap<String, Definition>,
}

impl IntrinsicModule {
    /// Creates an empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: IndexMap::new(),
        }
    }

    /// Adds a host function.
    pub fn function<F>(mut self, name: &str, params: &[Type], results: &[Type], host: F) -> Self
    where
        F: Fn(&mut Caller<'_>, &[Value]) -> Result<Vec<Value>, Trap> + Send + Sync + 'static,
    {
        self.definitions.insert(
            name.to_string(),
            Definition::Function {
                ty: FunctionType::new(params, results),
                host: Arc::new(host),
            },
        );
        self
    }

    /// Adds a global whose type is the type of `value`.
    pub fn global(mut self, name: &str, value: impl Into<Value>, mutability: Mutability) -> Self {
        self.definitions.insert(
            name.to_string(),
            Definition::Global {
                value: value.into(),
                mutability,
            },
        );
        self
    }

    /// Removes a definition, returning whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.definitions.shift_remove(name).is_some()
    }

    /// The name of the collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the collection defines `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Names of all definitions, in definition order.
    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Creates the collection's functions and globals in `compartment` and
    /// wraps them in an instance named `debug_name`.
    ///
    /// `extra_exports` are objects that already live in the compartment and
    /// are exported next to the definitions. An extra export shadows a
    /// definition of the same name.
    pub fn instantiate(
        &self,
        compartment: &mut Compartment,
        debug_name: &str,
        extra_exports: IndexMap<String, Extern>,
    ) -> InstanceHandle {
        tracing::debug!(
            module = self.name.as_str(),
            debug_name,
            definitions = self.definitions.len(),
            extra = extra_exports.len(),
            "instantiating intrinsic module"
        );

        let mut exports = IndexMap::with_capacity(self.definitions.len() + extra_exports.len());
        for (name, definition) in &self.definitions {
            let export = match definition {
                Definition::Function { ty, host } => {
                    let function = VMFunction::new(
                        format!("{}.{name}", self.name),
                        ty.clone(),
                        Arc::clone(host),
                    );
                    Extern::Function(CompartmentHandle::new(compartment, function))
                }
                Definition::Global { value, mutability } => Extern::Global(
                    CompartmentHandle::new(compartment, VMGlobal::from_value(*value, *mutability)),
                ),
            };
            exports.insert(name.clone(), export);
        }
        exports.extend(extra_exports);

        CompartmentHandle::new(compartment, VMInstance::new(debug_name, exports))
    }
}

impl fmt::Debug for IntrinsicModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntrinsicModule")
            .field("name", &self.name)
            .field("exports", &self.definitions.keys().collect::<Vec<_>>())
            .finish()
    }
}
