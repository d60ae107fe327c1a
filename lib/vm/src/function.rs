use crate::{Compartment, CompartmentHandle, MemoryHandle, Trap, VMMemory};
use sandbox_linker_types::{FunctionType, Type, Value};
use std::{fmt, sync::Arc};

/// The host-side implementation of a function callable from sandboxed code.
pub type HostFunction =
    Arc<dyn Fn(&mut Caller<'_>, &[Value]) -> Result<Vec<Value>, Trap> + Send + Sync>;

/// What a host function can see of its caller: the compartment it runs in
/// and, if there is one, the linear memory it should operate on.
pub struct Caller<'a> {
    compartment: &'a mut Compartment,
    memory: Option<MemoryHandle>,
}

impl<'a> Caller<'a> {
    /// The compartment the call happens in.
    pub fn compartment(&mut self) -> &mut Compartment {
        &mut *self.compartment
    }

    /// The caller's linear memory.
    pub fn memory(&mut self) -> Result<&mut VMMemory, Trap> {
        match self.memory {
            Some(handle) if handle.comes_from(self.compartment) => {
                Ok(handle.get_mut(self.compartment))
            }
            _ => Err(Trap::NoMemory),
        }
    }
}

/// A host function instance.
#[derive(Clone)]
pub struct VMFunction {
    name: String,
    ty: FunctionType,
    host: HostFunction,
}

impl VMFunction {
    /// Wrap `host` as a function of type `ty`.
    pub fn new(name: impl Into<String>, ty: FunctionType, host: HostFunction) -> Self {
        Self {
            name: name.into(),
            ty,
            host,
        }
    }

    /// The debug name of the function.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The signature of the function.
    pub fn ty(&self) -> &FunctionType {
        &self.ty
    }
}

impl fmt::Debug for VMFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VMFunction")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

fn check_types(expected: &FunctionType, declared: &[Type], values: &[Value]) -> Result<(), Trap> {
    let given: Vec<Type> = values.iter().map(Value::ty).collect();
    if given.as_slice() != declared {
        return Err(Trap::BadSignature {
            expected: expected.clone(),
            given,
        });
    }
    Ok(())
}

impl CompartmentHandle<VMFunction> {
    /// Call the function with `args`, giving it access to `memory`.
    ///
    /// Arguments and results are checked against the signature.
    pub fn call(
        &self,
        compartment: &mut Compartment,
        memory: Option<MemoryHandle>,
        args: &[Value],
    ) -> Result<Vec<Value>, Trap> {
        let function = self.get(compartment);
        let ty = function.ty.clone();
        let host = Arc::clone(&function.host);
        tracing::trace!(name = function.name.as_str(), ?args, "calling host function");

        check_types(&ty, ty.params(), args)?;
        let mut caller = Caller {
            compartment,
            memory,
        };
        let results = host(&mut caller, args)?;
        check_types(&ty, ty.results(), &results)?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FunctionHandle;
    use sandbox_linker_types::{MemoryType, Type};

    fn add_one(compartment: &mut Compartment) -> FunctionHandle {
        let host: HostFunction = Arc::new(
            |_caller: &mut Caller<'_>, args: &[Value]| -> Result<Vec<Value>, Trap> {
                match args {
                    [Value::I32(x)] => Ok(vec![Value::I32(x.wrapping_add(1))]),
                    _ => Err(Trap::Abort("unreachable".into())),
                }
            },
        );
        CompartmentHandle::new(
            compartment,
            VMFunction::new("add_one", ([Type::I32], [Type::I32]).into(), host),
        )
    }

    #[test]
    fn call_checks_arguments() {
        let mut compartment = Compartment::new();
        let func = add_one(&mut compartment);

        assert_eq!(
            func.call(&mut compartment, None, &[Value::I32(41)]).unwrap(),
            vec![Value::I32(42)]
        );
        assert!(matches!(
            func.call(&mut compartment, None, &[Value::I64(41)]),
            Err(Trap::BadSignature { .. })
        ));
    }

    #[test]
    fn caller_memory_is_optional() {
        let mut compartment = Compartment::new();
        let host: HostFunction = Arc::new(|caller: &mut Caller<'_>, _args: &[Value]| -> Result<Vec<Value>, Trap> {
            caller.memory()?.write(0, &[9])?;
            Ok(vec![])
        });
        let func = CompartmentHandle::new(
            &mut compartment,
            VMFunction::new("poke", FunctionType::new(vec![], vec![]), host),
        );

        assert_eq!(func.call(&mut compartment, None, &[]), Err(Trap::NoMemory));

        let memory = CompartmentHandle::new(
            &mut compartment,
            VMMemory::new(&MemoryType::new(1, None, false)).unwrap(),
        );
        func.call(&mut compartment, Some(memory), &[]).unwrap();
        let mut buf = [0];
        memory.get(&compartment).read(0, &mut buf).unwrap();
        assert_eq!(buf, [9]);
    }
}
