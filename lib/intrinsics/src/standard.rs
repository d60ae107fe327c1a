//! The `env` module offered to modules built by a standard toolchain.
//!
//! These modules define their own memory and need very little from the
//! host: the memory primitives the compiler lowers to libcalls, and a way
//! to abort.

use crate::{address, unexpected_arguments, IntrinsicModule};
use sandbox_linker_types::{Type::I32, Value};
use sandbox_linker_vm::{Caller, Trap};

/// Builds the standard `env` collection.
pub fn env() -> IntrinsicModule {
    IntrinsicModule::new("env")
        .function("memcpy", &[I32, I32, I32], &[I32], memcpy)
        .function("memmove", &[I32, I32, I32], &[I32], memmove)
        .function("memset", &[I32, I32, I32], &[I32], memset)
        .function("abort", &[], &[], abort)
}

/// env: memcpy
pub fn memcpy(caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::I32(dest), Value::I32(src), Value::I32(len)] = args else {
        return Err(unexpected_arguments("memcpy", args));
    };
    tracing::debug!(dest, src, len, "env::memcpy");
    caller
        .memory()?
        .copy_within(address(src), address(dest), address(len))?;
    Ok(vec![Value::I32(dest)])
}

/// env: memmove
///
/// [`VMMemory::copy_within`](sandbox_linker_vm::VMMemory::copy_within)
/// already handles overlapping ranges.
pub fn memmove(caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::I32(dest), Value::I32(src), Value::I32(len)] = args else {
        return Err(unexpected_arguments("memmove", args));
    };
    tracing::debug!(dest, src, len, "env::memmove");
    caller
        .memory()?
        .copy_within(address(src), address(dest), address(len))?;
    Ok(vec![Value::I32(dest)])
}

/// env: memset
pub fn memset(caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::I32(dest), Value::I32(value), Value::I32(len)] = args else {
        return Err(unexpected_arguments("memset", args));
    };
    tracing::debug!(dest, value, len, "env::memset");
    caller
        .memory()?
        .fill(address(dest), value as u8, address(len))?;
    Ok(vec![Value::I32(dest)])
}

/// env: abort
pub fn abort(_caller: &mut Caller<'_>, _args: &[Value]) -> Result<Vec<Value>, Trap> {
    tracing::debug!("env::abort");
    Err(Trap::Abort("abort() called".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::Harness;
    use pretty_assertions::assert_eq;
    use sandbox_linker_types::MemoryError;

    #[test]
    fn memory_primitives() {
        let mut harness = Harness::new(&env());
        harness.memory().write(16, b"sandbox").unwrap();

        let dest = harness
            .call("memcpy", &[Value::I32(64), Value::I32(16), Value::I32(7)])
            .unwrap();
        assert_eq!(dest, vec![Value::I32(64)]);

        harness
            .call("memmove", &[Value::I32(66), Value::I32(64), Value::I32(7)])
            .unwrap();
        harness
            .call("memset", &[Value::I32(64), Value::I32(b'-' as i32), Value::I32(2)])
            .unwrap();

        let mut buf = [0; 9];
        harness.memory().read(64, &mut buf).unwrap();
        assert_eq!(&buf, b"--sandbox");
    }

    #[test]
    fn out_of_bounds_copies_trap() {
        let mut harness = Harness::new(&env());
        let result = harness.call("memcpy", &[Value::I32(-1), Value::I32(0), Value::I32(4)]);
        assert!(matches!(
            result,
            Err(Trap::Memory(MemoryError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn abort_traps() {
        let mut harness = Harness::new(&env());
        assert_eq!(
            harness.call("abort", &[]),
            Err(Trap::Abort("abort() called".to_string()))
        );
    }
}
