use crate::{address, unexpected_arguments};
use byteorder::{ByteOrder, LittleEndian};
use sandbox_linker_types::Value;
use sandbox_linker_vm::{Caller, Trap};

/// emscripten: abort
pub fn abort(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::I32(code)] = args else {
        return Err(unexpected_arguments("abort", args));
    };
    tracing::debug!(code, "emscripten::abort");
    Err(Trap::Abort(format!("abort({code})")))
}

/// emscripten: abortStackOverflow
pub fn abort_stack_overflow(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::I32(allocation)] = args else {
        return Err(unexpected_arguments("abortStackOverflow", args));
    };
    tracing::debug!(allocation, "emscripten::abortStackOverflow");
    Err(Trap::Abort(format!(
        "stack overflow while allocating {allocation} bytes"
    )))
}

/// emscripten: enlargeMemory
///
/// The legacy memory is created at its final size, so this always fails.
pub fn enlarge_memory(_caller: &mut Caller<'_>, _args: &[Value]) -> Result<Vec<Value>, Trap> {
    tracing::debug!("emscripten::enlargeMemory");
    Ok(vec![Value::I32(0)])
}

/// emscripten: getTotalMemory
pub fn get_total_memory(caller: &mut Caller<'_>, _args: &[Value]) -> Result<Vec<Value>, Trap> {
    let total = caller.memory()?.data_size();
    tracing::debug!(total, "emscripten::getTotalMemory");
    Ok(vec![Value::I32(i32::try_from(total).unwrap_or(i32::MAX))])
}

/// emscripten: abortOnCannotGrowMemory
pub fn abort_on_cannot_grow_memory(
    _caller: &mut Caller<'_>,
    _args: &[Value],
) -> Result<Vec<Value>, Trap> {
    tracing::debug!("emscripten::abortOnCannotGrowMemory");
    Err(Trap::Abort("Cannot enlarge memory arrays!".to_string()))
}

/// emscripten: ___setErrNo
///
/// Stores `errno` where the guest said it keeps it. Until it has, the value
/// is dropped.
pub fn set_errno(caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::I32(value)] = args else {
        return Err(unexpected_arguments("___setErrNo", args));
    };
    match caller.compartment().errno_location() {
        Some(location) => {
            tracing::debug!(value, location, "emscripten::___setErrNo");
            let mut bytes = [0; 4];
            LittleEndian::write_i32(&mut bytes, value);
            caller.memory()?.write(location as usize, &bytes)?;
        }
        None => tracing::debug!(value, "emscripten::___setErrNo without an errno location"),
    }
    Ok(vec![Value::I32(value)])
}

/// emscripten: ___errno_location
pub fn errno_location(caller: &mut Caller<'_>, _args: &[Value]) -> Result<Vec<Value>, Trap> {
    let location = caller.compartment().errno_location().unwrap_or(0);
    tracing::debug!(location, "emscripten::___errno_location");
    Ok(vec![Value::I32(location as i32)])
}

/// emscripten: ___lock
pub fn lock(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    tracing::debug!(?args, "emscripten::___lock");
    Ok(vec![])
}

/// emscripten: ___unlock
pub fn unlock(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    tracing::debug!(?args, "emscripten::___unlock");
    Ok(vec![])
}

/// emscripten: _emscripten_memcpy_big
pub fn emscripten_memcpy_big(caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::I32(dest), Value::I32(src), Value::I32(len)] = args else {
        return Err(unexpected_arguments("_emscripten_memcpy_big", args));
    };
    tracing::debug!(dest, src, len, "emscripten::_emscripten_memcpy_big");
    caller
        .memory()?
        .copy_within(address(src), address(dest), address(len))?;
    Ok(vec![Value::I32(dest)])
}

#[cfg(test)]
mod tests {
    use crate::{emscripten, test_utils::Harness, LegacyLayout};
    use pretty_assertions::assert_eq;
    use sandbox_linker_types::{Value, WASM_PAGE_SIZE};
    use sandbox_linker_vm::Trap;

    fn harness() -> Harness {
        Harness::new(&emscripten::env(&LegacyLayout::default()))
    }

    #[test]
    fn set_errno_writes_to_the_errno_location() {
        let mut harness = harness();
        assert_eq!(
            harness.call("___errno_location", &[]).unwrap(),
            vec![Value::I32(0)]
        );
        assert_eq!(
            harness.call("___setErrNo", &[Value::I32(22)]).unwrap(),
            vec![Value::I32(22)]
        );
        let mut bytes = [0; 4];
        harness.memory().read(0, &mut bytes).unwrap();
        assert_eq!(bytes, [0; 4]);

        harness.compartment.set_errno_location(128);
        assert_eq!(
            harness.call("___errno_location", &[]).unwrap(),
            vec![Value::I32(128)]
        );
        harness.call("___setErrNo", &[Value::I32(22)]).unwrap();
        harness.memory().read(128, &mut bytes).unwrap();
        assert_eq!(i32::from_le_bytes(bytes), 22);
    }

    #[test]
    fn memory_size_queries() {
        let mut harness = harness();
        assert_eq!(
            harness.call("getTotalMemory", &[]).unwrap(),
            vec![Value::I32(WASM_PAGE_SIZE as i32)]
        );
        assert_eq!(
            harness.call("enlargeMemory", &[]).unwrap(),
            vec![Value::I32(0)]
        );
        assert_eq!(
            harness.call("abortOnCannotGrowMemory", &[]),
            Err(Trap::Abort("Cannot enlarge memory arrays!".to_string()))
        );
    }

    #[test]
    fn memcpy_big_copies() {
        let mut harness = harness();
        harness.memory().write(0, &[1, 2, 3, 4]).unwrap();
        harness
            .call(
                "_emscripten_memcpy_big",
                &[Value::I32(100), Value::I32(0), Value::I32(4)],
            )
            .unwrap();
        let mut bytes = [0; 4];
        harness.memory().read(100, &mut bytes).unwrap();
        assert_eq!(bytes, [1, 2, 3, 4]);
    }

    #[test]
    fn locks_are_no_ops() {
        let mut harness = harness();
        assert_eq!(harness.call("___lock", &[Value::I32(1)]).unwrap(), Vec::<Value>::new());
        assert_eq!(harness.call("___unlock", &[Value::I32(1)]).unwrap(), Vec::<Value>::new());
    }
}
