use anyhow::Result;
use pretty_assertions::assert_eq;
use sandbox_linker::limits::{
    EMSCRIPTEN_MAX_TABLE_ELEMS, EMSCRIPTEN_MIN_TABLE_ELEMS, INITIAL_EMSCRIPTEN_PAGES,
    MAX_EMSCRIPTEN_PAGES,
};
use sandbox_linker::{
    translate_module, Compartment, Extern, ExternType, IoStreamHandle, MemoryType,
    MutableGlobals, ResolverConfig, RootResolver, SetupError, TableType, Type, Value,
    EMSCRIPTEN_STACK_MAX, MUTABLE_GLOBALS_ADDRESS,
};

const LEGACY: &[u8] = br#"(module
    (import "env" "memory" (memory 256 256))
    (import "env" "table" (table 10 10 funcref))
    (import "env" "DYNAMICTOP_PTR" (global i32))
    (import "env" "STACKTOP" (global i32))
    (import "env" "EINVAL" (global i32))
    (import "env" "___setErrNo" (func (param i32) (result i32)))
    (import "asm2wasm" "i32s-div" (func (param i32 i32) (result i32)))
    (import "asm2wasm" "f64-to-int" (func (param f64) (result i32)))
    (import "global" "NaN" (global f64))
    (import "global.Math" "pow" (func (param f64 f64) (result f64))))"#;

fn global(compartment: &Compartment, export: Extern) -> Value {
    let Extern::Global(global) = export else {
        panic!("expected a global, got {export:?}");
    };
    global.get(compartment).get()
}

#[test_log::test]
fn legacy_module_links() -> Result<()> {
    let module = translate_module(LEGACY)?;
    let mut compartment = Compartment::new();
    let mut resolver = RootResolver::new();
    let linked = resolver.link_module(&mut compartment, &module)?;
    assert!(resolver.is_emscripten());

    assert_eq!(linked.module.imports.len(), linked.imports.len());

    let env = resolver.environment().expect("resolver is set up");
    assert_eq!(linked.imports[0], Extern::Memory(env.memory().expect("legacy memory")));
    assert_eq!(linked.imports[1], Extern::Table(env.table().expect("legacy table")));

    assert_eq!(
        global(&compartment, linked.imports[2]),
        Value::I32(MUTABLE_GLOBALS_ADDRESS as i32)
    );
    assert_eq!(global(&compartment, linked.imports[4]), Value::I32(22));

    let Value::F64(nan) = global(&compartment, linked.imports[8]) else {
        panic!("global.NaN is an f64");
    };
    assert!(nan.is_nan());

    let Extern::Function(divide) = linked.imports[6] else {
        panic!("asm2wasm.i32s-div is a function");
    };
    let memory = env.memory();
    assert_eq!(
        divide.call(&mut compartment, memory, &[Value::I32(7), Value::I32(0)])?,
        vec![Value::I32(0)]
    );
    assert_eq!(
        divide.call(&mut compartment, memory, &[Value::I32(-7), Value::I32(2)])?,
        vec![Value::I32(-3)]
    );
    Ok(())
}

#[test_log::test]
fn legacy_limits_are_applied() -> Result<()> {
    let module = translate_module(LEGACY)?;
    let mut compartment = Compartment::new();
    let mut resolver = RootResolver::new();
    let configured = resolver.set_up(&mut compartment, &module)?;

    assert_eq!(
        configured.imports[0].ty(),
        &ExternType::Memory(MemoryType::new(
            INITIAL_EMSCRIPTEN_PAGES,
            Some(MAX_EMSCRIPTEN_PAGES),
            false
        ))
    );
    assert_eq!(
        configured.imports[1].ty(),
        &ExternType::Table(TableType::new(
            Type::FuncRef,
            EMSCRIPTEN_MIN_TABLE_ELEMS,
            Some(EMSCRIPTEN_MAX_TABLE_ELEMS)
        ))
    );
    Ok(())
}

#[test_log::test]
fn mutable_globals_are_patched() -> Result<()> {
    let module = translate_module(LEGACY)?;
    let mut compartment = Compartment::new();
    let mut resolver = RootResolver::new();
    resolver.set_up(&mut compartment, &module)?;

    let memory = resolver
        .environment()
        .and_then(|env| env.memory())
        .expect("legacy modules get a memory");
    let globals = MutableGlobals::read_from(memory.get(&compartment), MUTABLE_GLOBALS_ADDRESS)?;
    assert_eq!(globals.dynamictop_ptr, EMSCRIPTEN_STACK_MAX);
    assert_eq!(globals.stderr, IoStreamHandle::StdErr as i32);
    assert_eq!(globals.stdin, IoStreamHandle::StdIn as i32);
    assert_eq!(globals.stdout, IoStreamHandle::StdOut as i32);

    // Only the globals block has been committed.
    assert_eq!(
        memory.get(&compartment).committed_bytes(),
        MUTABLE_GLOBALS_ADDRESS as usize + MutableGlobals::SIZE
    );
    Ok(())
}

#[test_log::test]
fn set_errno_writes_to_the_registered_location() -> Result<()> {
    let module = translate_module(LEGACY)?;
    let mut compartment = Compartment::new();
    let mut resolver = RootResolver::new();
    let linked = resolver.link_module(&mut compartment, &module)?;
    let memory = resolver.environment().and_then(|env| env.memory());

    let Extern::Function(set_errno) = linked.imports[5] else {
        panic!("___setErrNo is a function");
    };
    compartment.set_errno_location(1024);
    assert_eq!(
        set_errno.call(&mut compartment, memory, &[Value::I32(22)])?,
        vec![Value::I32(22)]
    );

    let mut errno = [0u8; 4];
    memory
        .expect("legacy memory")
        .get(&compartment)
        .read(1024, &mut errno)?;
    assert_eq!(i32::from_le_bytes(errno), 22);
    Ok(())
}

#[test_log::test]
fn legacy_modules_need_an_imported_table() -> Result<()> {
    let module = translate_module(br#"(module (import "env" "memory" (memory 256)))"#)?;
    let mut resolver = RootResolver::new();
    let error = resolver
        .set_up(&mut Compartment::new(), &module)
        .unwrap_err();
    assert!(matches!(error, SetupError::MissingRequiredSection { .. }));
    Ok(())
}

#[test_log::test]
fn configured_layout_moves_the_globals() -> Result<()> {
    let config = ResolverConfig::from_toml_str(
        r#"
        [emscripten]
        mutable_globals_address = 65536
        "#,
    )?;
    let module = translate_module(LEGACY)?;
    let mut compartment = Compartment::new();
    let mut resolver = RootResolver::with_config(config);
    let linked = resolver.link_module(&mut compartment, &module)?;

    assert_eq!(global(&compartment, linked.imports[2]), Value::I32(65536));
    let memory = resolver
        .environment()
        .and_then(|env| env.memory())
        .expect("legacy memory");
    let globals = MutableGlobals::read_from(memory.get(&compartment), 65536)?;
    assert_eq!(globals.dynamictop_ptr, EMSCRIPTEN_STACK_MAX);
    Ok(())
}
