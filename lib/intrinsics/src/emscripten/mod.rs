//! Intrinsics for modules built by the legacy Emscripten toolchain.
//!
//! Such modules import from three namespaces: `env` for the C runtime,
//! `asm2wasm` for the operations asm.js could not express directly, and
//! `global` (also reachable as `global.Math`) for JavaScript's math
//! builtins.

mod asm2wasm;
mod env;
mod math;

pub use self::asm2wasm::{
    debugger, f64_rem, f64_to_int, i32s_div, i32s_rem, i32u_div, i32u_rem,
};
pub use self::env::{
    abort, abort_on_cannot_grow_memory, abort_stack_overflow, emscripten_memcpy_big,
    enlarge_memory, errno_location, get_total_memory, lock, set_errno, unlock,
};
pub use self::math::{abs, ceil, exp, floor, llvm_log10_f64, llvm_log2_f64, log, pow, sqrt};

use crate::{EINVAL, IntrinsicModule, LegacyLayout, MutableGlobals};
use sandbox_linker_types::{
    Mutability::Const,
    Type::{F64, I32},
};

/// Builds the legacy `env` collection for `layout`.
///
/// The pointer globals hold the addresses of the matching fields of the
/// [`MutableGlobals`] block, not their values.
pub fn env(layout: &LegacyLayout) -> IntrinsicModule {
    let field = |offset| layout.mutable_global(offset) as i32;

    IntrinsicModule::new("env")
        .global("STACKTOP", layout.stack_top as i32, Const)
        .global("STACK_MAX", layout.stack_max as i32, Const)
        .global("DYNAMICTOP_PTR", field(MutableGlobals::DYNAMICTOP_PTR), Const)
        .global("tempDoublePtr", field(MutableGlobals::TEMP_DOUBLE_PTR), Const)
        .global("_stderr", field(MutableGlobals::STDERR), Const)
        .global("_stdin", field(MutableGlobals::STDIN), Const)
        .global("_stdout", field(MutableGlobals::STDOUT), Const)
        .global("tableBase", 0i32, Const)
        .global("memoryBase", 0i32, Const)
        .global("ABORT", 0i32, Const)
        .global("EINVAL", EINVAL, Const)
        .function("abort", &[I32], &[], abort)
        .function("abortStackOverflow", &[I32], &[], abort_stack_overflow)
        .function("enlargeMemory", &[], &[I32], enlarge_memory)
        .function("getTotalMemory", &[], &[I32], get_total_memory)
        .function("abortOnCannotGrowMemory", &[], &[I32], abort_on_cannot_grow_memory)
        .function("___setErrNo", &[I32], &[I32], set_errno)
        .function("___errno_location", &[], &[I32], errno_location)
        .function("___lock", &[I32], &[], lock)
        .function("___unlock", &[I32], &[], unlock)
        .function("_emscripten_memcpy_big", &[I32, I32, I32], &[I32], emscripten_memcpy_big)
        .function("_llvm_log10_f64", &[F64], &[F64], llvm_log10_f64)
        .function("_llvm_log2_f64", &[F64], &[F64], llvm_log2_f64)
}

/// Builds the `asm2wasm` collection.
pub fn asm2wasm() -> IntrinsicModule {
    IntrinsicModule::new("asm2wasm")
        .function("f64-rem", &[F64, F64], &[F64], f64_rem)
        .function("f64-to-int", &[F64], &[I32], f64_to_int)
        .function("i32s-div", &[I32, I32], &[I32], i32s_div)
        .function("i32u-div", &[I32, I32], &[I32], i32u_div)
        .function("i32s-rem", &[I32, I32], &[I32], i32s_rem)
        .function("i32u-rem", &[I32, I32], &[I32], i32u_rem)
        .function("debugger", &[], &[], debugger)
}

/// Builds the `global` collection, also imported as `global.Math`.
pub fn global() -> IntrinsicModule {
    IntrinsicModule::new("global")
        .global("NaN", f64::NAN, Const)
        .global("Infinity", f64::INFINITY, Const)
        .function("pow", &[F64, F64], &[F64], pow)
        .function("exp", &[F64], &[F64], exp)
        .function("log", &[F64], &[F64], log)
        .function("sqrt", &[F64], &[F64], sqrt)
        .function("floor", &[F64], &[F64], floor)
        .function("ceil", &[F64], &[F64], ceil)
        .function("abs", &[F64], &[F64], abs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::Harness;
    use pretty_assertions::assert_eq;
    use sandbox_linker_types::Value;

    #[test]
    fn env_globals_point_into_the_mutable_globals_block() {
        let layout = LegacyLayout::default();
        let harness = Harness::new(&env(&layout));
        let base = crate::MUTABLE_GLOBALS_ADDRESS as i32;

        assert_eq!(harness.global("STACKTOP"), Value::I32(64 * 65536));
        assert_eq!(harness.global("STACK_MAX"), Value::I32(256 * 65536));
        assert_eq!(harness.global("DYNAMICTOP_PTR"), Value::I32(base));
        assert_eq!(harness.global("tempDoublePtr"), Value::I32(base + 8));
        assert_eq!(harness.global("_stderr"), Value::I32(base + 16));
        assert_eq!(harness.global("_stdin"), Value::I32(base + 20));
        assert_eq!(harness.global("_stdout"), Value::I32(base + 24));
        assert_eq!(harness.global("EINVAL"), Value::I32(22));
    }

    #[test]
    fn env_follows_a_custom_layout() {
        let layout = LegacyLayout {
            stack_top: 1024,
            stack_max: 2048,
            mutable_globals_address: 512,
        };
        let harness = Harness::new(&env(&layout));
        assert_eq!(harness.global("STACKTOP"), Value::I32(1024));
        assert_eq!(harness.global("_stdin"), Value::I32(532));
    }

    #[test]
    fn collections_have_the_expected_exports() {
        let asm2wasm = asm2wasm();
        assert!(asm2wasm.contains("f64-rem"));
        assert!(asm2wasm.contains("i32u-rem"));
        assert_eq!(asm2wasm.len(), 7);

        let global = global();
        assert!(global.contains("NaN"));
        assert!(global.contains("Infinity"));
        assert!(global.contains("pow"));
    }
}
