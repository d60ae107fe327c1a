//! Import resolution and environment bootstrap for WebAssembly modules run
//! inside isolated compartments.
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sandbox_linker::{translate_module, Compartment, RootResolver};
//!
//! let module = translate_module(
//!     br#"(module
//!           (import "env" "memcpy" (func (param i32 i32 i32) (result i32)))
//!           (memory 1))"#,
//! )?;
//!
//! let mut compartment = Compartment::new();
//! let mut resolver = RootResolver::new();
//! let linked = resolver.link_module(&mut compartment, &module)?;
//! assert_eq!(linked.imports.len(), 1);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs, unused_extern_crates)]

pub use sandbox_linker_intrinsics::{
    self as intrinsics, DefaultIntrinsics, IntrinsicModule, IntrinsicProvider, LegacyLayout, EINVAL,
    EMSCRIPTEN_STACKTOP, EMSCRIPTEN_STACK_MAX, MUTABLE_GLOBALS_ADDRESS,
};
pub use sandbox_linker_resolver::*;
pub use sandbox_linker_types::{
    self as types, ExportType, ExternType, FunctionType, GlobalType, ImportType, MemoryType,
    ModuleInfo, Mutability, Pages, TableType, Type, Value,
};
pub use sandbox_linker_vm::{self as vm, Compartment, Extern, Trap, VMInstance, VMMemory};
