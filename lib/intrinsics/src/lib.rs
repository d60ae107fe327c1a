//! Host-provided intrinsic modules for the sandbox linker.
//!
//! A module resolves its imports against one of two families of
//! collections:
//!
//! * [`IntrinsicProvider::standard_env`] for modules that define their own
//!   memory,
//! * [`IntrinsicProvider::legacy_env`], [`IntrinsicProvider::legacy_asm2wasm`]
//!   and [`IntrinsicProvider::legacy_global`] for modules built by the
//!   legacy Emscripten toolchain, which import their memory and table.

#![deny(missing_docs, trivial_numeric_casts, unused_extern_crates)]
#![warn(unused_import_braces)]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::len_without_is_empty))]
#![cfg_attr(
    feature = "cargo-clippy",
    warn(
        clippy::mut_mut,
        clippy::nonminimal_bool,
        clippy::map_unwrap_or,
        clippy::print_stdout,
        clippy::unicode_not_nfc,
        clippy::use_self
    )
)]

pub mod emscripten;
pub mod layout;
mod module;
mod provider;
pub mod standard;

pub use crate::layout::{
    IoStreamHandle, LegacyLayout, MutableGlobals, EINVAL, EMSCRIPTEN_STACKTOP,
    EMSCRIPTEN_STACK_MAX, MUTABLE_GLOBALS_ADDRESS,
};
pub use crate::module::IntrinsicModule;
pub use crate::provider::{DefaultIntrinsics, IntrinsicProvider};

use sandbox_linker_types::Value;
use sandbox_linker_vm::Trap;

/// Version number of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Guest pointers and lengths are unsigned 32-bit values passed as `i32`.
fn address(value: i32) -> usize {
    value as u32 as usize
}

/// Arguments are checked against the signature before a host function
/// runs, so this only fires when a function is registered with the wrong
/// signature.
fn unexpected_arguments(name: &str, args: &[Value]) -> Trap {
    Trap::Abort(format!("{name} called with unexpected arguments {args:?}"))
}
