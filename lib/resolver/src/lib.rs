//! Import resolution for sandboxed WebAssembly modules.
//!
//! [`RootResolver`] decides which host intrinsics a module may link
//! against, based on the toolchain that produced it, and checks every
//! import against what it resolves to. [`translate_module`] produces the
//! declared module form it works on.

#![deny(missing_docs, trivial_numeric_casts, unused_extern_crates)]
#![warn(unused_import_braces)]
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

pub mod config;
mod environment;
mod error;
pub mod limits;
mod mutable_globals;
mod resolver;
mod toolchain;
mod translator;

pub use crate::config::{ConfigError, EmscriptenLimits, ResolverConfig, StandardLimits};
pub use crate::environment::{Environment, IntrinsicNamespace};
pub use crate::error::{LinkError, RequiredSection, SetupError};
pub use crate::limits::configure_limits;
pub use crate::mutable_globals::{patch_mutable_globals, IoStreamHandle, MutableGlobals};
pub use crate::resolver::{LinkedModule, ResolverState, RootResolver};
pub use crate::toolchain::{defines_own_memory, Toolchain};
pub use crate::translator::translate_module;

pub use sandbox_linker_types::{CompileError, ResolveError};

/// Version number of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
