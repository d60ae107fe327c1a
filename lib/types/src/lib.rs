//! These are the common types shared by the sandbox linker crates.
//!
//! This crate provides the value and extern type model, the compatibility
//! rules applied when an import is bound, page/byte units, the declared
//! module form and the error enums reported while linking.

#![deny(missing_docs, unused_extern_crates)]
#![warn(unused_import_braces)]
#![cfg_attr(
    feature = "cargo-clippy",
    warn(
        clippy::float_arithmetic,
        clippy::mut_mut,
        clippy::nonminimal_bool,
        clippy::map_unwrap_or,
        clippy::print_stdout,
        clippy::unicode_not_nfc,
        clippy::use_self
    )
)]

pub mod error;
mod compartment_id;
mod module;
mod types;
mod units;
mod values;

pub use crate::compartment_id::CompartmentId;
pub use crate::error::{CompileError, MemoryError, ResolveError, TableError};
pub use crate::module::ModuleInfo;
pub use crate::types::{
    ExportType, ExternKind, ExternType, FunctionType, GlobalType, ImportType, MemoryType,
    Mutability, TableType, Type,
};
pub use crate::units::{Bytes, Pages, WASM_PAGE_SIZE};
pub use crate::values::Value;

/// Version number of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
