//! Runtime objects for the sandbox linker.
//!
//! Everything an import can resolve to lives in a [`Compartment`] and is
//! referred to through a typed [`CompartmentHandle`].

#![deny(missing_docs, trivial_numeric_casts, unused_extern_crates)]
#![warn(unused_import_braces)]
#![cfg_attr(
    feature = "cargo-clippy",
    allow(clippy::new_without_default, clippy::len_without_is_empty)
)]
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

mod r#extern;
mod function;
mod global;
mod instance;
mod memory;
mod store;
mod table;
mod trap;

pub use crate::r#extern::Extern;
pub use crate::function::{Caller, HostFunction, VMFunction};
pub use crate::global::{GlobalError, VMGlobal};
pub use crate::instance::VMInstance;
pub use crate::memory::VMMemory;
pub use crate::store::{Compartment, CompartmentHandle, CompartmentObject};
pub use crate::table::VMTable;
pub use crate::trap::Trap;

/// Handle to a host function.
pub type FunctionHandle = CompartmentHandle<VMFunction>;
/// Handle to a global.
pub type GlobalHandle = CompartmentHandle<VMGlobal>;
/// Handle to a table.
pub type TableHandle = CompartmentHandle<VMTable>;
/// Handle to a linear memory.
pub type MemoryHandle = CompartmentHandle<VMMemory>;
/// Handle to an instance.
pub type InstanceHandle = CompartmentHandle<VMInstance>;

/// Version number of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
