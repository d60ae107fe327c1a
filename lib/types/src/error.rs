//! The errors reported while translating, instantiating and linking modules.
use crate::{ExternType, Pages};
use thiserror::Error;

/// Error type describing things that can go wrong when operating on Wasm Memories.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MemoryError {
    /// The operation would cause the size of the memory to exceed the maximum or would cause
    /// an overflow leading to unindexable memory.
    #[error("The memory could not grow: current size {} pages, requested increase: {} pages", current.0, attempted_delta.0)]
    CouldNotGrow {
        /// The current size in pages.
        current: Pages,
        /// The attempted amount to grow by in pages.
        attempted_delta: Pages,
    },
    /// Caller asked for more minimum memory than the maximum it declared.
    #[error("The minimum requested ({} pages) memory is greater than the maximum allowed memory ({} pages)", min_requested.0, max_allowed.0)]
    MinimumMemoryTooLarge {
        /// The number of pages requested as the minimum amount of memory.
        min_requested: Pages,
        /// The maximum amount of memory we can allocate.
        max_allowed: Pages,
    },
    /// An access fell outside of the committed size of the memory.
    #[error("out of bounds memory access at offset {offset} (length {len}), memory size is {size} bytes")]
    OutOfBounds {
        /// Byte offset of the access.
        offset: usize,
        /// Length of the access in bytes.
        len: usize,
        /// Current size of the memory in bytes.
        size: usize,
    },
}

/// Error type describing things that can go wrong when operating on tables.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableError {
    /// The declared minimum is larger than the declared maximum.
    #[error("table minimum ({minimum}) is greater than its maximum ({maximum})")]
    MinimumTooLarge {
        /// Declared minimum.
        minimum: u32,
        /// Declared maximum.
        maximum: u32,
    },
    /// An element index was outside of the table.
    #[error("table index {index} is out of bounds for a table of {size} elements")]
    OutOfBounds {
        /// The offending index.
        index: u32,
        /// The current table size.
        size: u32,
    },
    /// Growing would exceed the maximum of the table.
    #[error("the table could not grow from {current} by {delta} elements")]
    CouldNotGrow {
        /// Current size.
        current: u32,
        /// Requested delta.
        delta: u32,
    },
}

/// The WebAssembly.CompileError object indicates an error during
/// WebAssembly decoding or validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A Wasm translation error occured.
    #[error("WebAssembly translation error: {0}")]
    Wasm(String),

    /// The module did not pass validation.
    #[error("Validation error: {0}")]
    Validate(String),

    /// The module uses a feature the linker doesn't support.
    #[error("Feature {0} is not yet supported")]
    UnsupportedFeature(String),
}

/// An error resolving a single import.
///
/// Every variant names the offending `module.name` pair so the failure can be
/// diagnosed without access to the module's source. Failures are per-import:
/// reporting one never aborts the linking of the others.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The import names a module that none of the active intrinsic
    /// collections answer to.
    #[error("unrecognised module \"{module}\" for import {module}.{name}")]
    UnrecognizedModuleName {
        /// Module name of the import.
        module: String,
        /// Field name of the import.
        name: String,
    },

    /// The selected collection has no export with that name.
    #[error("missing import {module}.{name} {expected}")]
    MissingImport {
        /// Module name of the import.
        module: String,
        /// Field name of the import.
        name: String,
        /// The declared type of the import.
        expected: ExternType,
    },

    /// An export of that name exists but its runtime type is incompatible
    /// with the declared one.
    #[error("resolved import {module}.{name} to a {actual}, but was expecting {expected}")]
    TypeMismatch {
        /// Module name of the import.
        module: String,
        /// Field name of the import.
        name: String,
        /// The declared type of the import.
        expected: ExternType,
        /// The type of the export that was found.
        actual: ExternType,
    },

    /// The resolver has not been set up yet, or was already cleaned up.
    #[error("the resolver has no environment to resolve {module}.{name} against")]
    NotReady {
        /// Module name of the import.
        module: String,
        /// Field name of the import.
        name: String,
    },

    /// The resolver was asked to resolve against a compartment other than
    /// the one its environment lives in.
    #[error("import {module}.{name} was resolved against a foreign compartment")]
    CompartmentMismatch {
        /// Module name of the import.
        module: String,
        /// Field name of the import.
        name: String,
    },
}

impl ResolveError {
    /// The `(module, name)` pair of the failed import.
    pub fn import(&self) -> (&str, &str) {
        match self {
            Self::UnrecognizedModuleName { module, name }
            | Self::MissingImport { module, name, .. }
            | Self::TypeMismatch { module, name, .. }
            | Self::NotReady { module, name }
            | Self::CompartmentMismatch { module, name } => (module, name),
        }
    }
}
