use sandbox_linker_types::{FunctionType, MemoryError, TableError, Type};
use thiserror::Error;

/// A trap raised while running a host function on behalf of sandboxed code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Trap {
    /// The guest (or the host on its behalf) aborted execution.
    #[error("abort: {0}")]
    Abort(String),
    /// A memory access was out of bounds.
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// A table access was out of bounds.
    #[error(transparent)]
    Table(#[from] TableError),
    /// The function needs a linear memory but was called without one.
    #[error("function requires a linear memory but none was provided")]
    NoMemory,
    /// Arguments or results did not match the function's signature.
    #[error("signature mismatch: expected {expected}, got {given:?}")]
    BadSignature {
        /// The declared signature.
        expected: FunctionType,
        /// The types that were actually passed or returned.
        given: Vec<Type>,
    },
}
