use sandbox_linker_types::{GlobalType, Mutability, Type, Value};
use thiserror::Error;

/// Errors raised when a global is created or written with the wrong value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlobalError {
    /// The value does not have the global's declared type.
    #[error("global of type {expected} cannot hold a value of type {given}")]
    TypeMismatch {
        /// The declared type of the global.
        expected: Type,
        /// The type of the offending value.
        given: Type,
    },
    /// The global is constant.
    #[error("cannot set a constant global")]
    Immutable,
}

/// A global instance.
#[derive(Debug, Clone)]
pub struct VMGlobal {
    ty: GlobalType,
    value: Value,
}

impl VMGlobal {
    /// Create a new global holding `value`.
    pub fn new(ty: GlobalType, value: Value) -> Result<Self, GlobalError> {
        if value.ty() != ty.ty {
            return Err(GlobalError::TypeMismatch {
                expected: ty.ty,
                given: value.ty(),
            });
        }
        Ok(Self { ty, value })
    }

    /// Create a global whose type is taken from `value`.
    pub fn from_value(value: Value, mutability: Mutability) -> Self {
        Self {
            ty: GlobalType::new(value.ty(), mutability),
            value,
        }
    }

    /// Get the type of the global.
    pub fn ty(&self) -> GlobalType {
        self.ty
    }

    /// Get the current value.
    pub fn get(&self) -> Value {
        self.value
    }

    /// Overwrite the value of a mutable global.
    pub fn set(&mut self, value: Value) -> Result<(), GlobalError> {
        if !self.ty.mutability.is_mutable() {
            return Err(GlobalError::Immutable);
        }
        if value.ty() != self.ty.ty {
            return Err(GlobalError::TypeMismatch {
                expected: self.ty.ty,
                given: value.ty(),
            });
        }
        self.value = value;
        Ok(())
    }
}
