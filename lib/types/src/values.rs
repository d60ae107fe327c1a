use crate::types::Type;
use std::fmt;

/// Possible runtime values that a WebAssembly global can hold, or that a
/// host function can receive and return.
#[derive(Clone, Copy, PartialEq)]
pub enum Value {
    /// A 32-bit integer.
    I32(i32),
    /// A 64-bit integer.
    I64(i64),
    /// A 32-bit float.
    F32(f32),
    /// A 64-bit float.
    F64(f64),
    /// A 128-bit number
    V128(u128),
}

impl Value {
    /// Returns the corresponding [`Type`] for this value.
    pub fn ty(&self) -> Type {
        match self {
            Self::I32(_) => Type::I32,
            Self::I64(_) => Type::I64,
            Self::F32(_) => Type::F32,
            Self::F64(_) => Type::F64,
            Self::V128(_) => Type::V128,
        }
    }

    /// The zero value of `ty`, or `None` for reference types which have no
    /// scalar representation here.
    pub fn zero(ty: Type) -> Option<Self> {
        match ty {
            Type::I32 => Some(Self::I32(0)),
            Type::I64 => Some(Self::I64(0)),
            Type::F32 => Some(Self::F32(0.0)),
            Type::F64 => Some(Self::F64(0.0)),
            Type::V128 => Some(Self::V128(0)),
            Type::ExternRef | Type::FuncRef => None,
        }
    }

    /// Attempt to access the underlying value of this `Value` as an `i32`.
    pub fn i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempt to access the underlying value of this `Value` as an `f64`.
    pub fn f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "I32({v:?})"),
            Self::I64(v) => write!(f, "I64({v:?})"),
            Self::F32(v) => write!(f, "F32({v:?})"),
            Self::F64(v) => write!(f, "F64({v:?})"),
            Self::V128(v) => write!(f, "V128({v:?})"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::V128(v) => write!(f, "{v}"),
        }
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Self::I32(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Self::I64(val)
    }
}

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Self::F32(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Self::F64(val)
    }
}
