use crate::units::Pages;
use std::fmt;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

// Value Types

/// A list of all possible value types in WebAssembly.
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Type {
    /// Signed 32 bit integer.
    I32,
    /// Signed 64 bit integer.
    I64,
    /// Floating point 32 bit integer.
    F32,
    /// Floating point 64 bit integer.
    F64,
    /// A 128 bit number.
    V128,
    /// A reference to opaque data in the Wasm instance.
    ExternRef,
    /// A reference to a Wasm function.
    FuncRef,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// External Types

/// The kind of an [`ExternType`], without its descriptor.
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub enum ExternKind {
    /// A function.
    Function,
    /// A global.
    Global,
    /// A table.
    Table,
    /// A linear memory.
    Memory,
}

impl fmt::Display for ExternKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Function => "function",
            Self::Global => "global",
            Self::Table => "table",
            Self::Memory => "memory",
        })
    }
}

/// A list of all possible types which can be externally referenced from a
/// WebAssembly module.
///
/// This list can be found in [`ImportType`] or [`ExportType`], so these types
/// can either be imported or exported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum ExternType {
    /// This external type is the type of a WebAssembly function.
    Function(FunctionType),
    /// This external type is the type of a WebAssembly global.
    Global(GlobalType),
    /// This external type is the type of a WebAssembly table.
    Table(TableType),
    /// This external type is the type of a WebAssembly memory.
    Memory(MemoryType),
}

fn is_global_compatible(exported: GlobalType, imported: GlobalType) -> bool {
    let GlobalType {
        ty: exported_ty,
        mutability: exported_mutability,
    } = exported;
    let GlobalType {
        ty: imported_ty,
        mutability: imported_mutability,
    } = imported;

    exported_ty == imported_ty && imported_mutability == exported_mutability
}

fn is_table_element_type_compatible(exported_type: Type, imported_type: Type) -> bool {
    exported_type == imported_type
}

/// `imported_maximum` bounds the export: an import without a maximum accepts
/// anything, an import with one needs an export that is at least as tight.
fn is_maximum_compatible<T: PartialOrd>(exported: Option<T>, imported: Option<T>) -> bool {
    match (exported, imported) {
        (_, None) => true,
        (Some(exported), Some(imported)) => exported <= imported,
        (None, Some(_)) => false,
    }
}

fn is_table_compatible(
    exported: &TableType,
    imported: &TableType,
    imported_runtime_size: Option<u32>,
) -> bool {
    is_table_element_type_compatible(exported.ty, imported.ty)
        && imported.minimum <= imported_runtime_size.unwrap_or(exported.minimum)
        && is_maximum_compatible(exported.maximum, imported.maximum)
}

fn is_memory_compatible(
    exported: &MemoryType,
    imported: &MemoryType,
    imported_runtime_size: Option<u32>,
) -> bool {
    imported.minimum.0 <= imported_runtime_size.unwrap_or(exported.minimum.0)
        && is_maximum_compatible(exported.maximum, imported.maximum)
        && exported.shared == imported.shared
}

macro_rules! accessors {
    ($(($variant:ident($ty:ty) $get:ident))*) => ($(
        /// Attempt to return the underlying type of this external type,
        /// returning `None` if it is a different type.
        pub fn $get(&self) -> Option<&$ty> {
            if let Self::$variant(e) = self {
                Some(e)
            } else {
                None
            }
        }
    )*)
}

impl ExternType {
    accessors! {
        (Function(FunctionType) func)
        (Global(GlobalType) global)
        (Table(TableType) table)
        (Memory(MemoryType) memory)
    }

    /// Returns the kind of this extern type.
    pub fn kind(&self) -> ExternKind {
        match self {
            Self::Function(_) => ExternKind::Function,
            Self::Global(_) => ExternKind::Global,
            Self::Table(_) => ExternKind::Table,
            Self::Memory(_) => ExternKind::Memory,
        }
    }

    /// Check if `self`, the type of an export, can satisfy an import declared
    /// as `other`.
    ///
    /// `runtime_size` is the current size of the exported table or memory,
    /// which may be larger than its declared minimum.
    pub fn is_compatible_with(&self, other: &Self, runtime_size: Option<u32>) -> bool {
        match (self, other) {
            (Self::Function(a), Self::Function(b)) => a == b,
            (Self::Global(a), Self::Global(b)) => is_global_compatible(*a, *b),
            (Self::Table(a), Self::Table(b)) => is_table_compatible(a, b, runtime_size),
            (Self::Memory(a), Self::Memory(b)) => is_memory_compatible(a, b, runtime_size),
            // The rest of possibilities, are not compatible
            _ => false,
        }
    }
}

impl fmt::Display for ExternType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Function(ty) => write!(f, "{} {ty}", self.kind()),
            Self::Global(ty) => write!(f, "{} {ty}", self.kind()),
            Self::Table(ty) => write!(f, "{} {ty}", self.kind()),
            Self::Memory(ty) => write!(f, "{} {ty}", self.kind()),
        }
    }
}

/// The signature of a function that is either implemented
/// in a Wasm module or exposed to Wasm by the host.
///
/// WebAssembly functions can have 0 or more parameters and results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct FunctionType {
    /// The parameters of the function
    params: Box<[Type]>,
    /// The return values of the function
    results: Box<[Type]>,
}

impl FunctionType {
    /// Creates a new Function Type with the given parameter and return types.
    pub fn new<Params, Returns>(params: Params, returns: Returns) -> Self
    where
        Params: Into<Box<[Type]>>,
        Returns: Into<Box<[Type]>>,
    {
        Self {
            params: params.into(),
            results: returns.into(),
        }
    }

    /// Parameter types.
    pub fn params(&self) -> &[Type] {
        &self.params
    }

    /// Return types.
    pub fn results(&self) -> &[Type] {
        &self.results
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|p| format!("{p:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        let results = self
            .results
            .iter()
            .map(|p| format!("{p:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{params}] -> [{results}]")
    }
}

impl<const N: usize, const M: usize> From<([Type; N], [Type; M])> for FunctionType {
    fn from(pair: ([Type; N], [Type; M])) -> Self {
        Self::new(pair.0, pair.1)
    }
}

/// Indicator of whether a global is mutable or not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Mutability {
    /// The global is constant and its value does not change
    Const,
    /// The value of the global can change over time
    Var,
}

impl Mutability {
    /// Returns a boolean indicating if the enum is set to mutable.
    pub fn is_mutable(self) -> bool {
        self.into()
    }
}

impl From<bool> for Mutability {
    fn from(value: bool) -> Self {
        if value { Self::Var } else { Self::Const }
    }
}

impl From<Mutability> for bool {
    fn from(value: Mutability) -> Self {
        match value {
            Mutability::Var => true,
            Mutability::Const => false,
        }
    }
}

/// A WebAssembly global descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct GlobalType {
    /// The type of the value stored in the global.
    pub ty: Type,
    /// A flag indicating whether the value may change at runtime.
    pub mutability: Mutability,
}

impl GlobalType {
    /// Create a new Global variable
    /// # Usage:
    /// ```
    /// use sandbox_linker_types::{GlobalType, Type, Mutability};
    ///
    /// // An I32 constant global
    /// let global = GlobalType::new(Type::I32, Mutability::Const);
    /// // An I64 mutable global
    /// let global = GlobalType::new(Type::I64, Mutability::Var);
    /// ```
    pub fn new(ty: Type, mutability: Mutability) -> Self {
        Self { ty, mutability }
    }
}

impl fmt::Display for GlobalType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mutability = match self.mutability {
            Mutability::Const => "constant",
            Mutability::Var => "mutable",
        };
        write!(f, "{} ({})", self.ty, mutability)
    }
}

// Table Types

/// A descriptor for a table in a WebAssembly module.
///
/// Tables are contiguous chunks of a specific element, typically a `funcref` or
/// an `externref`. The legacy toolchain leans on huge function tables for its
/// function-pointer emulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct TableType {
    /// The type of data stored in elements of the table.
    pub ty: Type,
    /// The minimum number of elements in the table.
    pub minimum: u32,
    /// The maximum number of elements in the table.
    pub maximum: Option<u32>,
}

impl TableType {
    /// Creates a new table descriptor which will contain the specified
    /// `element` and have the `limits` applied to its length.
    pub fn new(ty: Type, minimum: u32, maximum: Option<u32>) -> Self {
        Self {
            ty,
            minimum,
            maximum,
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(maximum) = self.maximum {
            write!(f, "{} ({}..{})", self.ty, self.minimum, maximum)
        } else {
            write!(f, "{} ({}..)", self.ty, self.minimum)
        }
    }
}

// Memory Types

/// A descriptor for a WebAssembly memory type.
///
/// Memories are described in units of pages (64KB) and represent contiguous
/// chunks of addressable memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct MemoryType {
    /// The minimum number of pages in the memory.
    pub minimum: Pages,
    /// The maximum number of pages in the memory.
    pub maximum: Option<Pages>,
    /// Whether the memory may be shared between multiple threads.
    pub shared: bool,
}

impl MemoryType {
    /// Creates a new descriptor for a WebAssembly memory given the specified
    /// limits of the memory.
    pub fn new<IntoPages>(minimum: IntoPages, maximum: Option<IntoPages>, shared: bool) -> Self
    where
        IntoPages: Into<Pages>,
    {
        Self {
            minimum: minimum.into(),
            maximum: maximum.map(Into::into),
            shared,
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let shared = if self.shared { "shared" } else { "not shared" };
        if let Some(maximum) = self.maximum {
            write!(f, "{} ({:?}..{:?})", shared, self.minimum, maximum)
        } else {
            write!(f, "{} ({:?}..)", shared, self.minimum)
        }
    }
}

// Import Types

/// A descriptor for an imported value into a wasm module.
///
/// Each `ImportType` describes an import into the wasm module with the
/// module/name that it's imported from as well as the type of item that's
/// being imported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct ImportType<T = ExternType> {
    module: String,
    name: String,
    ty: T,
}

impl<T> ImportType<T> {
    /// Creates a new import descriptor which comes from `module` and `name` and
    /// is of type `ty`.
    pub fn new(module: &str, name: &str, ty: T) -> Self {
        Self {
            module: module.to_owned(),
            name: name.to_owned(),
            ty,
        }
    }

    /// Returns the module name that this import is expected to come from.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the field name of the module that this import is expected to
    /// come from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type that this import is expected to have.
    pub fn ty(&self) -> &T {
        &self.ty
    }

    /// Returns a mutable reference to the declared type, used when the host
    /// rewrites limits before instantiation.
    pub fn ty_mut(&mut self) -> &mut T {
        &mut self.ty
    }
}

/// A descriptor for an exported WebAssembly value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct ExportType<T = ExternType> {
    name: String,
    ty: T,
}

impl<T> ExportType<T> {
    /// Creates a new export which is exported with the given `name` and has the
    /// given `ty`.
    pub fn new(name: &str, ty: T) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }

    /// Returns the name by which this export is known by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type of this export.
    pub fn ty(&self) -> &T {
        &self.ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOID_TO_VOID: ([Type; 0], [Type; 0]) = ([], []);
    const I32_I32_TO_VOID: ([Type; 2], [Type; 0]) = ([Type::I32, Type::I32], []);
    const V128_I64_TO_I32: ([Type; 2], [Type; 1]) = ([Type::V128, Type::I64], [Type::I32]);

    #[test]
    fn convert_tuple_to_functiontype() {
        let ty: FunctionType = VOID_TO_VOID.into();
        assert_eq!(ty.params().len(), 0);
        assert_eq!(ty.results().len(), 0);

        let ty: FunctionType = I32_I32_TO_VOID.into();
        assert_eq!(ty.params().len(), 2);
        assert_eq!(ty.params()[0], Type::I32);
        assert_eq!(ty.params()[1], Type::I32);
        assert_eq!(ty.results().len(), 0);

        let ty: FunctionType = V128_I64_TO_I32.into();
        assert_eq!(ty.params().len(), 2);
        assert_eq!(ty.params()[0], Type::V128);
        assert_eq!(ty.params()[1], Type::I64);
        assert_eq!(ty.results().len(), 1);
        assert_eq!(ty.results()[0], Type::I32);
    }

    #[test]
    fn functions_need_identical_signatures() {
        let declared = ExternType::Function(([Type::F64, Type::F64], [Type::F64]).into());
        let same = ExternType::Function(([Type::F64, Type::F64], [Type::F64]).into());
        let other = ExternType::Function(([Type::F64], [Type::F64]).into());

        assert!(same.is_compatible_with(&declared, None));
        assert!(!other.is_compatible_with(&declared, None));
    }

    #[test]
    fn globals_need_matching_mutability() {
        let constant = ExternType::Global(GlobalType::new(Type::F64, Mutability::Const));
        let mutable = ExternType::Global(GlobalType::new(Type::F64, Mutability::Var));

        assert!(constant.is_compatible_with(&constant, None));
        assert!(!constant.is_compatible_with(&mutable, None));
    }

    #[test]
    fn kinds_never_cross() {
        let global = ExternType::Global(GlobalType::new(Type::F64, Mutability::Const));
        let function = ExternType::Function(FunctionType::new(vec![], vec![Type::F64]));

        assert!(!global.is_compatible_with(&function, None));
        assert!(!function.is_compatible_with(&global, None));
    }

    #[test]
    fn memory_limits() {
        let exported = ExternType::Memory(MemoryType::new(16, Some(32), false));

        let unbounded = ExternType::Memory(MemoryType::new(1, None, false));
        assert!(exported.is_compatible_with(&unbounded, None));

        let looser = ExternType::Memory(MemoryType::new(1, Some(64), false));
        assert!(exported.is_compatible_with(&looser, None));

        let tighter = ExternType::Memory(MemoryType::new(1, Some(8), false));
        assert!(!exported.is_compatible_with(&tighter, None));

        let too_big = ExternType::Memory(MemoryType::new(17, None, false));
        assert!(!exported.is_compatible_with(&too_big, None));
        assert!(exported.is_compatible_with(&too_big, Some(20)));

        let shared = ExternType::Memory(MemoryType::new(1, Some(32), true));
        assert!(!exported.is_compatible_with(&shared, None));
    }

    #[test]
    fn table_limits() {
        let exported = ExternType::Table(TableType::new(Type::FuncRef, 10, Some(20)));
        let imported = ExternType::Table(TableType::new(Type::FuncRef, 10, None));
        assert!(exported.is_compatible_with(&imported, None));

        let unbounded_export = ExternType::Table(TableType::new(Type::FuncRef, 10, None));
        let bounded_import = ExternType::Table(TableType::new(Type::FuncRef, 10, Some(20)));
        assert!(!unbounded_export.is_compatible_with(&bounded_import, None));

        let externref_import = ExternType::Table(TableType::new(Type::ExternRef, 10, None));
        assert!(!exported.is_compatible_with(&externref_import, None));
        let externref_export = ExternType::Table(TableType::new(Type::ExternRef, 10, Some(20)));
        assert!(!externref_export.is_compatible_with(&imported, None));
    }

    #[test]
    fn display_names_the_kind() {
        let function = ExternType::Function(([Type::I32], [Type::I32]).into());
        assert_eq!(function.to_string(), "function [I32] -> [I32]");

        let global = ExternType::Global(GlobalType::new(Type::F64, Mutability::Const));
        assert_eq!(global.to_string(), "global F64 (constant)");
    }
}
