use crate::{Compartment, FunctionHandle, GlobalHandle, MemoryHandle, TableHandle};
use sandbox_linker_types::ExternType;

/// An exported object, by handle.
///
/// An `Extern` is what an import resolves to. It does not own anything: the
/// object stays in the compartment that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extern {
    /// A host function.
    Function(FunctionHandle),
    /// A global.
    Global(GlobalHandle),
    /// A table.
    Table(TableHandle),
    /// A linear memory.
    Memory(MemoryHandle),
}

impl Extern {
    /// The runtime type of the object.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different compartment.
    pub fn ty(&self, compartment: &Compartment) -> ExternType {
        match self {
            Self::Function(f) => ExternType::Function(f.get(compartment).ty().clone()),
            Self::Global(g) => ExternType::Global(g.get(compartment).ty()),
            Self::Table(t) => ExternType::Table(t.get(compartment).ty()),
            Self::Memory(m) => ExternType::Memory(m.get(compartment).ty()),
        }
    }

    /// Current size of a table (elements) or memory (pages).
    pub fn runtime_size(&self, compartment: &Compartment) -> Option<u32> {
        match self {
            Self::Table(t) => Some(t.get(compartment).size()),
            Self::Memory(m) => Some(m.get(compartment).size().0),
            Self::Function(_) | Self::Global(_) => None,
        }
    }

    /// Whether this object may be bound to an import declared as `declared`.
    pub fn is_compatible_with(&self, compartment: &Compartment, declared: &ExternType) -> bool {
        self.ty(compartment)
            .is_compatible_with(declared, self.runtime_size(compartment))
    }

    /// Whether the handle may be used with `compartment`.
    pub fn comes_from(&self, compartment: &Compartment) -> bool {
        match self {
            Self::Function(f) => f.comes_from(compartment),
            Self::Global(g) => g.comes_from(compartment),
            Self::Table(t) => t.comes_from(compartment),
            Self::Memory(m) => m.comes_from(compartment),
        }
    }
}

impl From<FunctionHandle> for Extern {
    fn from(handle: FunctionHandle) -> Self {
        Self::Function(handle)
    }
}

impl From<GlobalHandle> for Extern {
    fn from(handle: GlobalHandle) -> Self {
        Self::Global(handle)
    }
}

impl From<TableHandle> for Extern {
    fn from(handle: TableHandle) -> Self {
        Self::Table(handle)
    }
}

impl From<MemoryHandle> for Extern {
    fn from(handle: MemoryHandle) -> Self {
        Self::Memory(handle)
    }
}
