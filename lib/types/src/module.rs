//! The declared (parsed, not yet instantiated) form of a module.
use crate::types::{ExportType, ExternType, GlobalType, ImportType, MemoryType, TableType};

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// The statically known shape of a WebAssembly module: what it imports,
/// what it exports, and which memories, tables and globals it defines
/// itself.
///
/// Imported memories and tables are not stored separately; they are the
/// `Memory` and `Table` entries of [`ModuleInfo::imports`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct ModuleInfo {
    /// Optional name from the `name` custom section.
    pub name: Option<String>,
    /// Imports in declaration order.
    pub imports: Vec<ImportType>,
    /// Exports in declaration order.
    pub exports: Vec<ExportType>,
    /// Memories defined (not imported) by the module.
    pub memories: Vec<MemoryType>,
    /// Tables defined (not imported) by the module.
    pub tables: Vec<TableType>,
    /// Globals defined (not imported) by the module.
    pub globals: Vec<GlobalType>,
}

impl ModuleInfo {
    /// Iterate over the types of all imported memories.
    pub fn imported_memories(&self) -> impl Iterator<Item = &MemoryType> {
        self.imports.iter().filter_map(|import| import.ty().memory())
    }

    /// Iterate over the types of all imported tables.
    pub fn imported_tables(&self) -> impl Iterator<Item = &TableType> {
        self.imports.iter().filter_map(|import| import.ty().table())
    }

    /// Mutable access to the first imported memory, if any.
    pub fn first_imported_memory_mut(&mut self) -> Option<&mut MemoryType> {
        self.imports
            .iter_mut()
            .find_map(|import| match import.ty_mut() {
                ExternType::Memory(ty) => Some(ty),
                _ => None,
            })
    }

    /// Mutable access to the first imported table, if any.
    pub fn first_imported_table_mut(&mut self) -> Option<&mut TableType> {
        self.imports
            .iter_mut()
            .find_map(|import| match import.ty_mut() {
                ExternType::Table(ty) => Some(ty),
                _ => None,
            })
    }

    /// Look up the declared type of the import `module.name`.
    pub fn import(&self, module: &str, name: &str) -> Option<&ImportType> {
        self.imports
            .iter()
            .find(|import| import.module() == module && import.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pages, Type};

    fn legacy_shaped() -> ModuleInfo {
        ModuleInfo {
            imports: vec![
                ImportType::new(
                    "env",
                    "memory",
                    ExternType::Memory(MemoryType::new(256, Some(256), false)),
                ),
                ImportType::new(
                    "env",
                    "table",
                    ExternType::Table(TableType::new(Type::FuncRef, 10, Some(10))),
                ),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn imported_sections_come_from_the_import_list() {
        let module = legacy_shaped();
        assert_eq!(module.imported_memories().count(), 1);
        assert_eq!(module.imported_tables().count(), 1);
        assert!(module.memories.is_empty());
    }

    #[test]
    fn imported_memory_can_be_rewritten() {
        let mut module = legacy_shaped();
        if let Some(memory) = module.first_imported_memory_mut() {
            memory.minimum = Pages(1024);
        }
        assert_eq!(
            module.imported_memories().next().map(|m| m.minimum),
            Some(Pages(1024))
        );
    }
}
