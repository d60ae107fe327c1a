//! Memory and table limits imposed on a module before instantiation.

use crate::{
    config::ResolverConfig,
    error::{RequiredSection, SetupError},
    toolchain::Toolchain,
};
use sandbox_linker_types::{ModuleInfo, Pages};

pub use sandbox_linker_intrinsics::{
    EINVAL, EMSCRIPTEN_STACKTOP, EMSCRIPTEN_STACK_MAX, MUTABLE_GLOBALS_ADDRESS,
};

/// One MiB in wasm pages.
pub const ONE_MB_PAGES: u32 = 16;
/// One GiB in wasm pages.
pub const ONE_GB_PAGES: u32 = 1024 * ONE_MB_PAGES;

/// Minimum memory of a standard toolchain module.
pub const INITIAL_MEMORY_PAGES: u32 = 15 * ONE_MB_PAGES;
/// Maximum memory of a standard toolchain module.
pub const MAX_MEMORY_PAGES: u32 = ONE_GB_PAGES;

/// Minimum size of the legacy table.
pub const EMSCRIPTEN_MIN_TABLE_ELEMS: u32 = 40_000_000;
/// Maximum size of the legacy table.
pub const EMSCRIPTEN_MAX_TABLE_ELEMS: u32 = 60_000_000;
/// Minimum size of the legacy memory.
pub const INITIAL_EMSCRIPTEN_PAGES: u32 = 1024 * ONE_MB_PAGES;
/// Maximum size of the legacy memory.
pub const MAX_EMSCRIPTEN_PAGES: u32 = 2048 * ONE_GB_PAGES;

/// Smallest memory the legacy runtime's static data fits in.
pub const MIN_STATIC_EMSCRIPTEN_MEMORY_PAGES: u32 = 128;

/// Return a copy of `module` with the limits of `toolchain` applied.
///
/// A standard module gets the limits on its first defined memory, a legacy
/// module on its first imported memory and first imported table. The input
/// is left untouched.
pub fn configure_limits(
    module: &ModuleInfo,
    toolchain: Toolchain,
    config: &ResolverConfig,
) -> Result<ModuleInfo, SetupError> {
    let mut module = module.clone();
    match toolchain {
        Toolchain::Standard => {
            let limits = &config.standard;
            let memory = module
                .memories
                .first_mut()
                .ok_or(SetupError::MissingRequiredSection {
                    section: RequiredSection::DefinedMemory,
                })?;
            memory.minimum = Pages(limits.initial_pages);
            memory.maximum = Some(Pages(limits.maximum_pages));
        }
        Toolchain::Emscripten => {
            let limits = &config.emscripten;
            let memory =
                module
                    .first_imported_memory_mut()
                    .ok_or(SetupError::MissingRequiredSection {
                        section: RequiredSection::ImportedMemory,
                    })?;
            memory.minimum = Pages(limits.initial_pages);
            memory.maximum = Some(Pages(limits.maximum_pages));

            let table =
                module
                    .first_imported_table_mut()
                    .ok_or(SetupError::MissingRequiredSection {
                        section: RequiredSection::ImportedTable,
                    })?;
            table.minimum = limits.table_minimum;
            table.maximum = Some(limits.table_maximum);
        }
    }
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sandbox_linker_types::{ExternType, ImportType, MemoryType, TableType, Type};

    fn legacy_module() -> ModuleInfo {
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
    fn constants() {
        assert_eq!(INITIAL_MEMORY_PAGES, 240);
        assert_eq!(MAX_MEMORY_PAGES, 16_384);
        assert_eq!(INITIAL_EMSCRIPTEN_PAGES, 16_384);
        assert_eq!(MAX_EMSCRIPTEN_PAGES, 33_554_432);
        assert_eq!(EMSCRIPTEN_STACKTOP, 64 * 65_536);
        assert_eq!(EMSCRIPTEN_STACK_MAX, 256 * 65_536);
        assert_eq!(MUTABLE_GLOBALS_ADDRESS, 63 * 65_536);
        assert!(MIN_STATIC_EMSCRIPTEN_MEMORY_PAGES <= INITIAL_EMSCRIPTEN_PAGES);
    }

    #[test]
    fn standard_limits_apply_to_the_first_defined_memory() {
        let module = ModuleInfo {
            memories: vec![
                MemoryType::new(1, Some(2), false),
                MemoryType::new(1, Some(2), false),
            ],
            ..Default::default()
        };
        let configured =
            configure_limits(&module, Toolchain::Standard, &ResolverConfig::default()).unwrap();

        assert_eq!(
            configured.memories[0],
            MemoryType::new(240, Some(16_384), false)
        );
        assert_eq!(configured.memories[1], module.memories[1]);
        assert_eq!(module.memories[0], MemoryType::new(1, Some(2), false));
    }

    #[test]
    fn legacy_limits_apply_to_the_imported_memory_and_table() {
        let module = legacy_module();
        let configured =
            configure_limits(&module, Toolchain::Emscripten, &ResolverConfig::default()).unwrap();

        assert_eq!(
            configured.imports[0].ty(),
            &ExternType::Memory(MemoryType::new(16_384, Some(33_554_432), false))
        );
        assert_eq!(
            configured.imports[1].ty(),
            &ExternType::Table(TableType::new(
                Type::FuncRef,
                40_000_000,
                Some(60_000_000)
            ))
        );
        assert_eq!(module, legacy_module());
    }

    #[test]
    fn missing_sections_are_fatal() {
        let err = configure_limits(
            &ModuleInfo::default(),
            Toolchain::Standard,
            &ResolverConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SetupError::MissingRequiredSection {
                section: RequiredSection::DefinedMemory
            }
        ));

        let mut module = legacy_module();
        module.imports.pop();
        let err = configure_limits(&module, Toolchain::Emscripten, &ResolverConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SetupError::MissingRequiredSection {
                section: RequiredSection::ImportedTable
            }
        ));
    }
}
