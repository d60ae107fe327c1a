use sandbox_linker_types::ModuleInfo;
use std::fmt;

/// The toolchain a module was built with, as far as linking is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toolchain {
    /// A module that defines its own memory and only imports from `env`.
    Standard,
    /// A module built by the legacy Emscripten (asm2wasm) toolchain: it
    /// imports its memory and table and expects the legacy C runtime.
    Emscripten,
}

impl Toolchain {
    /// Classify `module`.
    ///
    /// This is a heuristic: modules that define a memory are taken to be
    /// standard, everything else legacy. The predicate lives in
    /// [`defines_own_memory`] so it can be refined on its own.
    pub fn detect(module: &ModuleInfo) -> Self {
        if defines_own_memory(module) {
            Self::Standard
        } else {
            Self::Emscripten
        }
    }

    /// Whether this is the legacy toolchain.
    pub fn is_emscripten(self) -> bool {
        self == Self::Emscripten
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Emscripten => "emscripten",
        })
    }
}

/// Whether the module defines at least one memory of its own.
pub fn defines_own_memory(module: &ModuleInfo) -> bool {
    !module.memories.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_linker_types::{ExternType, ImportType, MemoryType};

    #[test]
    fn defined_memory_means_standard() {
        let module = ModuleInfo {
            memories: vec![MemoryType::new(1, None, false)],
            ..Default::default()
        };
        assert_eq!(Toolchain::detect(&module), Toolchain::Standard);
    }

    #[test]
    fn imported_or_absent_memory_means_emscripten() {
        let imported = ModuleInfo {
            imports: vec![ImportType::new(
                "env",
                "memory",
                ExternType::Memory(MemoryType::new(256, Some(256), false)),
            )],
            ..Default::default()
        };
        assert_eq!(Toolchain::detect(&imported), Toolchain::Emscripten);
        assert!(Toolchain::detect(&ModuleInfo::default()).is_emscripten());
    }
}
