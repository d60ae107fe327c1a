//! The intrinsic modules instantiated for one module.

use crate::{error::SetupError, toolchain::Toolchain};
use sandbox_linker_intrinsics::IntrinsicProvider;
use sandbox_linker_types::ModuleInfo;
use sandbox_linker_vm::{
    Compartment, CompartmentHandle, Extern, InstanceHandle, MemoryHandle, TableHandle, VMMemory,
    VMTable,
};
use std::fmt;

/// The intrinsic collection an import module name is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicNamespace {
    /// `env` of a standard toolchain module.
    StandardEnv,
    /// `env` of a legacy module.
    LegacyEnv,
    /// `asm2wasm` of a legacy module.
    LegacyAsm2Wasm,
    /// `global` and `global.Math` of a legacy module.
    LegacyGlobal,
}

impl IntrinsicNamespace {
    /// The namespace `module_name` refers to for `toolchain`, if any.
    pub fn for_import(toolchain: Toolchain, module_name: &str) -> Option<Self> {
        match (toolchain, module_name) {
            (Toolchain::Standard, "env") => Some(Self::StandardEnv),
            (Toolchain::Emscripten, "env") => Some(Self::LegacyEnv),
            (Toolchain::Emscripten, "asm2wasm") => Some(Self::LegacyAsm2Wasm),
            (Toolchain::Emscripten, "global" | "global.Math") => Some(Self::LegacyGlobal),
            _ => None,
        }
    }
}

impl fmt::Display for IntrinsicNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StandardEnv | Self::LegacyEnv => "env",
            Self::LegacyAsm2Wasm => "asm2wasm",
            Self::LegacyGlobal => "global",
        })
    }
}

/// Handles to everything set-up created in the compartment.
///
/// The objects themselves belong to the compartment; dropping the
/// environment only forgets where they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Environment of a standard toolchain module.
    Standard {
        /// The `env` instance.
        env: InstanceHandle,
    },
    /// Environment of a legacy module.
    Legacy {
        /// The `env` instance, which also exports `memory` and `table`.
        env: InstanceHandle,
        /// The `asm2wasm` instance.
        asm2wasm: InstanceHandle,
        /// The `global` instance.
        global: InstanceHandle,
        /// The memory the module imports as `env.memory`.
        memory: MemoryHandle,
        /// The table the module imports as `env.table`.
        table: TableHandle,
    },
}

impl Environment {
    /// Instantiate the intrinsics `toolchain` needs into `compartment`.
    ///
    /// `module` must already have its limits configured: the legacy memory
    /// and table are created from its first imported memory and table.
    pub fn instantiate(
        compartment: &mut Compartment,
        toolchain: Toolchain,
        module: &ModuleInfo,
        provider: &dyn IntrinsicProvider,
    ) -> Result<Self, SetupError> {
        match toolchain {
            Toolchain::Standard => {
                let env = provider
                    .standard_env()
                    .instantiate(compartment, "env", Default::default());
                Ok(Self::Standard { env })
            }
            Toolchain::Emscripten => Self::instantiate_legacy(compartment, module, provider),
        }
    }

    fn instantiate_legacy(
        compartment: &mut Compartment,
        module: &ModuleInfo,
        provider: &dyn IntrinsicProvider,
    ) -> Result<Self, SetupError> {
        use crate::error::RequiredSection;

        let memory_ty = module
            .imported_memories()
            .next()
            .ok_or(SetupError::MissingRequiredSection {
                section: RequiredSection::ImportedMemory,
            })?;
        let table_ty = module
            .imported_tables()
            .next()
            .ok_or(SetupError::MissingRequiredSection {
                section: RequiredSection::ImportedTable,
            })?;

        let memory = VMMemory::new(memory_ty)?;
        let table = VMTable::new(table_ty)?;
        tracing::debug!(memory = %memory_ty, table = %table_ty, "created legacy memory and table");
        let memory = CompartmentHandle::new(compartment, memory);
        let table = CompartmentHandle::new(compartment, table);

        let extra = [
            ("memory".to_string(), Extern::Memory(memory)),
            ("table".to_string(), Extern::Table(table)),
        ]
        .into_iter()
        .collect();
        let env = provider.legacy_env().instantiate(compartment, "env", extra);
        let asm2wasm = provider.legacy_asm2wasm().instantiate(
            compartment,
            "emAsm2wasm",
            Default::default(),
        );
        let global =
            provider
                .legacy_global()
                .instantiate(compartment, "emGlobal", Default::default());

        Ok(Self::Legacy {
            env,
            asm2wasm,
            global,
            memory,
            table,
        })
    }

    /// The toolchain this environment was created for.
    pub fn toolchain(&self) -> Toolchain {
        match self {
            Self::Standard { .. } => Toolchain::Standard,
            Self::Legacy { .. } => Toolchain::Emscripten,
        }
    }

    /// The instance serving `namespace`, if this environment has one.
    pub fn instance(&self, namespace: IntrinsicNamespace) -> Option<InstanceHandle> {
        match (self, namespace) {
            (Self::Standard { env }, IntrinsicNamespace::StandardEnv) => Some(*env),
            (Self::Legacy { env, .. }, IntrinsicNamespace::LegacyEnv) => Some(*env),
            (Self::Legacy { asm2wasm, .. }, IntrinsicNamespace::LegacyAsm2Wasm) => {
                Some(*asm2wasm)
            }
            (Self::Legacy { global, .. }, IntrinsicNamespace::LegacyGlobal) => Some(*global),
            _ => None,
        }
    }

    /// The legacy memory.
    pub fn memory(&self) -> Option<MemoryHandle> {
        match self {
            Self::Legacy { memory, .. } => Some(*memory),
            Self::Standard { .. } => None,
        }
    }

    /// The legacy table.
    pub fn table(&self) -> Option<TableHandle> {
        match self {
            Self::Legacy { table, .. } => Some(*table),
            Self::Standard { .. } => None,
        }
    }

    /// Whether the environment lives in `compartment`.
    pub fn comes_from(&self, compartment: &Compartment) -> bool {
        match self {
            Self::Standard { env } | Self::Legacy { env, .. } => env.comes_from(compartment),
        }
    }
}
