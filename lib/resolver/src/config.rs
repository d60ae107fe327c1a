//! Tunable limits of the resolver.
//!
//! Every value defaults to the constant in [`crate::limits`], so an empty
//! file (or no file at all) reproduces the built-in behaviour:
//!
//! ```toml
//! [standard]
//! initial_pages = 240
//! maximum_pages = 16384
//!
//! [emscripten]
//! initial_pages = 16384
//! maximum_pages = 33554432
//! table_minimum = 40000000
//! table_maximum = 60000000
//! stack_top = 4194304
//! stack_max = 16777216
//! mutable_globals_address = 4128768
//! ```

use crate::limits::{
    EMSCRIPTEN_MAX_TABLE_ELEMS, EMSCRIPTEN_MIN_TABLE_ELEMS, INITIAL_EMSCRIPTEN_PAGES,
    INITIAL_MEMORY_PAGES, MAX_EMSCRIPTEN_PAGES, MAX_MEMORY_PAGES,
};
use sandbox_linker_intrinsics::{
    LegacyLayout, MutableGlobals, EMSCRIPTEN_STACKTOP, EMSCRIPTEN_STACK_MAX,
    MUTABLE_GLOBALS_ADDRESS,
};
use sandbox_linker_types::WASM_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating a [`ResolverConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("could not read resolver config {}", path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or does not have the expected shape.
    #[error("invalid resolver config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be written out as TOML.
    #[error("could not serialize resolver config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A minimum is larger than its maximum.
    #[error("{name}: minimum {minimum} is larger than maximum {maximum}")]
    InvalidRange {
        /// The offending setting.
        name: &'static str,
        /// The configured minimum.
        minimum: u64,
        /// The configured maximum.
        maximum: u64,
    },
    /// A fixed legacy address does not lie inside the initial legacy memory.
    #[error("{name} ({address:#x}) does not fit in the initial legacy memory of {memory_bytes} bytes")]
    OutsideLegacyMemory {
        /// The offending setting.
        name: &'static str,
        /// The configured address.
        address: u64,
        /// Size of the initial legacy memory.
        memory_bytes: u64,
    },
}

/// Limits applied to modules built by a standard toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StandardLimits {
    /// Minimum size of the module's own memory, in pages.
    pub initial_pages: u32,
    /// Maximum size of the module's own memory, in pages.
    pub maximum_pages: u32,
}

impl Default for StandardLimits {
    fn default() -> Self {
        Self {
            initial_pages: INITIAL_MEMORY_PAGES,
            maximum_pages: MAX_MEMORY_PAGES,
        }
    }
}

/// Limits and layout applied to modules built by the legacy toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmscriptenLimits {
    /// Minimum size of the imported memory, in pages.
    pub initial_pages: u32,
    /// Maximum size of the imported memory, in pages.
    pub maximum_pages: u32,
    /// Minimum size of the imported table, in elements.
    pub table_minimum: u32,
    /// Maximum size of the imported table, in elements.
    pub table_maximum: u32,
    /// Bottom of the stack, in bytes.
    pub stack_top: u32,
    /// Top of the stack, in bytes.
    pub stack_max: u32,
    /// Address of the mutable globals block, in bytes.
    pub mutable_globals_address: u32,
}

impl Default for EmscriptenLimits {
    fn default() -> Self {
        Self {
            initial_pages: INITIAL_EMSCRIPTEN_PAGES,
            maximum_pages: MAX_EMSCRIPTEN_PAGES,
            table_minimum: EMSCRIPTEN_MIN_TABLE_ELEMS,
            table_maximum: EMSCRIPTEN_MAX_TABLE_ELEMS,
            stack_top: EMSCRIPTEN_STACKTOP,
            stack_max: EMSCRIPTEN_STACK_MAX,
            mutable_globals_address: MUTABLE_GLOBALS_ADDRESS,
        }
    }
}

impl EmscriptenLimits {
    /// The memory layout the legacy intrinsics are built for.
    pub fn layout(&self) -> LegacyLayout {
        LegacyLayout {
            stack_top: self.stack_top,
            stack_max: self.stack_max,
            mutable_globals_address: self.mutable_globals_address,
        }
    }

    fn initial_bytes(&self) -> u64 {
        u64::from(self.initial_pages) * WASM_PAGE_SIZE as u64
    }
}

/// Configuration of a [`RootResolver`](crate::RootResolver).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Limits for standard toolchain modules.
    pub standard: StandardLimits,
    /// Limits for legacy toolchain modules.
    pub emscripten: EmscriptenLimits,
}

fn check_range(name: &'static str, minimum: u32, maximum: u32) -> Result<(), ConfigError> {
    if minimum > maximum {
        return Err(ConfigError::InvalidRange {
            name,
            minimum: minimum.into(),
            maximum: maximum.into(),
        });
    }
    Ok(())
}

impl ResolverConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML, in the format read by
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check that every minimum is within its maximum and that the fixed
    /// legacy addresses lie inside the initial legacy memory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let standard = &self.standard;
        check_range(
            "standard memory pages",
            standard.initial_pages,
            standard.maximum_pages,
        )?;

        let emscripten = &self.emscripten;
        check_range(
            "emscripten memory pages",
            emscripten.initial_pages,
            emscripten.maximum_pages,
        )?;
        check_range(
            "emscripten table elements",
            emscripten.table_minimum,
            emscripten.table_maximum,
        )?;
        check_range("emscripten stack", emscripten.stack_top, emscripten.stack_max)?;

        let memory_bytes = emscripten.initial_bytes();
        let globals_end =
            u64::from(emscripten.mutable_globals_address) + MutableGlobals::SIZE as u64;
        if globals_end > memory_bytes {
            return Err(ConfigError::OutsideLegacyMemory {
                name: "mutable_globals_address",
                address: emscripten.mutable_globals_address.into(),
                memory_bytes,
            });
        }
        if u64::from(emscripten.stack_max) > memory_bytes {
            return Err(ConfigError::OutsideLegacyMemory {
                name: "stack_max",
                address: emscripten.stack_max.into(),
                memory_bytes,
            });
        }
        Ok(())
    }
}
