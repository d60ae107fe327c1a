use crate::config::ConfigError;
use sandbox_linker_types::{MemoryError, ResolveError, TableError};
use std::fmt;
use thiserror::Error;

/// A part of a module the limit configurator has to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredSection {
    /// A memory defined by the module itself.
    DefinedMemory,
    /// An imported memory.
    ImportedMemory,
    /// An imported table.
    ImportedTable,
}

impl fmt::Display for RequiredSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DefinedMemory => "defined memory",
            Self::ImportedMemory => "imported memory",
            Self::ImportedTable => "imported table",
        })
    }
}

/// Errors that prevent a resolver from being set up for a module.
///
/// All of them are fatal: no import of the module is resolved.
#[derive(Error, Debug)]
pub enum SetupError {
    /// The module lacks a memory or table its toolchain requires.
    #[error("module has no {section} to configure")]
    MissingRequiredSection {
        /// What was missing.
        section: RequiredSection,
    },
    /// The resolver already went through set-up.
    #[error("the resolver has already been set up")]
    AlreadySetUp,
    /// The legacy memory could not be created or patched.
    #[error("legacy memory set-up failed: {0}")]
    Memory(#[from] MemoryError),
    /// The legacy table could not be created.
    #[error("legacy table set-up failed: {0}")]
    Table(#[from] TableError),
    /// The resolver configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors reported by a linking pass.
#[derive(Error, Debug)]
pub enum LinkError {
    /// Set-up failed, nothing was resolved.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// Some imports could not be resolved. Every failure is listed, in
    /// import order.
    #[error("{} import(s) could not be resolved: {}", .0.len(), join(.0))]
    Import(Vec<ResolveError>),
}

fn join(errors: &[ResolveError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
