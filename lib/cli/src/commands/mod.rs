//! The commands available in the `sandbox-link` executable.

mod check;
mod inspect;

pub use check::Check;
pub use inspect::Inspect;

use anyhow::{Context, Result};
use sandbox_linker_resolver::translate_module;
use sandbox_linker_types::ModuleInfo;
use std::path::Path;

/// Read a module from disk and extract its declared form.
fn load_module(path: &Path) -> Result<ModuleInfo> {
    let bytes =
        std::fs::read(path).with_context(|| format!("unable to read `{}`", path.display()))?;
    let module = translate_module(&bytes)?;
    Ok(module)
}
