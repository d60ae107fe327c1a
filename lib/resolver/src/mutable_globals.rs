//! Writing the legacy runtime's mutable globals into its memory.

use sandbox_linker_intrinsics::LegacyLayout;
pub use sandbox_linker_intrinsics::{IoStreamHandle, MutableGlobals};
use sandbox_linker_types::MemoryError;
use sandbox_linker_vm::VMMemory;

/// Write the initial [`MutableGlobals`] block at the address `layout`
/// reserves for it.
///
/// The write is bounds-checked as a whole. When the block does not fit, the
/// memory is left untouched.
pub fn patch_mutable_globals(
    memory: &mut VMMemory,
    layout: &LegacyLayout,
) -> Result<MutableGlobals, MemoryError> {
    let globals = MutableGlobals::initial(layout);
    globals.write_to(memory, layout.mutable_globals_address)?;
    tracing::debug!(
        address = layout.mutable_globals_address,
        dynamictop_ptr = globals.dynamictop_ptr,
        "patched mutable globals"
    );
    Ok(globals)
}
