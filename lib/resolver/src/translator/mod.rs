//! Translation of a WebAssembly binary (or, with the `wat` feature, text)
//! into the declared [`ModuleInfo`] the resolver works on.
//!
//! Only the parts that matter for linking are extracted: types, imports,
//! exports and the memories, tables and globals the module defines. Function
//! bodies are validated but otherwise skipped. Constructs the linker cannot
//! represent are reported before validation runs.

mod sections;

use self::sections::{
    parse_custom_section, parse_export_section, parse_function_section, parse_global_section,
    parse_import_section, parse_memory_section, parse_table_section, parse_type_section,
    ModuleEnvironment,
};
use sandbox_linker_types::{CompileError, ModuleInfo};
use wasmparser::{Parser, Payload, Validator};

pub(crate) fn to_compile_error(error: wasmparser::BinaryReaderError) -> CompileError {
    CompileError::Wasm(error.to_string())
}

/// Validate `bytes` and extract its declared form.
pub fn translate_module(bytes: &[u8]) -> Result<ModuleInfo, CompileError> {
    #[cfg(feature = "wat")]
    let bytes = wat::parse_bytes(bytes).map_err(|e| CompileError::Wasm(e.to_string()))?;

    let mut environ = ModuleEnvironment::default();
    for payload in Parser::new(0).parse_all(&bytes) {
        match payload.map_err(to_compile_error)? {
            Payload::TypeSection(types) => parse_type_section(types, &mut environ)?,
            Payload::ImportSection(imports) => parse_import_section(imports, &mut environ)?,
            Payload::FunctionSection(functions) => {
                parse_function_section(functions, &mut environ)?
            }
            Payload::TableSection(tables) => parse_table_section(tables, &mut environ)?,
            Payload::MemorySection(memories) => parse_memory_section(memories, &mut environ)?,
            Payload::GlobalSection(globals) => parse_global_section(globals, &mut environ)?,
            Payload::ExportSection(exports) => parse_export_section(exports, &mut environ)?,
            Payload::CustomSection(section) => parse_custom_section(&section, &mut environ),
            _ => {}
        }
    }

    Validator::new()
        .validate_all(&bytes)
        .map_err(|e| CompileError::Validate(e.to_string()))?;

    let module = environ.finish();
    tracing::debug!(
        imports = module.imports.len(),
        exports = module.exports.len(),
        memories = module.memories.len(),
        "translated module"
    );
    Ok(module)
}
