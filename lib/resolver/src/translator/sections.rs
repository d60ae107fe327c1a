//! Helpers reading the non-code sections of a module.

use super::to_compile_error;
use sandbox_linker_types::{
    CompileError, ExportType, ExternType, FunctionType, GlobalType, ImportType, MemoryType,
    ModuleInfo, Mutability, Pages, TableType, Type,
};
use wasmparser::{
    CustomSectionReader, ExportSectionReader, ExternalKind, FunctionSectionReader,
    GlobalSectionReader, ImportSectionReader, KnownCustom, MemorySectionReader, Name,
    TableSectionReader, TypeRef, TypeSectionReader, ValType,
};

macro_rules! unsupported {
    ($($arg:tt)*) => {
        CompileError::UnsupportedFeature(format!($($arg)*))
    };
}

/// Index spaces and the module being built.
#[derive(Default)]
pub(crate) struct ModuleEnvironment {
    module: ModuleInfo,
    signatures: Vec<FunctionType>,
    functions: Vec<u32>,
    tables: Vec<TableType>,
    memories: Vec<MemoryType>,
    globals: Vec<GlobalType>,
}

impl ModuleEnvironment {
    fn signature(&self, index: u32) -> Result<&FunctionType, CompileError> {
        self.signatures
            .get(index as usize)
            .ok_or_else(|| CompileError::Wasm(format!("unknown type {index}")))
    }

    fn function(&self, index: u32) -> Result<&FunctionType, CompileError> {
        let signature = self
            .functions
            .get(index as usize)
            .ok_or_else(|| CompileError::Wasm(format!("unknown function {index}")))?;
        self.signature(*signature)
    }

    fn lookup<T: Copy>(space: &[T], index: u32, what: &str) -> Result<T, CompileError> {
        space
            .get(index as usize)
            .copied()
            .ok_or_else(|| CompileError::Wasm(format!("unknown {what} {index}")))
    }

    pub(crate) fn finish(self) -> ModuleInfo {
        self.module
    }
}

/// Translate a wasmparser value type.
pub(crate) fn wptype_to_type(ty: ValType) -> Result<Type, CompileError> {
    match ty {
        ValType::I32 => Ok(Type::I32),
        ValType::I64 => Ok(Type::I64),
        ValType::F32 => Ok(Type::F32),
        ValType::F64 => Ok(Type::F64),
        ValType::V128 => Ok(Type::V128),
        ValType::Ref(ty) if ty.is_func_ref() => Ok(Type::FuncRef),
        ValType::Ref(ty) if ty.is_extern_ref() => Ok(Type::ExternRef),
        ValType::Ref(ty) => Err(unsupported!("reference type {ty:?}")),
    }
}

fn table_type(ty: &wasmparser::TableType) -> Result<TableType, CompileError> {
    let limit = |value: u64| {
        u32::try_from(value).map_err(|_| unsupported!("table limit {value} beyond 32 bits"))
    };
    Ok(TableType {
        ty: wptype_to_type(ValType::Ref(ty.element_type))?,
        minimum: limit(u64::from(ty.initial))?,
        maximum: ty.maximum.map(u64::from).map(limit).transpose()?,
    })
}

fn memory_type(ty: &wasmparser::MemoryType) -> Result<MemoryType, CompileError> {
    if ty.memory64 {
        return Err(unsupported!("64-bit memories"));
    }
    if ty.page_size_log2.is_some() {
        return Err(unsupported!("custom page sizes"));
    }
    let pages = |value: u64| {
        u32::try_from(value)
            .map(Pages)
            .map_err(|_| unsupported!("memory limit {value} beyond 32 bits"))
    };
    Ok(MemoryType {
        minimum: pages(ty.initial)?,
        maximum: ty.maximum.map(pages).transpose()?,
        shared: ty.shared,
    })
}

fn global_type(ty: &wasmparser::GlobalType) -> Result<GlobalType, CompileError> {
    Ok(GlobalType {
        ty: wptype_to_type(ty.content_type)?,
        mutability: Mutability::from(ty.mutable),
    })
}

/// Parses the Type section of the wasm module.
pub(crate) fn parse_type_section(
    types: TypeSectionReader,
    environ: &mut ModuleEnvironment,
) -> Result<(), CompileError> {
    for entry in types.into_iter_err_on_gc_types() {
        let ty = entry.map_err(to_compile_error)?;
        let params = ty
            .params()
            .iter()
            .map(|ty| wptype_to_type(*ty))
            .collect::<Result<Vec<_>, _>>()?;
        let results = ty
            .results()
            .iter()
            .map(|ty| wptype_to_type(*ty))
            .collect::<Result<Vec<_>, _>>()?;
        environ.signatures.push(FunctionType::new(params, results));
    }
    Ok(())
}

/// Parses the Import section of the wasm module.
pub(crate) fn parse_import_section(
    imports: ImportSectionReader,
    environ: &mut ModuleEnvironment,
) -> Result<(), CompileError> {
    for entry in imports {
        let import = entry.map_err(to_compile_error)?;
        let ty = match import.ty {
            TypeRef::Func(index) => {
                let ty = environ.signature(index)?.clone();
                environ.functions.push(index);
                ExternType::Function(ty)
            }
            TypeRef::Table(ty) => {
                let ty = table_type(&ty)?;
                environ.tables.push(ty);
                ExternType::Table(ty)
            }
            TypeRef::Memory(ty) => {
                let ty = memory_type(&ty)?;
                environ.memories.push(ty);
                ExternType::Memory(ty)
            }
            TypeRef::Global(ty) => {
                let ty = global_type(&ty)?;
                environ.globals.push(ty);
                ExternType::Global(ty)
            }
            TypeRef::Tag(_) => {
                return Err(unsupported!(
                    "exception tag import {}.{}",
                    import.module,
                    import.name
                ));
            }
        };
        environ
            .module
            .imports
            .push(ImportType::new(import.module, import.name, ty));
    }
    Ok(())
}

/// Parses the Function section of the wasm module.
pub(crate) fn parse_function_section(
    functions: FunctionSectionReader,
    environ: &mut ModuleEnvironment,
) -> Result<(), CompileError> {
    for entry in functions {
        let signature = entry.map_err(to_compile_error)?;
        environ.functions.push(signature);
    }
    Ok(())
}

/// Parses the Table section of the wasm module.
pub(crate) fn parse_table_section(
    tables: TableSectionReader,
    environ: &mut ModuleEnvironment,
) -> Result<(), CompileError> {
    for entry in tables {
        let table = entry.map_err(to_compile_error)?;
        let ty = table_type(&table.ty)?;
        environ.tables.push(ty);
        environ.module.tables.push(ty);
    }
    Ok(())
}

/// Parses the Memory section of the wasm module.
pub(crate) fn parse_memory_section(
    memories: MemorySectionReader,
    environ: &mut ModuleEnvironment,
) -> Result<(), CompileError> {
    for entry in memories {
        let ty = memory_type(&entry.map_err(to_compile_error)?)?;
        environ.memories.push(ty);
        environ.module.memories.push(ty);
    }
    Ok(())
}

/// Parses the Global section of the wasm module.
pub(crate) fn parse_global_section(
    globals: GlobalSectionReader,
    environ: &mut ModuleEnvironment,
) -> Result<(), CompileError> {
    for entry in globals {
        let global = entry.map_err(to_compile_error)?;
        let ty = global_type(&global.ty)?;
        environ.globals.push(ty);
        environ.module.globals.push(ty);
    }
    Ok(())
}

/// Parses the Export section of the wasm module.
pub(crate) fn parse_export_section(
    exports: ExportSectionReader,
    environ: &mut ModuleEnvironment,
) -> Result<(), CompileError> {
    for entry in exports {
        let export = entry.map_err(to_compile_error)?;
        let index = export.index;
        let ty = match export.kind {
            ExternalKind::Func => ExternType::Function(environ.function(index)?.clone()),
            ExternalKind::Table => ExternType::Table(ModuleEnvironment::lookup(
                &environ.tables,
                index,
                "table",
            )?),
            ExternalKind::Memory => ExternType::Memory(ModuleEnvironment::lookup(
                &environ.memories,
                index,
                "memory",
            )?),
            ExternalKind::Global => ExternType::Global(ModuleEnvironment::lookup(
                &environ.globals,
                index,
                "global",
            )?),
            ExternalKind::Tag => {
                return Err(unsupported!("exception tag export {}", export.name));
            }
        };
        environ
            .module
            .exports
            .push(ExportType::new(export.name, ty));
    }
    Ok(())
}

/// Picks the module name out of the `name` custom section. Other custom
/// sections, and malformed names, are ignored.
pub(crate) fn parse_custom_section(section: &CustomSectionReader, environ: &mut ModuleEnvironment) {
    let KnownCustom::Name(names) = section.as_known() else {
        return;
    };
    for name in names {
        if let Ok(Name::Module { name, .. }) = name {
            environ.module.name = Some(name.to_string());
        }
    }
}
