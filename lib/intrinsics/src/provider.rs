use crate::{emscripten, standard, IntrinsicModule, LegacyLayout};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Source of the intrinsic collections a resolver instantiates.
pub trait IntrinsicProvider: Send + Sync {
    /// `env` for modules built by a standard toolchain.
    fn standard_env(&self) -> &IntrinsicModule;

    /// `env` for modules built by the legacy toolchain.
    fn legacy_env(&self) -> &IntrinsicModule;

    /// `asm2wasm` for modules built by the legacy toolchain.
    fn legacy_asm2wasm(&self) -> &IntrinsicModule;

    /// `global` and `global.Math` for modules built by the legacy toolchain.
    fn legacy_global(&self) -> &IntrinsicModule;
}

/// The intrinsic collections shipped with the linker.
#[derive(Debug, Clone)]
pub struct DefaultIntrinsics {
    layout: LegacyLayout,
    standard_env: IntrinsicModule,
    legacy_env: IntrinsicModule,
    legacy_asm2wasm: IntrinsicModule,
    legacy_global: IntrinsicModule,
}

static SHARED: Lazy<Arc<DefaultIntrinsics>> =
    Lazy::new(|| Arc::new(DefaultIntrinsics::new(&LegacyLayout::default())));

impl DefaultIntrinsics {
    /// Builds the collections for a legacy memory laid out as `layout`.
    pub fn new(layout: &LegacyLayout) -> Self {
        Self {
            layout: *layout,
            standard_env: standard::env(),
            legacy_env: emscripten::env(layout),
            legacy_asm2wasm: emscripten::asm2wasm(),
            legacy_global: emscripten::global(),
        }
    }

    /// The collections for the default layout, built on first use and
    /// shared by every caller in the process.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// The shared collections when `layout` is the default one, a fresh set
    /// otherwise.
    pub fn for_layout(layout: &LegacyLayout) -> Arc<Self> {
        if *layout == LegacyLayout::default() {
            Self::shared()
        } else {
            Arc::new(Self::new(layout))
        }
    }

    /// The layout the legacy `env` globals were computed for.
    pub fn layout(&self) -> &LegacyLayout {
        &self.layout
    }
}

impl Default for DefaultIntrinsics {
    fn default() -> Self {
        Self::new(&LegacyLayout::default())
    }
}

impl IntrinsicProvider for DefaultIntrinsics {
    fn standard_env(&self) -> &IntrinsicModule {
        &self.standard_env
    }

    fn legacy_env(&self) -> &IntrinsicModule {
        &self.legacy_env
    }

    fn legacy_asm2wasm(&self) -> &IntrinsicModule {
        &self.legacy_asm2wasm
    }

    fn legacy_global(&self) -> &IntrinsicModule {
        &self.legacy_global
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_collections_are_built_once() {
        assert!(Arc::ptr_eq(
            &DefaultIntrinsics::shared(),
            &DefaultIntrinsics::shared()
        ));
        assert!(Arc::ptr_eq(
            &DefaultIntrinsics::for_layout(&LegacyLayout::default()),
            &DefaultIntrinsics::shared()
        ));

        let custom = LegacyLayout {
            stack_top: 0,
            ..LegacyLayout::default()
        };
        let intrinsics = DefaultIntrinsics::for_layout(&custom);
        assert!(!Arc::ptr_eq(&intrinsics, &DefaultIntrinsics::shared()));
        assert_eq!(intrinsics.layout(), &custom);
    }

    #[test]
    fn default_collections() {
        let intrinsics = DefaultIntrinsics::default();
        for name in ["memcpy", "memmove", "memset", "abort"] {
            assert!(intrinsics.standard_env().contains(name), "env.{name}");
        }
        for name in [
            "STACKTOP",
            "STACK_MAX",
            "DYNAMICTOP_PTR",
            "tempDoublePtr",
            "_stderr",
            "_stdin",
            "_stdout",
            "tableBase",
            "memoryBase",
            "ABORT",
            "EINVAL",
            "abortStackOverflow",
            "enlargeMemory",
            "getTotalMemory",
            "abortOnCannotGrowMemory",
            "___setErrNo",
            "___errno_location",
            "___lock",
            "___unlock",
            "_emscripten_memcpy_big",
            "_llvm_log10_f64",
            "_llvm_log2_f64",
        ] {
            assert!(intrinsics.legacy_env().contains(name), "legacy env.{name}");
        }
        assert!(!intrinsics.legacy_env().contains("memory"));
        assert_eq!(intrinsics.legacy_asm2wasm().name(), "asm2wasm");
        assert_eq!(intrinsics.legacy_global().name(), "global");
    }
}
