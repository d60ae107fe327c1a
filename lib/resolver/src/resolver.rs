use crate::{
    config::ResolverConfig,
    environment::{Environment, IntrinsicNamespace},
    error::{LinkError, SetupError},
    limits::configure_limits,
    mutable_globals::patch_mutable_globals,
    toolchain::Toolchain,
};
use sandbox_linker_intrinsics::{DefaultIntrinsics, IntrinsicProvider};
use sandbox_linker_types::{CompartmentId, ExternType, ModuleInfo, ResolveError};
use sandbox_linker_vm::{Compartment, Extern};
use std::{fmt, sync::Arc};

/// Where a [`RootResolver`] is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverState {
    /// Nothing has happened yet.
    Uninitialized,
    /// Set-up succeeded; no import has been resolved yet.
    ToolchainSet,
    /// Imports are being resolved.
    Resolving,
    /// The last linking pass resolved every import.
    Done,
    /// Set-up failed, or the last linking pass had failures.
    Failed,
    /// The environment has been released.
    CleanedUp,
}

/// A module ready to be instantiated: its rewritten declaration and the
/// objects its imports resolved to, in import order.
#[derive(Debug, Clone)]
pub struct LinkedModule {
    /// The module with the toolchain's limits applied.
    pub module: ModuleInfo,
    /// One resolved object per import.
    pub imports: Vec<Extern>,
}

/// Resolves the imports of one module against the host intrinsics.
///
/// A resolver serves a single module in a single compartment:
///
/// 1. [`set_up`](Self::set_up) classifies the module, applies its limits
///    and instantiates the intrinsics it may import from;
/// 2. [`resolve`](Self::resolve) is called once per import, directly or
///    through [`link`](Self::link);
/// 3. [`clean_up`](Self::clean_up) forgets the environment.
///
/// Resolution failures never abort the pass. Each one is logged, kept in
/// [`diagnostics`](Self::diagnostics) and returned to the caller.
pub struct RootResolver {
    config: ResolverConfig,
    provider: Arc<dyn IntrinsicProvider>,
    user: Option<String>,
    toolchain: Option<Toolchain>,
    compartment: Option<CompartmentId>,
    environment: Option<Environment>,
    state: ResolverState,
    diagnostics: Vec<ResolveError>,
}

impl fmt::Debug for RootResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootResolver")
            .field("user", &self.user)
            .field("toolchain", &self.toolchain)
            .field("state", &self.state)
            .field("environment", &self.environment)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl Default for RootResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RootResolver {
    /// A resolver with the built-in limits and the shared default
    /// intrinsics.
    pub fn new() -> Self {
        Self::with_provider(ResolverConfig::default(), DefaultIntrinsics::shared())
    }

    /// A resolver with custom limits. The default intrinsics are rebuilt
    /// when the legacy layout differs from the built-in one.
    pub fn with_config(config: ResolverConfig) -> Self {
        let provider = DefaultIntrinsics::for_layout(&config.emscripten.layout());
        Self::with_provider(config, provider)
    }

    /// A resolver drawing its intrinsics from `provider`.
    ///
    /// The legacy `env` globals of `provider` have to agree with the layout
    /// in `config`; the resolver does not check this.
    pub fn with_provider(config: ResolverConfig, provider: Arc<dyn IntrinsicProvider>) -> Self {
        Self {
            config,
            provider,
            user: None,
            toolchain: None,
            compartment: None,
            environment: None,
            state: ResolverState::Uninitialized,
            diagnostics: Vec::new(),
        }
    }

    /// Record who the module being linked belongs to. The name is attached
    /// to every log line the resolver emits.
    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    /// The owner recorded with [`set_user`](Self::set_user).
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    fn user_name(&self) -> &str {
        self.user.as_deref().unwrap_or_default()
    }

    /// The configuration in use.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The toolchain detected by set-up.
    pub fn toolchain(&self) -> Option<Toolchain> {
        self.toolchain
    }

    /// Whether set-up classified the module as legacy.
    pub fn is_emscripten(&self) -> bool {
        self.toolchain.is_some_and(Toolchain::is_emscripten)
    }

    /// The current state.
    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// The failures of the current (or last) linking pass.
    pub fn diagnostics(&self) -> &[ResolveError] {
        &self.diagnostics
    }

    /// The instantiated intrinsics, until [`clean_up`](Self::clean_up).
    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    /// Prepare the resolver for `module` and populate `compartment` with the
    /// intrinsics it may import.
    ///
    /// Returns a copy of `module` with the limits of its toolchain applied;
    /// that copy is what has to be linked and instantiated. A resolver can
    /// only be set up once, even if set-up fails.
    #[tracing::instrument(level = "debug", skip_all, fields(user = self.user_name()))]
    pub fn set_up(
        &mut self,
        compartment: &mut Compartment,
        module: &ModuleInfo,
    ) -> Result<ModuleInfo, SetupError> {
        if self.state != ResolverState::Uninitialized {
            return Err(SetupError::AlreadySetUp);
        }

        let result = self.try_set_up(compartment, module);
        if let Err(error) = &result {
            tracing::error!(user = self.user_name(), %error, "resolver set-up failed");
            self.state = ResolverState::Failed;
        }
        result
    }

    fn try_set_up(
        &mut self,
        compartment: &mut Compartment,
        module: &ModuleInfo,
    ) -> Result<ModuleInfo, SetupError> {
        self.config.validate()?;

        let toolchain = Toolchain::detect(module);
        self.toolchain = Some(toolchain);
        tracing::debug!(%toolchain, "detected toolchain");

        let configured = configure_limits(module, toolchain, &self.config)?;
        let environment =
            Environment::instantiate(compartment, toolchain, &configured, self.provider.as_ref())?;
        if let Some(memory) = environment.memory() {
            patch_mutable_globals(
                memory.get_mut(compartment),
                &self.config.emscripten.layout(),
            )?;
        }

        self.compartment = Some(compartment.id());
        self.environment = Some(environment);
        self.state = ResolverState::ToolchainSet;
        Ok(configured)
    }

    /// Resolve the import `module_name.export_name`, declared as `expected`.
    ///
    /// The export found is only returned if its runtime type can satisfy the
    /// declaration.
    #[tracing::instrument(level = "debug", skip(self, compartment, expected), fields(user = self.user_name()))]
    pub fn resolve(
        &mut self,
        compartment: &Compartment,
        module_name: &str,
        export_name: &str,
        expected: &ExternType,
    ) -> Result<Extern, ResolveError> {
        let result = self.lookup(compartment, module_name, export_name, expected);
        if let Err(error) = &result {
            tracing::error!(user = self.user_name(), "{error}");
            self.diagnostics.push(error.clone());
        }
        result
    }

    fn lookup(
        &mut self,
        compartment: &Compartment,
        module_name: &str,
        export_name: &str,
        expected: &ExternType,
    ) -> Result<Extern, ResolveError> {
        let (Some(environment), Some(id)) = (self.environment, self.compartment) else {
            return Err(ResolveError::NotReady {
                module: module_name.to_string(),
                name: export_name.to_string(),
            });
        };
        if id != compartment.id() {
            return Err(ResolveError::CompartmentMismatch {
                module: module_name.to_string(),
                name: export_name.to_string(),
            });
        }

        match self.state {
            ResolverState::ToolchainSet => self.state = ResolverState::Resolving,
            ResolverState::Done | ResolverState::Failed => {
                self.diagnostics.clear();
                self.state = ResolverState::Resolving;
            }
            _ => {}
        }

        let instance = IntrinsicNamespace::for_import(environment.toolchain(), module_name)
            .and_then(|namespace| environment.instance(namespace))
            .ok_or_else(|| ResolveError::UnrecognizedModuleName {
                module: module_name.to_string(),
                name: export_name.to_string(),
            })?;

        let export = instance
            .get(compartment)
            .get_export(export_name)
            .copied()
            .ok_or_else(|| ResolveError::MissingImport {
                module: module_name.to_string(),
                name: export_name.to_string(),
                expected: expected.clone(),
            })?;

        if !export.is_compatible_with(compartment, expected) {
            return Err(ResolveError::TypeMismatch {
                module: module_name.to_string(),
                name: export_name.to_string(),
                expected: expected.clone(),
                actual: export.ty(compartment),
            });
        }
        Ok(export)
    }

    /// Close the current linking pass: [`ResolverState::Done`] if nothing
    /// failed, [`ResolverState::Failed`] otherwise.
    pub fn finish(&mut self) -> ResolverState {
        if let ResolverState::ToolchainSet | ResolverState::Resolving = self.state {
            self.state = if self.diagnostics.is_empty() {
                ResolverState::Done
            } else {
                ResolverState::Failed
            };
            tracing::info!(
                user = self.user_name(),
                toolchain = ?self.toolchain,
                failures = self.diagnostics.len(),
                "linking finished"
            );
        }
        self.state
    }

    /// Resolve every import of `module` in declaration order.
    ///
    /// All failures are collected, so one bad import does not hide the
    /// others. `module` should be the copy returned by
    /// [`set_up`](Self::set_up).
    #[tracing::instrument(level = "debug", skip_all, fields(user = self.user_name(), imports = module.imports.len()))]
    pub fn link(
        &mut self,
        compartment: &Compartment,
        module: &ModuleInfo,
    ) -> Result<Vec<Extern>, LinkError> {
        self.diagnostics.clear();

        let mut resolved = Vec::with_capacity(module.imports.len());
        let mut failures = Vec::new();
        for import in &module.imports {
            match self.resolve(compartment, import.module(), import.name(), import.ty()) {
                Ok(export) => resolved.push(export),
                Err(error) => failures.push(error),
            }
        }
        self.finish();

        if failures.is_empty() {
            Ok(resolved)
        } else {
            Err(LinkError::Import(failures))
        }
    }

    /// Set up for `module` and link it.
    pub fn link_module(
        &mut self,
        compartment: &mut Compartment,
        module: &ModuleInfo,
    ) -> Result<LinkedModule, LinkError> {
        let module = self.set_up(compartment, module)?;
        let imports = self.link(compartment, &module)?;
        Ok(LinkedModule { module, imports })
    }

    /// Forget the instantiated intrinsics.
    ///
    /// The objects stay in their compartment; the resolver just stops
    /// handing them out. Calling this again, or before set-up, does nothing.
    pub fn clean_up(&mut self) {
        if self.state == ResolverState::Uninitialized {
            return;
        }
        if self.environment.take().is_some() {
            tracing::debug!(user = self.user_name(), "released intrinsic environment");
        }
        self.compartment = None;
        self.diagnostics.clear();
        self.state = ResolverState::CleanedUp;
    }
}
