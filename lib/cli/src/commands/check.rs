use anyhow::{bail, Context, Result};
use clap::Parser;
use sandbox_linker_resolver::{LinkError, ResolverConfig, RootResolver};
use sandbox_linker_vm::Compartment;
use std::path::PathBuf;

#[derive(Debug, Parser)]
/// The options for the `sandbox-link check` subcommand
pub struct Check {
    /// File to link
    #[clap(name = "FILE")]
    path: PathBuf,

    /// Limits to apply instead of the built-in defaults
    #[clap(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Owner recorded in the log lines of this link
    #[clap(long)]
    pub user: Option<String>,
}

impl Check {
    /// Runs logic for the `check` subcommand
    pub fn execute(&self) -> Result<()> {
        self.inner_execute()
            .context(format!("failed to link `{}`", self.path.display()))
    }

    fn inner_execute(&self) -> Result<()> {
        let config = match &self.config {
            Some(path) => ResolverConfig::from_path(path)?,
            None => ResolverConfig::default(),
        };
        let module = super::load_module(&self.path)?;

        let mut resolver = RootResolver::with_config(config);
        if let Some(user) = &self.user {
            resolver.set_user(user.as_str());
        }
        let mut compartment = Compartment::new();

        let outcome = resolver.link_module(&mut compartment, &module);
        let toolchain = resolver
            .toolchain()
            .map_or_else(|| "unknown".to_string(), |toolchain| toolchain.to_string());
        resolver.clean_up();

        match outcome {
            Ok(linked) => {
                println!(
                    "{}: {} import(s) resolved ({toolchain})",
                    self.path.display(),
                    linked.imports.len()
                );
                Ok(())
            }
            Err(LinkError::Import(failures)) => {
                for failure in &failures {
                    println!("{}: {failure}", self.path.display());
                }
                bail!(
                    "{} of {} import(s) could not be resolved ({toolchain})",
                    failures.len(),
                    module.imports.len()
                )
            }
            Err(error @ LinkError::Setup(_)) => Err(error.into()),
        }
    }
}
