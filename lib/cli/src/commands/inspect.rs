use anyhow::{Context, Result};
use clap::Parser;
use sandbox_linker_resolver::{configure_limits, ResolverConfig, Toolchain};
use sandbox_linker_types::{ExternType, ModuleInfo};
use std::path::PathBuf;

#[derive(Debug, Parser)]
/// The options for the `sandbox-link inspect` subcommand
pub struct Inspect {
    /// File to inspect
    #[clap(name = "FILE")]
    path: PathBuf,

    /// Limits to apply instead of the built-in defaults
    #[clap(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Also print the configuration the limits were computed with
    #[clap(long)]
    show_config: bool,
}

impl Inspect {
    /// Runs logic for the `inspect` subcommand
    pub fn execute(&self) -> Result<()> {
        self.inner_execute()
            .context(format!("failed to inspect `{}`", self.path.display()))
    }

    fn inner_execute(&self) -> Result<()> {
        let config = match &self.config {
            Some(path) => ResolverConfig::from_path(path)?,
            None => ResolverConfig::default(),
        };
        let module = super::load_module(&self.path)?;
        let toolchain = Toolchain::detect(&module);

        println!("Module: {}", module.name.as_deref().unwrap_or("<unnamed>"));
        println!("Toolchain: {toolchain}");
        println!("Limits:");
        print_limits("  declared", &module);
        match configure_limits(&module, toolchain, &config) {
            Ok(configured) => print_limits("  configured", &configured),
            Err(error) => println!("  configured: {error}"),
        }

        if self.show_config {
            println!("Configuration:");
            for line in config.to_toml_string()?.lines() {
                println!("  {line}");
            }
        }

        println!("Imports:");
        for import in &module.imports {
            println!("  \"{}\".\"{}\": {}", import.module(), import.name(), import.ty());
        }
        println!("Exports:");
        for export in &module.exports {
            println!("  \"{}\": {}", export.name(), export.ty());
        }
        Ok(())
    }
}

fn print_limits(label: &str, module: &ModuleInfo) {
    for memory in &module.memories {
        println!("{label} memory: {memory}");
    }
    for table in &module.tables {
        println!("{label} table: {table}");
    }
    for import in &module.imports {
        if let ExternType::Memory(_) | ExternType::Table(_) = import.ty() {
            println!(
                "{label} import \"{}\".\"{}\": {}",
                import.module(),
                import.name(),
                import.ty()
            );
        }
    }
}
