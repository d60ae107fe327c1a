//! Argument parsing and error reporting.

use crate::commands::{Check, Inspect};
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

/// The options for the `sandbox-link` command line interface.
#[derive(Debug, Parser)]
#[clap(
    name = "sandbox-link",
    about = "Inspect and link-check sandboxed WebAssembly modules.",
    version
)]
pub enum SandboxLinkOptions {
    /// Show the toolchain, limits and imports of a module. Formats accepted: wasm, wat
    #[clap(name = "inspect")]
    Inspect(Inspect),

    /// Resolve every import of a module against the default intrinsics
    #[clap(name = "check")]
    Check(Check),
}

impl SandboxLinkOptions {
    /// Run the selected subcommand.
    pub fn execute(&self) -> Result<()> {
        match self {
            Self::Inspect(inspect) => inspect.execute(),
            Self::Check(check) => check.execute(),
        }
    }
}

/// Parse the command line, run it, and report any error.
pub fn sandbox_link_main() -> ExitCode {
    crate::logging::set_up_logging();

    let options = SandboxLinkOptions::parse();
    match options.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}

fn report(error: &anyhow::Error) {
    eprintln!("error: {error}");
    for cause in error.chain().skip(1) {
        eprintln!("│   {cause}");
    }
}
