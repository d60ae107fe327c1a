use sandbox_linker_cli::cli::sandbox_link_main;
use std::process::ExitCode;

fn main() -> ExitCode {
    sandbox_link_main()
}
