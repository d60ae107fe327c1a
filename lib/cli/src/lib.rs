//! The `sandbox-link` command line tool.

#![deny(missing_docs, unused_extern_crates)]
#![warn(unused_import_braces)]

pub mod cli;
pub mod commands;
pub mod logging;
