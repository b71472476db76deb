//! Command Line Interface (CLI) layer for adtiler.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for the `generate`, `crops`, `ctr`
//! and `sizes` subcommands. It wires user-provided options to the library
//! functionality exposed via `adtiler::api` and `adtiler::stats`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
