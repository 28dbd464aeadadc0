//! Command-line interface for tuiforge.
//!
//! Provides the `build` command driving the full generation pipeline and a
//! `libraries` command listing the supported toolkits.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli};
