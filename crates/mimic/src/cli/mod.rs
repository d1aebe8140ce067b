//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the mimic binary.

mod commands;
mod inspect;
mod maintenance;
#[cfg(feature = "discord")]
mod fetch;

pub use commands::{Cli, Commands};
#[cfg(feature = "discord")]
pub use fetch::run_fetch;
pub use inspect::run_inspect;
pub use maintenance::{run_purge, run_separate};
