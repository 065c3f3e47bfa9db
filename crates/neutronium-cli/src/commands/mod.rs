//! Command implementations for the Neutronium CLI.
//!
//! - [`start`] - build once, or build, serve and watch with `--watch`
//!
//! Each command provides an `execute` function that takes the parsed
//! arguments and returns a Result.

pub mod start;
pub(crate) mod utils;

pub use start::execute as start_execute;
