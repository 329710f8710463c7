//! idsync CLI library
//!
//! Exposes the command tree for integration testing. The binary entry point
//! is in main.rs.

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{run, Cli, Commands, GlobalArgs};
