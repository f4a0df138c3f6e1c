//! CLI command implementations for fritzmon.
//!
//! This module provides implementations for all CLI subcommands:
//! - `config`: Configuration file generation
//! - `poll`: One-shot queries against the router

pub mod config;
pub mod poll;

// Re-export command functions
pub use config::command_config;
pub use poll::command_poll;
