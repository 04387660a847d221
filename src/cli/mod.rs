//! CLI module
//!
//! Command-line interface for querying a Satellite server.
//!
//! # Commands
//!
//! - `hosts` - List hosts
//! - `host` - Show one host by id or name
//! - `packages` - List installed packages of one or all hosts
//! - `errata` - List applicable errata of a host
//! - `resolve` - Resolve a host name to its id
//! - `nvra` - Split a package identifier

mod commands;
mod runner;

pub use commands::{Cli, Commands, HostArgs, OutputFormat, RequiredHostArgs};
pub use runner::Runner;
