//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Query a Red Hat Satellite server
#[derive(Parser, Debug)]
#[command(name = "satellite")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connection configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List hosts
    Hosts {
        /// Satellite search expression
        #[arg(long)]
        search: Option<String>,

        /// Fetch all host fields instead of id and name only
        #[arg(long)]
        full: bool,

        /// Page size requested from the server
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Show a single host
    Host {
        /// Host id or name
        id_or_name: String,
    },

    /// List installed packages (all hosts when no host is given)
    Packages {
        #[command(flatten)]
        host: HostArgs,
    },

    /// List applicable errata of a host
    Errata {
        #[command(flatten)]
        host: RequiredHostArgs,
    },

    /// Resolve a host name to its id
    Resolve {
        /// Host name
        name: String,
    },

    /// Split a package NVRA into its components
    Nvra {
        /// Compound identifier, e.g. `bash-5.1.8-6.el9.x86_64`
        compound: String,
    },
}

/// Optional host selection
#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {
    /// Numeric host id
    #[arg(long, conflicts_with = "host_name")]
    pub host_id: Option<i64>,

    /// Host name, resolved to an id first
    #[arg(long)]
    pub host_name: Option<String>,
}

/// Mandatory host selection
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct RequiredHostArgs {
    /// Numeric host id
    #[arg(long)]
    pub host_id: Option<i64>,

    /// Host name, resolved to an id first
    #[arg(long)]
    pub host_name: Option<String>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Indented JSON
    Pretty,
}
