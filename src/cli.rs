//! Command-line interface definition for cache-provision.
//!
//! This module defines the CLI structure using clap derive macros,
//! including all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::document::{EvictionKind, Priority};
use crate::provision::ProvisionParams;

/// cache-provision - Distributed cache provisioning tool
///
/// Builds a cache configuration from parameters or a configuration file,
/// validates it and registers it on every target server node.
#[derive(Debug, Parser)]
#[command(name = "cache-provision")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "CACHE_PROVISION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the effective log level based on verbose/quiet flags.
    /// Returns: (level_name, is_quiet)
    pub fn log_level(&self) -> (&'static str, bool) {
        if self.quiet {
            return ("error", true);
        }

        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };

        (level, false)
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a cache and register it on the target servers
    Create(CreateArgs),

    /// Configuration file operations
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Arguments for the `create` subcommand.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Cache name
    pub cache_id: String,

    /// Comma-separated server addresses
    #[arg(short, long)]
    pub server: String,

    /// Cache size in megabytes
    #[arg(short = 'S', long)]
    pub cache_size: Option<u64>,

    /// Expiration cleanup interval in seconds
    #[arg(short = 'i', long)]
    pub cleanup_interval: Option<u32>,

    /// Cluster transport port
    #[arg(short = 'C', long)]
    pub cluster_port: Option<u16>,

    /// Default item priority (low, below-normal, normal, above-normal, high)
    #[arg(short = 'd', long = "def-priority", value_parser = parse_priority)]
    pub default_priority: Option<Priority>,

    /// Eviction policy (priority, lru, lfu)
    #[arg(short = 'y', long = "evict-policy", value_parser = parse_eviction)]
    pub eviction_policy: Option<EvictionKind>,

    /// Host the cache inside client processes (local topology only)
    #[arg(short = 'I', long)]
    pub inproc: bool,

    /// Cache configuration file (.ncconf or .xml)
    #[arg(short = 'T', long)]
    pub path: Option<PathBuf>,

    /// Management port of the server nodes
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Eviction ratio in percent
    #[arg(short = 'o', long)]
    pub ratio: Option<f64>,

    /// Topology (local, replicated, partitioned, partitioned-replica)
    #[arg(short, long, default_value = "")]
    pub topology: String,

    /// Replace an existing cache of the same name
    #[arg(long)]
    pub overwrite: bool,

    /// Apply the configuration without restarting the nodes
    #[arg(long)]
    pub hot_apply: bool,

    /// Print the resulting configuration instead of deploying it
    #[arg(long)]
    pub dry_run: bool,
}

impl CreateArgs {
    /// Returns the provisioning parameters for this invocation.
    pub fn to_params(&self) -> ProvisionParams {
        ProvisionParams {
            cache_id: self.cache_id.clone(),
            servers: self.server.clone(),
            cache_size: self.cache_size,
            cleanup_interval: self.cleanup_interval,
            cluster_port: self.cluster_port,
            default_priority: self.default_priority,
            eviction_policy: self.eviction_policy,
            in_proc: self.inproc,
            path: self.path.clone(),
            ratio: self.ratio,
            topology: self.topology.clone(),
            overwrite: self.overwrite,
            hot_apply: self.hot_apply,
        }
    }
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Validate the configuration file
    Validate,

    /// Show the current configuration
    Show,
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    s.parse().map_err(|e: crate::error::ProvisionError| e.to_string())
}

fn parse_eviction(s: &str) -> Result<EvictionKind, String> {
    s.parse().map_err(|e: crate::error::ProvisionError| e.to_string())
}
