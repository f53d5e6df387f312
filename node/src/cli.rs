//! # CLI Interface
//!
//! Command-line arguments for `nwu-node`, defined with `clap` derive.
//! Flags override the matching config-file values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// NWU data monetization node.
///
/// Values data assets, issues liquidity bonds against them, and serves the
/// portfolio over a JSON API with Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "nwu-node",
    about = "NWU data monetization node",
    version,
    propagate_version = true
)]
pub struct NwuNodeCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the REST API and metrics endpoint.
    Run(RunArgs),
    /// Issue the reference enterprise portfolio in memory and print the
    /// portfolio report.
    Demo(DemoArgs),
    /// Print version information and exit.
    Version,
}

/// Options shared by every subcommand that reads configuration.
#[derive(Parser, Debug)]
pub struct CommonArgs {
    /// Path to the node configuration file (TOML).
    #[arg(long, short = 'c', env = "NWU_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format. Overrides `[logging].format`.
    #[arg(long, env = "NWU_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log level or `EnvFilter` directives. Overrides `[logging].level`.
    #[arg(long, env = "NWU_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Bind address. Overrides `[server].host`.
    #[arg(long, env = "NWU_HOST")]
    pub host: Option<String>,

    /// Port for the REST API. Overrides `[server].api_port`.
    #[arg(long, env = "NWU_API_PORT")]
    pub api_port: Option<u16>,

    /// Port for the Prometheus endpoint. Overrides `[server].metrics_port`.
    #[arg(long, env = "NWU_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Issue the reference enterprise portfolio at startup.
    #[arg(long)]
    pub seed_demo: bool,
}

#[derive(Parser, Debug)]
pub struct DemoArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Days after issuance at which to value the portfolio.
    #[arg(long, default_value_t = 0)]
    pub days: u32,

    /// Number of top-performing bonds to list.
    #[arg(long, default_value_t = nwu_core::config::DEFAULT_TOP_LIMIT)]
    pub top: usize,
}
