// Copyright (c) 2026 AUTOHELIX Quantum Systems. MIT License.
// See LICENSE for details.

//! # NWU Monetization Node
//!
//! Entry point for the `nwu-node` binary. Parses CLI arguments, loads the
//! TOML configuration, initializes logging and metrics, and serves the REST
//! API.
//!
//! The binary supports three subcommands:
//!
//! - `run`: serve the REST API and the metrics endpoint
//! - `demo`: issue the reference enterprise portfolio and print its report
//! - `version`: print build version information

mod api;
mod cli;
mod config;
mod demo;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::signal;

use rust_decimal::Decimal;

use nwu_core::money::format_usd;
use nwu_core::{report, AssetRegistry, BondManager, ValuationEngine};

use cli::{CommonArgs, Commands, NwuNodeCli};
use config::NodeConfig;
use metrics::MonetizationMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = NwuNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Demo(args) => run_demo(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Loads the config file, applies the shared CLI overrides, and installs
/// the tracing subscriber.
fn load_config(common: &CommonArgs) -> Result<NodeConfig> {
    let mut config = NodeConfig::load(common.config.as_deref())?;
    if let Some(format) = common.log_format {
        config.logging.format = format;
    }
    if let Some(level) = &common.log_level {
        config.logging.level = level.clone();
    }

    logging::init_logging(
        &logging::directives_for(&config.logging.level),
        config.logging.format,
    );
    if let Some(path) = &common.config {
        tracing::info!(path = %path.display(), "configuration loaded");
    }
    Ok(config)
}

/// Serves the API and metrics endpoints until SIGINT or SIGTERM.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.api_port {
        config.server.api_port = port;
    }
    if let Some(port) = args.metrics_port {
        config.server.metrics_port = port;
    }
    config.validate()?;

    tracing::info!(
        host = %config.server.host,
        api_port = config.server.api_port,
        metrics_port = config.server.metrics_port,
        "starting nwu-node"
    );

    // --- Core engine ---
    let engine = ValuationEngine::new(config.valuation).context("invalid [valuation] rates")?;
    let manager = Arc::new(BondManager::new());
    let registry = Arc::new(RwLock::new(AssetRegistry::new()));

    if args.seed_demo {
        let ids = demo::seed(&mut registry.write(), &manager, Utc::now())
            .context("failed to seed reference portfolio")?;
        tracing::info!(bonds = ids.len(), "demo portfolio issued");
    }

    // --- Metrics ---
    let node_metrics =
        Arc::new(MonetizationMetrics::new().context("failed to create metrics registry")?);

    // --- Application state ---
    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        manager,
        registry,
        engine,
        issuance: config.issuance,
        metrics: Arc::clone(&node_metrics),
        clock: api::system_clock(),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("{}:{}", config.server.host, config.server.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("{}:{}", config.server.host, config.server.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("nwu-node stopped");
    Ok(())
}

/// Issues the reference portfolio in memory and prints the dashboard report
/// as of `--days` after issuance.
fn run_demo(args: cli::DemoArgs) -> Result<()> {
    let config = load_config(&args.common)?;
    let engine = ValuationEngine::new(config.valuation).context("invalid [valuation] rates")?;

    let mut registry = AssetRegistry::new();
    let manager = BondManager::new();
    let issued_at = Utc::now();
    demo::seed(&mut registry, &manager, issued_at).context("failed to seed reference portfolio")?;

    println!("DATA ASSETS");
    for (asset, value) in registry.list_high_value(&engine, Decimal::ZERO)? {
        println!(
            "  {:<14} {:<8} {:>20}  {}",
            asset.asset_id,
            asset.quality.to_string(),
            format_usd(value),
            asset.metadata.name
        );
    }
    println!();

    let as_of = issued_at + Duration::days(i64::from(args.days));
    let metrics = manager.portfolio_metrics(as_of);
    let top = manager.top_performing(args.top, as_of);
    let buckets = manager.maturity_buckets(as_of);

    println!("{}", report::render(&metrics, &top, &buckets));
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("nwu-node {}", env!("CARGO_PKG_VERSION"));
    println!("rustc    {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// If a handler cannot be installed, that signal is never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
