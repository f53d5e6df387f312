//! # Structured Logging
//!
//! Installs the global `tracing` subscriber. The filter comes from `RUST_LOG`
//! when set, otherwise from the configured level. Output always goes to
//! stderr; stdout is reserved for command output such as the `demo` report.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, colored output for local runs.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Initialize the global tracing subscriber. Call once, early in `main()`.
///
/// `default_directives` uses `EnvFilter` syntax, e.g.
/// `"nwu_node=info,nwu_core=info,tower_http=debug"`.
pub fn init_logging(default_directives: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .init();
        }
    }

    tracing::debug!(?format, "logging initialized");
}

/// Expands a bare level such as `"debug"` into directives for this
/// workspace's crates plus HTTP tracing. Full directive strings pass through.
pub fn directives_for(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("nwu_node={level},nwu_core={level},tower_http={level}")
    }
}
