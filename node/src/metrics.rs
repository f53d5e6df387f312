//! # Prometheus Metrics
//!
//! Operational metrics for the monetization node, scraped at `/metrics` on
//! the metrics port. Everything is registered in a dedicated registry with
//! the `nwu` prefix.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Metric handles shared by request handlers.
#[derive(Clone)]
pub struct MonetizationMetrics {
    registry: Registry,
    pub assets_registered_total: IntCounter,
    pub bonds_issued_total: IntCounter,
    pub bonds_redeemed_total: IntCounter,
    pub bonds_defaulted_total: IntCounter,
    /// Rejected operations, labelled by error kind.
    pub operations_rejected_total: IntCounterVec,
    /// Updated whenever the portfolio is queried.
    pub portfolio_principal: Gauge,
    pub portfolio_value: Gauge,
    pub valuation_latency_seconds: Histogram,
}

impl MonetizationMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("nwu".into()), None)?;

        let assets_registered_total =
            IntCounter::new("assets_registered_total", "Data assets registered")?;
        registry.register(Box::new(assets_registered_total.clone()))?;

        let bonds_issued_total = IntCounter::new("bonds_issued_total", "Liquidity bonds issued")?;
        registry.register(Box::new(bonds_issued_total.clone()))?;

        let bonds_redeemed_total =
            IntCounter::new("bonds_redeemed_total", "Liquidity bonds redeemed")?;
        registry.register(Box::new(bonds_redeemed_total.clone()))?;

        let bonds_defaulted_total =
            IntCounter::new("bonds_defaulted_total", "Liquidity bonds marked defaulted")?;
        registry.register(Box::new(bonds_defaulted_total.clone()))?;

        let operations_rejected_total = IntCounterVec::new(
            Opts::new(
                "operations_rejected_total",
                "Operations rejected by the core, by error kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(operations_rejected_total.clone()))?;

        let portfolio_principal = Gauge::new(
            "portfolio_principal",
            "Total principal across all bonds at the last portfolio query",
        )?;
        registry.register(Box::new(portfolio_principal.clone()))?;

        let portfolio_value = Gauge::new(
            "portfolio_value",
            "Total current value across all bonds at the last portfolio query",
        )?;
        registry.register(Box::new(portfolio_value.clone()))?;

        let valuation_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "valuation_latency_seconds",
                "Time spent valuing a single asset",
            )
            .buckets(vec![0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01]),
        )?;
        registry.register(Box::new(valuation_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            assets_registered_total,
            bonds_issued_total,
            bonds_redeemed_total,
            bonds_defaulted_total,
            operations_rejected_total,
            portfolio_principal,
            portfolio_value,
            valuation_latency_seconds,
        })
    }

    /// Records the portfolio totals. Gauges are `f64`; the exact figures stay
    /// in the API response.
    pub fn observe_portfolio(&self, principal: Decimal, value: Decimal) {
        self.portfolio_principal.set(principal.to_f64().unwrap_or(f64::NAN));
        self.portfolio_value.set(value.to_f64().unwrap_or(f64::NAN));
    }

    pub fn record_rejection(&self, kind: &str) {
        self.operations_rejected_total.with_label_values(&[kind]).inc();
    }

    /// Encodes all registered metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub type SharedMetrics = Arc<MonetizationMetrics>;

/// `GET /metrics`. Returns 500 if encoding fails.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
