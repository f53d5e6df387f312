//! Plain-text portfolio dashboard.

use std::fmt;

use rust_decimal::Decimal;

use crate::bond::BondStatus;
use crate::money::{format_percent, format_usd};
use crate::portfolio::{BondPerformance, MaturityBuckets, PortfolioMetrics};

const WIDTH: usize = 70;

/// The portfolio report: summary, top performers, maturity schedule.
///
/// Empty maturity buckets are omitted.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub metrics: &'a PortfolioMetrics,
    pub top: &'a [BondPerformance],
    pub buckets: &'a MaturityBuckets,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(WIDTH);
        let light = "-".repeat(WIDTH);
        let metrics = self.metrics;

        writeln!(f, "{heavy}")?;
        writeln!(f, "LIQUIDITY BOND PORTFOLIO REPORT")?;
        writeln!(f, "{heavy}")?;
        writeln!(f, "Generated: {}", metrics.as_of.to_rfc3339())?;
        writeln!(f)?;

        let outstanding = metrics.count(BondStatus::Active) + metrics.count(BondStatus::Matured);
        writeln!(f, "PORTFOLIO SUMMARY")?;
        writeln!(f, "{light}")?;
        writeln!(f, "Total Bonds: {}", metrics.total_bonds)?;
        writeln!(f, "Outstanding Bonds: {outstanding}")?;
        for status in BondStatus::ALL {
            writeln!(f, "  {status}: {}", metrics.count(status))?;
        }
        writeln!(f, "Total Principal: {}", format_usd(metrics.total_principal))?;
        writeln!(f, "Portfolio Value: {}", format_usd(metrics.total_current_value))?;
        writeln!(f, "Accrued Interest: {}", format_usd(metrics.accrued_interest))?;
        writeln!(f, "Realized Value: {}", format_usd(metrics.realized_value))?;
        writeln!(f, "Average Bond Size: {}", format_usd(metrics.average_bond_size))?;
        writeln!(f, "Portfolio ROI: {}", format_percent(metrics.roi_percentage))?;
        writeln!(f)?;

        writeln!(f, "TOP PERFORMING BONDS")?;
        writeln!(f, "{light}")?;
        for (rank, perf) in self.top.iter().enumerate() {
            writeln!(f, "{}. {}", rank + 1, perf.bond.bond_id())?;
            writeln!(f, "   Asset: {}", perf.bond.asset_id())?;
            writeln!(f, "   Principal: {}", format_usd(perf.bond.principal()))?;
            writeln!(f, "   Current Value: {}", format_usd(perf.current_value))?;
            writeln!(f, "   Interest Earned: {}", format_usd(perf.interest_earned))?;
            writeln!(f, "   ROI: {}", format_percent(perf.roi_percentage))?;
            writeln!(f)?;
        }

        writeln!(f, "MATURITY SCHEDULE")?;
        writeln!(f, "{light}")?;
        for (label, entries) in self.buckets.iter().filter(|(_, e)| !e.is_empty()) {
            let expected: Decimal = entries.iter().map(|e| e.expected_value).sum();
            writeln!(f, "{label}: {} bonds", entries.len())?;
            writeln!(f, "  Expected Value: {}", format_usd(expected))?;
        }
        writeln!(f)?;
        write!(f, "{heavy}")
    }
}

/// Renders the report to a string.
pub fn render(metrics: &PortfolioMetrics, top: &[BondPerformance], buckets: &MaturityBuckets) -> String {
    Report {
        metrics,
        top,
        buckets,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{DataAsset, DataQuality};
    use crate::manager::BondManager;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn report_sections_and_figures() {
        let manager = BondManager::new();
        let asset = DataAsset::new("ENT-DATA-001", DataQuality::Premium, dec!(0.92), dec!(0.95), dec!(50000)).unwrap();
        manager
            .issue_bond_at(&asset, dec!(250000), dec!(0.08), 180, "Enterprise-Alpha", t0())
            .unwrap();

        let as_of = t0() + chrono::Duration::days(90);
        let text = render(
            &manager.portfolio_metrics(as_of),
            &manager.top_performing(5, as_of),
            &manager.maturity_buckets(as_of),
        );

        assert!(text.starts_with(&"=".repeat(70)));
        assert!(text.contains("LIQUIDITY BOND PORTFOLIO REPORT"));
        assert!(text.contains("Total Principal: $250,000.00"));
        assert!(text.contains("Portfolio Value: $260,000.00"));
        assert!(text.contains("Portfolio ROI: 4.00%"));
        assert!(text.contains("1. LB-ENT-DATA-001-"));
        assert!(text.contains("Next 90 Days: 1 bonds"));
        assert!(text.contains("Expected Value: $270,000.00"));
        assert!(!text.contains("Next 30 Days"));
    }

    #[test]
    fn empty_portfolio_renders() {
        let manager = BondManager::new();
        let text = render(
            &manager.portfolio_metrics(t0()),
            &manager.top_performing(5, t0()),
            &manager.maturity_buckets(t0()),
        );
        assert!(text.contains("Total Bonds: 0"));
        assert!(text.contains("Portfolio ROI: 0.00%"));
        assert!(text.ends_with(&"=".repeat(70)));
    }

    #[test]
    fn report_writes_into_any_formatter() {
        let manager = BondManager::new();
        let metrics = manager.portfolio_metrics(t0());
        let top = manager.top_performing(5, t0());
        let buckets = manager.maturity_buckets(t0());
        let report = Report {
            metrics: &metrics,
            top: &top,
            buckets: &buckets,
        };
        assert_eq!(format!("{report}"), render(&metrics, &top, &buckets));
    }
}
