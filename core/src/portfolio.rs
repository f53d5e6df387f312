//! # Portfolio Analytics
//!
//! Pure aggregations over a set of bonds at a single instant. Nothing here
//! is stored: the [`BondManager`](crate::manager::BondManager) hands its
//! bonds to these functions under its lock and returns the result.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bond::{BondId, BondStatus, LiquidityBond};
use crate::config::MATURITY_BUCKET_EDGES;

/// Summary metrics for the whole portfolio at `as_of`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub as_of: DateTime<Utc>,
    pub total_bonds: usize,
    pub total_principal: Decimal,
    /// Sum of every bond's `current_value(as_of)`, frozen values included.
    pub total_current_value: Decimal,
    /// `total_current_value - total_principal`.
    pub accrued_interest: Decimal,
    /// Sum of redemption values of `REDEEMED` bonds.
    pub realized_value: Decimal,
    /// `accrued_interest / total_principal * 100`, zero for an empty book.
    pub roi_percentage: Decimal,
    pub average_bond_size: Decimal,
    /// Every status is present, with zero when no bond has it.
    pub count_by_status: BTreeMap<BondStatus, usize>,
}

impl PortfolioMetrics {
    pub fn count(&self, status: BondStatus) -> usize {
        self.count_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Computes [`PortfolioMetrics`] over `bonds`.
pub fn metrics<'a, I>(bonds: I, as_of: DateTime<Utc>) -> PortfolioMetrics
where
    I: IntoIterator<Item = &'a LiquidityBond>,
{
    let mut count_by_status: BTreeMap<BondStatus, usize> =
        BondStatus::ALL.iter().map(|s| (*s, 0)).collect();
    let mut total_bonds = 0usize;
    let mut total_principal = Decimal::ZERO;
    let mut total_current_value = Decimal::ZERO;
    let mut realized_value = Decimal::ZERO;

    for bond in bonds {
        let status = bond.status_at(as_of);
        *count_by_status.entry(status).or_insert(0) += 1;
        total_bonds += 1;
        total_principal += bond.principal();

        let value = bond.current_value(as_of);
        total_current_value += value;
        if status == BondStatus::Redeemed {
            realized_value += value;
        }
    }

    let accrued_interest = total_current_value - total_principal;
    let (roi_percentage, average_bond_size) = if total_principal.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            accrued_interest / total_principal * Decimal::ONE_HUNDRED,
            total_principal / Decimal::from(total_bonds),
        )
    };

    PortfolioMetrics {
        as_of,
        total_bonds,
        total_principal,
        total_current_value,
        accrued_interest,
        realized_value,
        roi_percentage,
        average_bond_size,
        count_by_status,
    }
}

/// A bond with its performance figures at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BondPerformance {
    pub bond: LiquidityBond,
    pub current_value: Decimal,
    pub interest_earned: Decimal,
    pub roi_percentage: Decimal,
}

impl BondPerformance {
    pub fn at(bond: &LiquidityBond, as_of: DateTime<Utc>) -> Self {
        Self {
            bond: bond.clone(),
            current_value: bond.current_value(as_of),
            interest_earned: bond.interest_earned(as_of),
            roi_percentage: bond.roi_percentage(as_of),
        }
    }
}

/// Up to `limit` bonds by ROI, best first. Ties go to the earlier issuance.
pub fn rank_by_roi<'a, I>(bonds: I, as_of: DateTime<Utc>, limit: usize) -> Vec<BondPerformance>
where
    I: IntoIterator<Item = &'a LiquidityBond>,
{
    let mut ranked: Vec<BondPerformance> = bonds
        .into_iter()
        .map(|bond| BondPerformance::at(bond, as_of))
        .collect();
    ranked.sort_by(|a, b| {
        b.roi_percentage
            .cmp(&a.roi_percentage)
            .then_with(|| issuance_key(&a.bond).cmp(&issuance_key(&b.bond)))
    });
    ranked.truncate(limit);
    ranked
}

/// Outstanding bonds with at most `horizon_days` left, soonest first.
pub fn due_within<'a, I>(bonds: I, as_of: DateTime<Utc>, horizon_days: u32) -> Vec<LiquidityBond>
where
    I: IntoIterator<Item = &'a LiquidityBond>,
{
    let mut due: Vec<&LiquidityBond> = bonds
        .into_iter()
        .filter(|b| b.status_at(as_of).is_outstanding())
        .filter(|b| b.days_remaining(as_of) <= horizon_days)
        .collect();
    due.sort_by_key(|b| (b.days_remaining(as_of), issuance_key(b)));
    due.into_iter().cloned().collect()
}

/// One line of the maturity schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMaturity {
    pub bond_id: BondId,
    pub maturity_date: DateTime<Utc>,
    pub days_remaining: u32,
    pub principal: Decimal,
    /// Nominal value due at maturity.
    pub expected_value: Decimal,
}

/// Outstanding bonds grouped by days remaining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityBuckets {
    pub next_30_days: Vec<ScheduledMaturity>,
    pub next_90_days: Vec<ScheduledMaturity>,
    pub next_180_days: Vec<ScheduledMaturity>,
    pub beyond_180_days: Vec<ScheduledMaturity>,
}

impl MaturityBuckets {
    /// `(label, entries)` pairs in schedule order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[ScheduledMaturity])> {
        [
            ("Next 30 Days", self.next_30_days.as_slice()),
            ("Next 90 Days", self.next_90_days.as_slice()),
            ("Next 180 Days", self.next_180_days.as_slice()),
            ("Beyond 180 Days", self.beyond_180_days.as_slice()),
        ]
        .into_iter()
    }

    pub fn len(&self) -> usize {
        self.iter().map(|(_, entries)| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Buckets outstanding bonds by days remaining at `as_of`.
pub fn bucket_maturities<'a, I>(bonds: I, as_of: DateTime<Utc>) -> MaturityBuckets
where
    I: IntoIterator<Item = &'a LiquidityBond>,
{
    let [near, mid, far] = MATURITY_BUCKET_EDGES;
    let mut buckets = MaturityBuckets::default();

    // Reuses the horizon filter so both views agree on what is outstanding.
    for bond in due_within(bonds, as_of, u32::MAX) {
        let days_remaining = bond.days_remaining(as_of);
        let entry = ScheduledMaturity {
            bond_id: bond.bond_id().to_string(),
            maturity_date: bond.maturity_date(),
            days_remaining,
            principal: bond.principal(),
            expected_value: bond.maturity_value(),
        };
        let bucket = if days_remaining <= near {
            &mut buckets.next_30_days
        } else if days_remaining <= mid {
            &mut buckets.next_90_days
        } else if days_remaining <= far {
            &mut buckets.next_180_days
        } else {
            &mut buckets.beyond_180_days
        };
        bucket.push(entry);
    }
    buckets
}

fn issuance_key(bond: &LiquidityBond) -> (DateTime<Utc>, u64) {
    (bond.issue_date(), bond.sequence())
}
