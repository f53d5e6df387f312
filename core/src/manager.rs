//! # Liquidity Bond Manager
//!
//! The manager owns the authoritative collection of bonds and is the only
//! code allowed to change a bond's lifecycle state. It is an ordinary owned
//! value: construct one per process (or per test) and share it behind an
//! `Arc` if several callers need it.
//!
//! All bonds sit behind a single `parking_lot::RwLock`. Transitions take the
//! write lock for the whole check-then-mutate step, so two concurrent
//! redemptions of the same bond cannot both succeed: the loser observes the
//! winner's `REDEEMED` state and gets [`MonetizationError::InvalidBondState`].
//!
//! Queries never write. They take the read lock and derive `ACTIVE` versus
//! `MATURED` from their `as_of` instant, so asking about one instant cannot
//! change the answer for another.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::asset::{validate_asset_id, DataAsset};
use crate::bond::{BondId, BondStatus, BondTerms, LiquidityBond};
use crate::config::BOND_ID_PREFIX;
use crate::error::{MonetizationError, Result};
use crate::portfolio::{self, BondPerformance, MaturityBuckets, PortfolioMetrics};

/// Owner of every issued bond.
#[derive(Debug, Default)]
pub struct BondManager {
    book: RwLock<BondBook>,
}

#[derive(Debug, Default)]
struct BondBook {
    bonds: HashMap<BondId, LiquidityBond>,
    next_sequence: u64,
}

impl BondBook {
    fn get_mut(&mut self, bond_id: &str) -> Result<&mut LiquidityBond> {
        self.bonds
            .get_mut(bond_id)
            .ok_or_else(|| MonetizationError::BondNotFound(bond_id.to_string()))
    }

    /// Bonds in issuance order.
    fn ordered(&self) -> Vec<&LiquidityBond> {
        let mut bonds: Vec<&LiquidityBond> = self.bonds.values().collect();
        bonds.sort_by_key(|b| (b.issue_date(), b.sequence()));
        bonds
    }
}

impl BondManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    // -- issuance ------------------------------------------------------------

    /// Issues a new `ACTIVE` bond against `asset`, dated now.
    ///
    /// # Errors
    ///
    /// [`MonetizationError::InvalidParameter`] if principal ≤ 0, rate < 0,
    /// maturity_days = 0 (or a value exceeds its bound);
    /// [`MonetizationError::InvalidAsset`] if the asset itself is invalid.
    pub fn issue_bond(
        &self,
        asset: &DataAsset,
        principal: Decimal,
        interest_rate: Decimal,
        maturity_days: u32,
        issuer: &str,
    ) -> Result<BondId> {
        self.issue_bond_at(asset, principal, interest_rate, maturity_days, issuer, Utc::now())
    }

    /// Like [`issue_bond`](Self::issue_bond) with an explicit issue date.
    pub fn issue_bond_at(
        &self,
        asset: &DataAsset,
        principal: Decimal,
        interest_rate: Decimal,
        maturity_days: u32,
        issuer: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<BondId> {
        asset.validate()?;
        let terms = BondTerms {
            asset_id: asset.asset_id.clone(),
            principal,
            interest_rate,
            maturity_days,
            issuer: issuer.to_string(),
            holder: None,
        };
        self.issue(terms, issued_at)
    }

    /// Issues a bond from complete terms (including an optional holder).
    pub fn issue(&self, terms: BondTerms, issued_at: DateTime<Utc>) -> Result<BondId> {
        if let Err(err) = self.validate_terms(&terms) {
            tracing::warn!(asset_id = %terms.asset_id, error = %err, "bond issuance rejected");
            return Err(err);
        }

        let mut book = self.book.write();
        book.next_sequence += 1;
        let sequence = book.next_sequence;
        let bond_id = format!(
            "{BOND_ID_PREFIX}-{}-{}-{sequence}",
            terms.asset_id,
            issued_at.format("%Y%m%dT%H%M%S%6fZ"),
        );

        tracing::info!(
            bond_id = %bond_id,
            asset_id = %terms.asset_id,
            principal = %terms.principal,
            interest_rate = %terms.interest_rate,
            maturity_days = terms.maturity_days,
            issuer = %terms.issuer,
            "bond issued"
        );

        let bond = LiquidityBond::issue(bond_id.clone(), terms, issued_at, sequence);
        book.bonds.insert(bond_id.clone(), bond);
        Ok(bond_id)
    }

    fn validate_terms(&self, terms: &BondTerms) -> Result<()> {
        validate_asset_id(&terms.asset_id).map_err(|err| match err {
            MonetizationError::InvalidAsset { reason, .. } => {
                MonetizationError::invalid_parameter("asset_id", reason)
            }
            other => other,
        })?;
        terms.validate()
    }

    // -- queries -------------------------------------------------------------

    /// Snapshot of one bond. Use [`LiquidityBond::status_at`] for its status.
    pub fn get_bond(&self, bond_id: &str) -> Result<LiquidityBond> {
        self.book
            .read()
            .bonds
            .get(bond_id)
            .cloned()
            .ok_or_else(|| MonetizationError::BondNotFound(bond_id.to_string()))
    }

    /// All bonds (optionally one status) in issuance order, observed now.
    pub fn list_bonds(&self, status: Option<BondStatus>) -> Vec<LiquidityBond> {
        self.list_bonds_at(status, Utc::now())
    }

    pub fn list_bonds_at(&self, status: Option<BondStatus>, as_of: DateTime<Utc>) -> Vec<LiquidityBond> {
        let book = self.book.read();
        book.ordered()
            .into_iter()
            .filter(|b| status.map_or(true, |s| b.status_at(as_of) == s))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.book.read().bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.read().bonds.is_empty()
    }

    // -- transitions ---------------------------------------------------------

    /// Redeems a bond, freezing and returning its value at `as_of`.
    ///
    /// # Errors
    ///
    /// [`MonetizationError::BondNotFound`] for an unknown id,
    /// [`MonetizationError::InvalidBondState`] if it is already terminal.
    pub fn redeem_bond(&self, bond_id: &str, as_of: DateTime<Utc>) -> Result<Decimal> {
        let mut book = self.book.write();
        let bond = book.get_mut(bond_id)?;
        match bond.redeem(as_of) {
            Ok(value) => {
                tracing::info!(bond_id = %bond_id, value = %value, "bond redeemed");
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(bond_id = %bond_id, error = %err, "redemption rejected");
                Err(err)
            }
        }
    }

    /// Records an issuer default, freezing and returning the value at `as_of`.
    ///
    /// Defaults are external events; the manager never infers one.
    pub fn default_bond(&self, bond_id: &str, reason: &str, as_of: DateTime<Utc>) -> Result<Decimal> {
        let mut book = self.book.write();
        let bond = book.get_mut(bond_id)?;
        match bond.mark_defaulted(reason, as_of) {
            Ok(value) => {
                tracing::warn!(bond_id = %bond_id, value = %value, reason = %reason, "bond defaulted");
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(bond_id = %bond_id, error = %err, "default rejected");
                Err(err)
            }
        }
    }

    // -- portfolio -----------------------------------------------------------

    /// Aggregate metrics over every bond at `as_of`.
    pub fn portfolio_metrics(&self, as_of: DateTime<Utc>) -> PortfolioMetrics {
        let book = self.book.read();
        portfolio::metrics(book.bonds.values(), as_of)
    }

    /// Outstanding bonds with at most `horizon_days` to go, soonest first.
    pub fn maturity_schedule(&self, as_of: DateTime<Utc>, horizon_days: u32) -> Vec<LiquidityBond> {
        let book = self.book.read();
        portfolio::due_within(book.bonds.values(), as_of, horizon_days)
    }

    /// Outstanding bonds grouped into 30/90/180-day buckets.
    pub fn maturity_buckets(&self, as_of: DateTime<Utc>) -> MaturityBuckets {
        let book = self.book.read();
        portfolio::bucket_maturities(book.bonds.values(), as_of)
    }

    /// Up to `limit` bonds by ROI at `as_of`, best first; ties go to the
    /// earlier issuance.
    pub fn top_performing(&self, limit: usize, as_of: DateTime<Utc>) -> Vec<BondPerformance> {
        let book = self.book.read();
        portfolio::rank_by_roi(book.bonds.values(), as_of, limit)
    }
}
