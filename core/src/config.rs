//! # Engine Configuration & Constants
//!
//! Every tunable number in the monetization core lives here: the per-tier
//! base rates, revenue projection factors, default issuance terms, and the
//! bounds that keep bond arithmetic well inside `Decimal` range.
//!
//! The serde-deserializable structs ([`RateTable`], [`IssuanceDefaults`],
//! [`EngineConfig`]) are what the node reads from its TOML file. Each has a
//! `Default` matching the constants below and a `validate()` that rejects
//! inconsistent values up front.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::asset::DataQuality;
use crate::error::{MonetizationError, Result};

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

/// Base rate per volume unit for [`DataQuality::Low`].
pub const DEFAULT_RATE_LOW: Decimal = dec!(0.10);

/// Base rate per volume unit for [`DataQuality::Medium`].
pub const DEFAULT_RATE_MEDIUM: Decimal = dec!(0.50);

/// Base rate per volume unit for [`DataQuality::High`].
pub const DEFAULT_RATE_HIGH: Decimal = dec!(1.00);

/// Base rate per volume unit for [`DataQuality::Premium`].
pub const DEFAULT_RATE_PREMIUM: Decimal = dec!(2.00);

/// Weight of the uniqueness score: `1 + uniqueness * 2`.
pub const UNIQUENESS_WEIGHT: Decimal = dec!(2);

/// Weight of the demand score: `1 + demand * 3`.
pub const DEMAND_WEIGHT: Decimal = dec!(3);

/// Share of the base value projected as monthly revenue.
pub const MONTHLY_REVENUE_FACTOR: Decimal = dec!(0.05);

/// Share of the base value projected as annual revenue.
pub const ANNUAL_REVENUE_FACTOR: Decimal = dec!(0.60);

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

/// Interest rate applied when an issuance request does not name one.
pub const DEFAULT_INTEREST_RATE: Decimal = dec!(0.05);

/// Term applied when an issuance request does not name one.
pub const DEFAULT_MATURITY_DAYS: u32 = 90;

/// Largest principal a single bond may carry.
pub const MAX_PRINCIPAL: Decimal = dec!(1000000000000);

/// Largest annualized rate accepted at issuance (1000%).
pub const MAX_INTEREST_RATE: Decimal = dec!(10);

/// Longest term accepted at issuance, roughly a century.
pub const MAX_MATURITY_DAYS: u32 = 36_500;

/// Prefix of every generated bond id.
pub const BOND_ID_PREFIX: &str = "LB";

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// Upper edges (inclusive, in days remaining) of the maturity buckets.
/// Anything beyond the last edge lands in the "beyond" bucket.
pub const MATURITY_BUCKET_EDGES: [u32; 3] = [30, 90, 180];

/// Default number of bonds shown in top-performer listings.
pub const DEFAULT_TOP_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Base rate per volume unit for each quality tier.
///
/// Rates must be positive and strictly increasing from `low` to `premium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    pub low: Decimal,
    pub medium: Decimal,
    pub high: Decimal,
    pub premium: Decimal,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            low: DEFAULT_RATE_LOW,
            medium: DEFAULT_RATE_MEDIUM,
            high: DEFAULT_RATE_HIGH,
            premium: DEFAULT_RATE_PREMIUM,
        }
    }
}

impl RateTable {
    /// Looks up the base rate for a tier.
    pub fn rate(&self, quality: DataQuality) -> Decimal {
        match quality {
            DataQuality::Low => self.low,
            DataQuality::Medium => self.medium,
            DataQuality::High => self.high,
            DataQuality::Premium => self.premium,
        }
    }

    /// Checks positivity and strict ordering of the tiers.
    pub fn validate(&self) -> Result<()> {
        if self.low <= Decimal::ZERO {
            return Err(MonetizationError::InvalidConfig(format!(
                "rate for LOW must be positive, got {}",
                self.low
            )));
        }
        let ordered = [
            (DataQuality::Low, self.low),
            (DataQuality::Medium, self.medium),
            (DataQuality::High, self.high),
            (DataQuality::Premium, self.premium),
        ];
        for pair in ordered.windows(2) {
            let (lower_tier, lower) = pair[0];
            let (upper_tier, upper) = pair[1];
            if upper <= lower {
                return Err(MonetizationError::InvalidConfig(format!(
                    "rate for {upper_tier} ({upper}) must exceed rate for {lower_tier} ({lower})"
                )));
            }
        }
        Ok(())
    }
}

/// Terms used when an issuance request leaves them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuanceDefaults {
    pub interest_rate: Decimal,
    pub maturity_days: u32,
}

impl Default for IssuanceDefaults {
    fn default() -> Self {
        Self {
            interest_rate: DEFAULT_INTEREST_RATE,
            maturity_days: DEFAULT_MATURITY_DAYS,
        }
    }
}

impl IssuanceDefaults {
    /// Applies the same bounds `issue_bond` enforces, so a bad config fails
    /// at startup rather than on the first request.
    pub fn validate(&self) -> Result<()> {
        if self.interest_rate < Decimal::ZERO || self.interest_rate > MAX_INTEREST_RATE {
            return Err(MonetizationError::InvalidConfig(format!(
                "default interest_rate must be within [0, {MAX_INTEREST_RATE}], got {}",
                self.interest_rate
            )));
        }
        if self.maturity_days == 0 || self.maturity_days > MAX_MATURITY_DAYS {
            return Err(MonetizationError::InvalidConfig(format!(
                "default maturity_days must be within [1, {MAX_MATURITY_DAYS}], got {}",
                self.maturity_days
            )));
        }
        Ok(())
    }
}

/// Everything the core needs from the outside world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub valuation: RateTable,
    pub issuance: IssuanceDefaults,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.valuation.validate()?;
        self.issuance.validate()
    }
}
