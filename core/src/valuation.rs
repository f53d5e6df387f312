//! # Data Valuation Engine
//!
//! Scores a [`DataAsset`] into a monetary value:
//!
//! ```text
//! base_value = volume * rate[quality] * (1 + uniqueness * 2) * (1 + demand * 3)
//! ```
//!
//! Everything here is a pure function of the asset and the engine's rate
//! table. The arithmetic is exact `Decimal`, so valuing the same asset twice
//! yields identical results, and higher scores never lower the value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::asset::DataAsset;
use crate::config::{
    RateTable, ANNUAL_REVENUE_FACTOR, DEMAND_WEIGHT, MONTHLY_REVENUE_FACTOR, UNIQUENESS_WEIGHT,
};
use crate::error::{MonetizationError, Result};

/// Value and revenue projections for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetizationPotential {
    pub current_value: Decimal,
    pub monthly_revenue_potential: Decimal,
    pub annual_revenue_potential: Decimal,
    /// Demand score expressed as a percentage.
    pub projected_roi_percentage: Decimal,
}

/// Stateless valuation over a fixed [`RateTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValuationEngine {
    rates: RateTable,
}

impl ValuationEngine {
    /// Creates an engine over a validated rate table.
    ///
    /// # Errors
    ///
    /// Returns [`MonetizationError::InvalidConfig`] if the table is not
    /// positive and strictly increasing.
    pub fn new(rates: RateTable) -> Result<Self> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Computes the asset's base value.
    ///
    /// # Errors
    ///
    /// Returns [`MonetizationError::InvalidAsset`] if the asset violates an
    /// invariant, or if its volume is too large to value without overflow.
    pub fn value(&self, asset: &DataAsset) -> Result<Decimal> {
        asset.validate()?;

        let uniqueness_bonus = Decimal::ONE + asset.uniqueness_score * UNIQUENESS_WEIGHT;
        let demand_bonus = Decimal::ONE + asset.demand_score * DEMAND_WEIGHT;

        asset
            .volume
            .checked_mul(self.rates.rate(asset.quality))
            .and_then(|v| v.checked_mul(uniqueness_bonus))
            .and_then(|v| v.checked_mul(demand_bonus))
            .ok_or_else(|| {
                MonetizationError::invalid_asset(
                    "volume",
                    format!("{} is too large to value", asset.volume),
                )
            })
    }

    /// Expected monthly revenue: 5% of the base value.
    pub fn monthly_revenue(&self, asset: &DataAsset) -> Result<Decimal> {
        Ok(self.value(asset)? * MONTHLY_REVENUE_FACTOR)
    }

    /// Expected annual revenue: 60% of the base value.
    pub fn annual_revenue(&self, asset: &DataAsset) -> Result<Decimal> {
        Ok(self.value(asset)? * ANNUAL_REVENUE_FACTOR)
    }

    /// Value plus every derived projection in one pass.
    pub fn monetization_potential(&self, asset: &DataAsset) -> Result<MonetizationPotential> {
        let value = self.value(asset)?;
        Ok(MonetizationPotential {
            current_value: value,
            monthly_revenue_potential: value * MONTHLY_REVENUE_FACTOR,
            annual_revenue_potential: value * ANNUAL_REVENUE_FACTOR,
            projected_roi_percentage: asset.demand_score * Decimal::ONE_HUNDRED,
        })
    }
}
