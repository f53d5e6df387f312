//! Registered data assets, keyed by id.
//!
//! The registry only stores assets; valuation is always recomputed on demand
//! through a [`ValuationEngine`], so an answer never goes stale.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::asset::DataAsset;
use crate::error::{MonetizationError, Result};
use crate::valuation::{MonetizationPotential, ValuationEngine};

/// In-memory asset store. One instance per process (or per test).
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: HashMap<String, DataAsset>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validated asset.
    ///
    /// # Errors
    ///
    /// [`MonetizationError::InvalidAsset`] for a bad asset,
    /// [`MonetizationError::DuplicateAsset`] if the id is taken.
    pub fn register(&mut self, asset: DataAsset) -> Result<()> {
        asset.validate()?;
        if self.assets.contains_key(&asset.asset_id) {
            return Err(MonetizationError::DuplicateAsset(asset.asset_id));
        }
        tracing::debug!(asset_id = %asset.asset_id, quality = %asset.quality, "asset registered");
        self.assets.insert(asset.asset_id.clone(), asset);
        Ok(())
    }

    pub fn get(&self, asset_id: &str) -> Result<&DataAsset> {
        self.assets
            .get(asset_id)
            .ok_or_else(|| MonetizationError::AssetNotFound(asset_id.to_string()))
    }

    pub fn valuate(&self, engine: &ValuationEngine, asset_id: &str) -> Result<Decimal> {
        engine.value(self.get(asset_id)?)
    }

    pub fn potential(
        &self,
        engine: &ValuationEngine,
        asset_id: &str,
    ) -> Result<MonetizationPotential> {
        engine.monetization_potential(self.get(asset_id)?)
    }

    /// Assets worth at least `min_value`, most valuable first (ties by id).
    pub fn list_high_value(
        &self,
        engine: &ValuationEngine,
        min_value: Decimal,
    ) -> Result<Vec<(&DataAsset, Decimal)>> {
        let mut ranked = Vec::new();
        for asset in self.assets.values() {
            let value = engine.value(asset)?;
            if value >= min_value {
                ranked.push((asset, value));
            }
        }
        ranked.sort_by(|(a, va), (b, vb)| vb.cmp(va).then_with(|| a.asset_id.cmp(&b.asset_id)));
        Ok(ranked)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
