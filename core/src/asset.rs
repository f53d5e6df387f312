//! # Data Assets
//!
//! A [`DataAsset`] describes a monetizable data source: how good it is
//! ([`DataQuality`]), how unique, how much the market wants it, and how much
//! of it there is. Valuation never mutates an asset; revaluing simply means
//! running the engine again over the same record.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MonetizationError, Result};

/// Ordinal quality tier. Each tier maps to a base rate in the
/// [`RateTable`](crate::config::RateTable); higher tiers are worth strictly more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataQuality {
    Low,
    Medium,
    High,
    Premium,
}

impl DataQuality {
    /// All tiers, lowest first.
    pub const ALL: [DataQuality; 4] = [
        DataQuality::Low,
        DataQuality::Medium,
        DataQuality::High,
        DataQuality::Premium,
    ];
}

impl fmt::Display for DataQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQuality::Low => write!(f, "LOW"),
            DataQuality::Medium => write!(f, "MEDIUM"),
            DataQuality::High => write!(f, "HIGH"),
            DataQuality::Premium => write!(f, "PREMIUM"),
        }
    }
}

impl FromStr for DataQuality {
    type Err = MonetizationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(DataQuality::Low),
            "MEDIUM" => Ok(DataQuality::Medium),
            "HIGH" => Ok(DataQuality::High),
            "PREMIUM" => Ok(DataQuality::Premium),
            _ => Err(MonetizationError::invalid_asset(
                "quality",
                format!("'{s}' is not one of LOW, MEDIUM, HIGH, PREMIUM"),
            )),
        }
    }
}

/// Descriptive fields carried along with an asset. Never affects its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetMetadata {
    /// Human-readable name, e.g. "Enterprise Customer Profiles".
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Shape of the data: "structured", "time-series", "events", ...
    pub data_type: String,
}

/// A monetizable data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAsset {
    /// Registration id. URL-safe, immutable.
    pub asset_id: String,
    pub quality: DataQuality,
    /// In `[0, 1]`.
    pub uniqueness_score: Decimal,
    /// In `[0, 1]`.
    pub demand_score: Decimal,
    /// Records or size units. Non-negative.
    pub volume: Decimal,
    #[serde(default)]
    pub metadata: AssetMetadata,
}

impl DataAsset {
    /// Builds a validated asset with empty metadata.
    ///
    /// # Errors
    ///
    /// Returns [`MonetizationError::InvalidAsset`] if any attribute violates
    /// its invariant.
    pub fn new(
        asset_id: impl Into<String>,
        quality: DataQuality,
        uniqueness_score: Decimal,
        demand_score: Decimal,
        volume: Decimal,
    ) -> Result<Self> {
        let asset = Self {
            asset_id: asset_id.into(),
            quality,
            uniqueness_score,
            demand_score,
            volume,
            metadata: AssetMetadata::default(),
        };
        asset.validate()?;
        Ok(asset)
    }

    /// Attaches descriptive metadata.
    pub fn with_metadata(mut self, metadata: AssetMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Re-checks every invariant. Fields are public, so anything that
    /// consumes an asset it did not construct calls this first.
    pub fn validate(&self) -> Result<()> {
        validate_asset_id(&self.asset_id)?;
        validate_unit_score("uniqueness_score", self.uniqueness_score)?;
        validate_unit_score("demand_score", self.demand_score)?;
        if self.volume.is_sign_negative() && !self.volume.is_zero() {
            return Err(MonetizationError::invalid_asset(
                "volume",
                format!("must be >= 0, got {}", self.volume),
            ));
        }
        Ok(())
    }
}

/// Ids end up in bond ids and URL paths, so only unreserved characters pass.
pub(crate) fn validate_asset_id(asset_id: &str) -> Result<()> {
    if asset_id.is_empty() {
        return Err(MonetizationError::invalid_asset("asset_id", "must not be empty"));
    }
    if let Some(bad) = asset_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(MonetizationError::invalid_asset(
            "asset_id",
            format!("contains character '{bad}' that is not URL-safe"),
        ));
    }
    Ok(())
}

fn validate_unit_score(field: &'static str, score: Decimal) -> Result<()> {
    if score < Decimal::ZERO || score > Decimal::ONE {
        return Err(MonetizationError::invalid_asset(
            field,
            format!("must be within [0, 1], got {score}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn valid_asset_constructs() {
        let asset = DataAsset::new("ASSET-001", DataQuality::High, dec!(0.8), dec!(0.9), dec!(10000))
            .unwrap();
        assert_eq!(asset.asset_id, "ASSET-001");
        assert_eq!(asset.metadata, AssetMetadata::default());
    }

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(DataAsset::new("A", DataQuality::Low, dec!(0), dec!(1), dec!(0)).is_ok());
        assert!(DataAsset::new("A", DataQuality::Low, dec!(1), dec!(0), dec!(0)).is_ok());
    }

    #[test]
    fn out_of_range_scores_rejected() {
        let err = DataAsset::new("A", DataQuality::Low, dec!(1.01), dec!(0.5), dec!(1)).unwrap_err();
        assert!(matches!(
            err,
            MonetizationError::InvalidAsset { field: "uniqueness_score", .. }
        ));

        let err = DataAsset::new("A", DataQuality::Low, dec!(0.5), dec!(-0.1), dec!(1)).unwrap_err();
        assert!(matches!(
            err,
            MonetizationError::InvalidAsset { field: "demand_score", .. }
        ));
    }

    #[test]
    fn negative_volume_rejected() {
        let err = DataAsset::new("A", DataQuality::Low, dec!(0.5), dec!(0.5), dec!(-1)).unwrap_err();
        assert!(matches!(err, MonetizationError::InvalidAsset { field: "volume", .. }));
    }

    #[test]
    fn unsafe_ids_rejected() {
        assert!(DataAsset::new("", DataQuality::Low, dec!(0), dec!(0), dec!(0)).is_err());
        assert!(DataAsset::new("a/b", DataQuality::Low, dec!(0), dec!(0), dec!(0)).is_err());
        assert!(DataAsset::new("a b", DataQuality::Low, dec!(0), dec!(0), dec!(0)).is_err());
        assert!(DataAsset::new("ENT-DATA_1.v2", DataQuality::Low, dec!(0), dec!(0), dec!(0)).is_ok());
    }

    #[test]
    fn quality_parses_case_insensitively() {
        assert_eq!("premium".parse::<DataQuality>().unwrap(), DataQuality::Premium);
        assert_eq!(" Medium ".parse::<DataQuality>().unwrap(), DataQuality::Medium);
        let err = "ULTRA".parse::<DataQuality>().unwrap_err();
        assert!(matches!(err, MonetizationError::InvalidAsset { field: "quality", .. }));
    }

    #[test]
    fn quality_tiers_are_ordered() {
        assert!(DataQuality::Low < DataQuality::Medium);
        assert!(DataQuality::High < DataQuality::Premium);
        assert_eq!(DataQuality::ALL.len(), 4);
    }

    #[test]
    fn deserializes_without_metadata() {
        let asset: DataAsset = serde_json::from_str(
            r#"{
                "asset_id": "TXN-DATA-002",
                "quality": "HIGH",
                "uniqueness_score": 0.88,
                "demand_score": "0.90",
                "volume": 1000000
            }"#,
        )
        .unwrap();
        assert_eq!(asset.quality, DataQuality::High);
        assert_eq!(asset.demand_score, dec!(0.9));
        assert!(asset.validate().is_ok());
    }
}
