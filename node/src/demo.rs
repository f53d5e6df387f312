//! Reference enterprise portfolio: five data assets, one bond each.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use nwu_core::{AssetMetadata, AssetRegistry, BondId, BondManager, DataAsset, DataQuality};

struct ReferenceBond {
    asset_id: &'static str,
    name: &'static str,
    description: &'static str,
    data_type: &'static str,
    volume: i64,
    quality: DataQuality,
    /// Hundredths.
    uniqueness: i64,
    /// Hundredths.
    demand: i64,
    principal: i64,
    /// Percent.
    rate: i64,
    maturity_days: u32,
    issuer: &'static str,
}

const REFERENCE_PORTFOLIO: [ReferenceBond; 5] = [
    ReferenceBond {
        asset_id: "ENT-DATA-001",
        name: "Enterprise Customer Profiles",
        description: "B2B customer data with enrichment",
        data_type: "structured",
        volume: 50_000,
        quality: DataQuality::Premium,
        uniqueness: 92,
        demand: 95,
        principal: 250_000,
        rate: 8,
        maturity_days: 180,
        issuer: "Enterprise-Alpha",
    },
    ReferenceBond {
        asset_id: "TXN-DATA-002",
        name: "E-commerce Transaction Analytics",
        description: "Transaction data with behavioral patterns",
        data_type: "time-series",
        volume: 1_000_000,
        quality: DataQuality::High,
        uniqueness: 88,
        demand: 90,
        principal: 500_000,
        rate: 7,
        maturity_days: 365,
        issuer: "Enterprise-Beta",
    },
    ReferenceBond {
        asset_id: "UBI-DATA-003",
        name: "User Behavior Intelligence",
        description: "ML-enriched user behavior patterns and predictions",
        data_type: "events",
        volume: 2_500_000,
        quality: DataQuality::Premium,
        uniqueness: 95,
        demand: 93,
        principal: 750_000,
        rate: 9,
        maturity_days: 270,
        issuer: "Enterprise-Gamma",
    },
    ReferenceBond {
        asset_id: "FIN-DATA-004",
        name: "Financial Services Analytics",
        description: "Anonymized financial transaction and credit data",
        data_type: "structured",
        volume: 100_000,
        quality: DataQuality::Premium,
        uniqueness: 97,
        demand: 98,
        principal: 1_000_000,
        rate: 10,
        maturity_days: 365,
        issuer: "Enterprise-Delta",
    },
    ReferenceBond {
        asset_id: "HLT-DATA-005",
        name: "Healthcare Analytics Data",
        description: "De-identified healthcare outcomes and treatment data",
        data_type: "structured",
        volume: 75_000,
        quality: DataQuality::Premium,
        uniqueness: 99,
        demand: 96,
        principal: 850_000,
        rate: 11,
        maturity_days: 180,
        issuer: "Enterprise-Epsilon",
    },
];

/// Registers the reference assets and issues their bonds at `issued_at`.
///
/// Assets already present in the registry are reused, so seeding twice
/// issues a second set of bonds without failing.
pub fn seed(
    registry: &mut AssetRegistry,
    manager: &BondManager,
    issued_at: DateTime<Utc>,
) -> nwu_core::Result<Vec<BondId>> {
    let mut bond_ids = Vec::with_capacity(REFERENCE_PORTFOLIO.len());
    for reference in &REFERENCE_PORTFOLIO {
        if registry.get(reference.asset_id).is_err() {
            let asset = DataAsset::new(
                reference.asset_id,
                reference.quality,
                Decimal::new(reference.uniqueness, 2),
                Decimal::new(reference.demand, 2),
                Decimal::from(reference.volume),
            )?
            .with_metadata(AssetMetadata {
                name: reference.name.to_string(),
                description: reference.description.to_string(),
                data_type: reference.data_type.to_string(),
            });
            registry.register(asset)?;
        }

        let asset = registry.get(reference.asset_id)?;
        let bond_id = manager.issue_bond_at(
            asset,
            Decimal::from(reference.principal),
            Decimal::new(reference.rate, 2),
            reference.maturity_days,
            reference.issuer,
            issued_at,
        )?;
        bond_ids.push(bond_id);
    }

    tracing::info!(bonds = bond_ids.len(), "reference portfolio seeded");
    Ok(bond_ids)
}
