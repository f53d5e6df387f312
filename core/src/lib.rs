// Copyright (c) 2026 AUTOHELIX Quantum Systems. MIT License.
// See LICENSE for details.

//! # NWU Data Monetization — Core Library
//!
//! Turns data assets into money twice over: first by scoring what an asset
//! is worth, then by lending against that worth through liquidity bonds that
//! accrue interest until they are redeemed.
//!
//! ## Architecture
//!
//! - **asset** — `DataAsset` and the four quality tiers.
//! - **valuation** — The pure valuation formula and revenue projections.
//! - **registry** — In-memory asset store keyed by id.
//! - **bond** — `LiquidityBond`, linear accrual, and the lifecycle state machine.
//! - **manager** — `BondManager`, the single owner of every bond.
//! - **portfolio** — Aggregates over a bond set at one instant.
//! - **report** — Plain-text dashboard rendering.
//! - **money** — Cent rounding and `$1,234.56` formatting at the edges.
//! - **config** — Rate tables, issuance defaults, and bounds.
//! - **error** — The crate's single error type.
//!
//! ## Ground Rules
//!
//! 1. Money is `rust_decimal::Decimal`, never `f64`. Rounding happens only
//!    when a value leaves the crate.
//! 2. Every time-dependent query takes an explicit `as_of` instant, so the
//!    same inputs always give the same answer.
//! 3. Bond state only moves forward. Terminal bonds keep their value.

pub mod asset;
pub mod bond;
pub mod config;
pub mod error;
pub mod manager;
pub mod money;
pub mod portfolio;
pub mod registry;
pub mod report;
pub mod valuation;

pub use asset::{AssetMetadata, DataAsset, DataQuality};
pub use bond::{BondId, BondState, BondStatus, BondTerms, LiquidityBond, Settlement};
pub use config::{EngineConfig, IssuanceDefaults, RateTable};
pub use error::{ErrorKind, MonetizationError, Result};
pub use manager::BondManager;
pub use portfolio::{BondPerformance, MaturityBuckets, PortfolioMetrics, ScheduledMaturity};
pub use registry::AssetRegistry;
pub use valuation::{MonetizationPotential, ValuationEngine};
