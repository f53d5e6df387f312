//! # Liquidity Bonds
//!
//! A liquidity bond is principal lent against the valuation of a data asset.
//! It accrues **linear** interest from its issue date until the term has
//! fully elapsed, and is then worth its nominal maturity value until it is
//! redeemed:
//!
//! ```text
//! days_elapsed  = clamp(as_of - issue_date, 0, maturity_days)     (whole days)
//! current_value = principal + principal * rate * days_elapsed / maturity_days
//! ```
//!
//! The current value is never stored. It is recomputed from the immutable
//! issuance fields and a caller-supplied instant, so it cannot go stale.
//!
//! ## State Machine
//!
//! ```text
//!   issue ──► ACTIVE ──(term elapsed, observed)──► MATURED
//!               │  │                                 │  │
//!               │  └──────────── redeem ─────────────┼──┼──► REDEEMED
//!               └─────────────── default ────────────┘  └──► DEFAULTED
//! ```
//!
//! Transitions only move forward. `REDEEMED` and `DEFAULTED` are terminal and
//! freeze the bond's value; redeeming or defaulting a terminal bond is an
//! error rather than a no-op so double redemptions surface immediately.
//!
//! `MATURED` is never recorded. An outstanding bond reads as `MATURED` at any
//! instant on or after its maturity date and as `ACTIVE` before it, so every
//! query is a function of the bond and the `as_of` instant alone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{MAX_INTEREST_RATE, MAX_MATURITY_DAYS, MAX_PRINCIPAL};
use crate::error::{MonetizationError, Result};

/// Opaque, URL-safe bond identifier.
pub type BondId = String;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Externally visible lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BondStatus {
    /// Accruing interest.
    Active,
    /// Term fully elapsed; value capped at the nominal maturity value.
    Matured,
    /// Terminal. Value frozen at redemption.
    Redeemed,
    /// Terminal. Value frozen at the time of default.
    Defaulted,
}

impl BondStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [BondStatus; 4] = [
        BondStatus::Active,
        BondStatus::Matured,
        BondStatus::Redeemed,
        BondStatus::Defaulted,
    ];

    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BondStatus::Redeemed | BondStatus::Defaulted)
    }

    /// Returns `true` for statuses that still await settlement.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, BondStatus::Active | BondStatus::Matured)
    }
}

impl fmt::Display for BondStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondStatus::Active => write!(f, "ACTIVE"),
            BondStatus::Matured => write!(f, "MATURED"),
            BondStatus::Redeemed => write!(f, "REDEEMED"),
            BondStatus::Defaulted => write!(f, "DEFAULTED"),
        }
    }
}

impl FromStr for BondStatus {
    type Err = MonetizationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(BondStatus::Active),
            "MATURED" => Ok(BondStatus::Matured),
            "REDEEMED" => Ok(BondStatus::Redeemed),
            "DEFAULTED" => Ok(BondStatus::Defaulted),
            _ => Err(MonetizationError::invalid_parameter(
                "status",
                format!("'{s}' is not one of ACTIVE, MATURED, REDEEMED, DEFAULTED"),
            )),
        }
    }
}

/// Recorded lifecycle state, carrying the frozen settlement record once
/// terminal. `Outstanding` covers both `ACTIVE` and `MATURED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BondState {
    Outstanding,
    Redeemed {
        value: Decimal,
        redeemed_at: DateTime<Utc>,
    },
    Defaulted {
        value: Decimal,
        defaulted_at: DateTime<Utc>,
        reason: String,
    },
}

impl BondState {
    /// The terminal status, or `None` while the bond is outstanding.
    pub fn terminal_status(&self) -> Option<BondStatus> {
        match self {
            BondState::Outstanding => None,
            BondState::Redeemed { .. } => Some(BondStatus::Redeemed),
            BondState::Defaulted { .. } => Some(BondStatus::Defaulted),
        }
    }

    /// The frozen value, if the bond is terminal.
    pub fn frozen_value(&self) -> Option<Decimal> {
        match self {
            BondState::Outstanding => None,
            BondState::Redeemed { value, .. } | BondState::Defaulted { value, .. } => Some(*value),
        }
    }

    /// The settlement record, if the bond is terminal.
    pub fn settlement(&self) -> Option<Settlement<'_>> {
        match self {
            BondState::Outstanding => None,
            BondState::Redeemed { value, redeemed_at } => Some(Settlement {
                value: *value,
                at: *redeemed_at,
                reason: None,
            }),
            BondState::Defaulted {
                value,
                defaulted_at,
                reason,
            } => Some(Settlement {
                value: *value,
                at: *defaulted_at,
                reason: Some(reason),
            }),
        }
    }
}

/// How a terminal bond was closed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement<'a> {
    pub value: Decimal,
    pub at: DateTime<Utc>,
    /// Set for defaults only.
    pub reason: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// Everything fixed at issuance except the id and issue date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondTerms {
    /// The backing asset. A relation only; the bond does not own the asset.
    pub asset_id: String,
    pub principal: Decimal,
    /// Annualized rate, e.g. `0.08` for 8%.
    pub interest_rate: Decimal,
    pub maturity_days: u32,
    pub issuer: String,
    #[serde(default)]
    pub holder: Option<String>,
}

impl BondTerms {
    /// Checks the issuance bounds.
    ///
    /// # Errors
    ///
    /// Returns [`MonetizationError::InvalidParameter`] if principal ≤ 0,
    /// rate < 0, maturity_days = 0, any value is beyond its upper bound, or
    /// the issuer is blank.
    pub fn validate(&self) -> Result<()> {
        if self.principal <= Decimal::ZERO {
            return Err(MonetizationError::invalid_parameter(
                "principal",
                format!("must be > 0, got {}", self.principal),
            ));
        }
        if self.principal > MAX_PRINCIPAL {
            return Err(MonetizationError::invalid_parameter(
                "principal",
                format!("must be <= {MAX_PRINCIPAL}, got {}", self.principal),
            ));
        }
        if self.interest_rate < Decimal::ZERO {
            return Err(MonetizationError::invalid_parameter(
                "interest_rate",
                format!("must be >= 0, got {}", self.interest_rate),
            ));
        }
        if self.interest_rate > MAX_INTEREST_RATE {
            return Err(MonetizationError::invalid_parameter(
                "interest_rate",
                format!("must be <= {MAX_INTEREST_RATE}, got {}", self.interest_rate),
            ));
        }
        if self.maturity_days == 0 {
            return Err(MonetizationError::invalid_parameter(
                "maturity_days",
                "must be > 0",
            ));
        }
        if self.maturity_days > MAX_MATURITY_DAYS {
            return Err(MonetizationError::invalid_parameter(
                "maturity_days",
                format!("must be <= {MAX_MATURITY_DAYS}, got {}", self.maturity_days),
            ));
        }
        if self.issuer.trim().is_empty() {
            return Err(MonetizationError::invalid_parameter(
                "issuer",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bond
// ---------------------------------------------------------------------------

/// A liquidity bond. Only [`BondManager`](crate::manager::BondManager)
/// mutates one; everything handed out is a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidityBond {
    bond_id: BondId,
    asset_id: String,
    principal: Decimal,
    interest_rate: Decimal,
    maturity_days: u32,
    issue_date: DateTime<Utc>,
    issuer: String,
    holder: Option<String>,
    /// Issuance order within the owning manager; breaks issue-date ties.
    sequence: u64,
    state: BondState,
}

impl LiquidityBond {
    /// Creates an `ACTIVE` bond from already-validated terms.
    pub(crate) fn issue(
        bond_id: BondId,
        terms: BondTerms,
        issue_date: DateTime<Utc>,
        sequence: u64,
    ) -> Self {
        Self {
            bond_id,
            asset_id: terms.asset_id,
            principal: terms.principal,
            interest_rate: terms.interest_rate,
            maturity_days: terms.maturity_days,
            issue_date,
            issuer: terms.issuer,
            holder: terms.holder,
            sequence,
            state: BondState::Outstanding,
        }
    }

    pub fn bond_id(&self) -> &str {
        &self.bond_id
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn interest_rate(&self) -> Decimal {
        self.interest_rate
    }

    pub fn maturity_days(&self) -> u32 {
        self.maturity_days
    }

    pub fn issue_date(&self) -> DateTime<Utc> {
        self.issue_date
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn state(&self) -> &BondState {
        &self.state
    }

    pub fn settlement(&self) -> Option<Settlement<'_>> {
        self.state.settlement()
    }

    /// Status observed at `as_of`. Terminal statuses hold at every instant.
    pub fn status_at(&self, as_of: DateTime<Utc>) -> BondStatus {
        match self.state.terminal_status() {
            Some(status) => status,
            None if self.term_elapsed(as_of) => BondStatus::Matured,
            None => BondStatus::Active,
        }
    }

    pub fn maturity_date(&self) -> DateTime<Utc> {
        self.issue_date + Duration::days(i64::from(self.maturity_days))
    }

    /// Whole days of accrual at `as_of`, clamped to `[0, maturity_days]`.
    pub fn days_elapsed(&self, as_of: DateTime<Utc>) -> u32 {
        let days = (as_of - self.issue_date).num_days();
        // Clamped to the u32 term, so the cast is lossless.
        days.clamp(0, i64::from(self.maturity_days)) as u32
    }

    pub fn days_remaining(&self, as_of: DateTime<Utc>) -> u32 {
        self.maturity_days - self.days_elapsed(as_of)
    }

    fn term_elapsed(&self, as_of: DateTime<Utc>) -> bool {
        self.days_elapsed(as_of) >= self.maturity_days
    }

    /// Nominal value once the full term has accrued.
    pub fn maturity_value(&self) -> Decimal {
        self.principal + self.principal * self.interest_rate
    }

    /// Linear accrual, ignoring the lifecycle state.
    fn accrued_value(&self, as_of: DateTime<Utc>) -> Decimal {
        let elapsed = Decimal::from(self.days_elapsed(as_of));
        let term = Decimal::from(self.maturity_days);
        self.principal + self.principal * self.interest_rate * elapsed / term
    }

    /// Value at `as_of`. Terminal bonds return their frozen value.
    pub fn current_value(&self, as_of: DateTime<Utc>) -> Decimal {
        self.state
            .frozen_value()
            .unwrap_or_else(|| self.accrued_value(as_of))
    }

    pub fn interest_earned(&self, as_of: DateTime<Utc>) -> Decimal {
        self.current_value(as_of) - self.principal
    }

    /// `(current_value - principal) / principal`.
    pub fn roi(&self, as_of: DateTime<Utc>) -> Decimal {
        self.interest_earned(as_of) / self.principal
    }

    pub fn roi_percentage(&self, as_of: DateTime<Utc>) -> Decimal {
        self.roi(as_of) * Decimal::ONE_HUNDRED
    }

    // -- transitions (manager only) ------------------------------------------

    /// Freezes the value at `as_of` and moves to `REDEEMED`.
    ///
    /// # Errors
    ///
    /// Returns [`MonetizationError::InvalidBondState`] if the bond is
    /// already terminal.
    pub(crate) fn redeem(&mut self, as_of: DateTime<Utc>) -> Result<Decimal> {
        self.ensure_outstanding("redeem")?;
        let value = self.accrued_value(as_of);
        self.state = BondState::Redeemed {
            value,
            redeemed_at: as_of.max(self.issue_date),
        };
        Ok(value)
    }

    /// Freezes the value at `as_of` and moves to `DEFAULTED`.
    ///
    /// # Errors
    ///
    /// [`MonetizationError::InvalidBondState`] if already terminal,
    /// [`MonetizationError::InvalidParameter`] for a blank reason.
    pub(crate) fn mark_defaulted(&mut self, reason: &str, as_of: DateTime<Utc>) -> Result<Decimal> {
        self.ensure_outstanding("default")?;
        if reason.trim().is_empty() {
            return Err(MonetizationError::invalid_parameter(
                "reason",
                "must not be empty",
            ));
        }
        let value = self.accrued_value(as_of);
        self.state = BondState::Defaulted {
            value,
            defaulted_at: as_of.max(self.issue_date),
            reason: reason.to_string(),
        };
        Ok(value)
    }

    fn ensure_outstanding(&self, operation: &'static str) -> Result<()> {
        match self.state.terminal_status() {
            None => Ok(()),
            Some(status) => Err(MonetizationError::InvalidBondState {
                bond_id: self.bond_id.clone(),
                status,
                operation,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn day(n: i64) -> DateTime<Utc> {
        t0() + Duration::days(n)
    }

    fn terms(principal: Decimal, rate: Decimal, maturity_days: u32) -> BondTerms {
        BondTerms {
            asset_id: "ENT-DATA-001".into(),
            principal,
            interest_rate: rate,
            maturity_days,
            issuer: "Enterprise-Alpha".into(),
            holder: None,
        }
    }

    fn bond(principal: Decimal, rate: Decimal, maturity_days: u32) -> LiquidityBond {
        let terms = terms(principal, rate, maturity_days);
        terms.validate().unwrap();
        LiquidityBond::issue("LB-TEST".into(), terms, t0(), 1)
    }

    #[test]
    fn new_bond_is_active_at_principal() {
        let b = bond(dec!(250000), dec!(0.08), 180);
        assert_eq!(b.status_at(t0()), BondStatus::Active);
        assert_eq!(b.current_value(t0()), dec!(250000));
        assert_eq!(b.roi(t0()), Decimal::ZERO);
    }

    #[test]
    fn half_term_accrual() {
        let b = bond(dec!(250000), dec!(0.08), 180);
        assert_eq!(b.days_elapsed(day(90)), 90);
        assert_eq!(b.current_value(day(90)), dec!(260000));
        assert_eq!(b.interest_earned(day(90)), dec!(10000));
        assert_eq!(b.roi_percentage(day(90)), dec!(4));
    }

    #[test]
    fn accrual_caps_at_maturity() {
        let b = bond(dec!(250000), dec!(0.08), 180);
        assert_eq!(b.current_value(day(180)), dec!(270000));
        assert_eq!(b.current_value(day(400)), dec!(270000));
        assert_eq!(b.maturity_value(), dec!(270000));
        assert_eq!(b.days_remaining(day(400)), 0);
    }

    #[test]
    fn before_issue_clamps_to_zero() {
        let b = bond(dec!(1000), dec!(0.10), 30);
        assert_eq!(b.days_elapsed(day(-5)), 0);
        assert_eq!(b.current_value(day(-5)), dec!(1000));
    }

    #[test]
    fn partial_days_do_not_accrue() {
        let b = bond(dec!(3650), dec!(0.10), 365);
        let almost_one_day = t0() + Duration::hours(23);
        assert_eq!(b.current_value(almost_one_day), dec!(3650));
        assert_eq!(b.current_value(day(1)), dec!(3651));
    }

    #[test]
    fn zero_rate_never_grows() {
        let b = bond(dec!(500), Decimal::ZERO, 10);
        assert_eq!(b.current_value(day(10)), dec!(500));
    }

    #[test]
    fn maturity_depends_only_on_the_instant() {
        let b = bond(dec!(1000), dec!(0.05), 90);
        assert_eq!(b.status_at(day(89)), BondStatus::Active);
        assert_eq!(b.status_at(day(90)), BondStatus::Matured);
        assert_eq!(b.status_at(day(400)), BondStatus::Matured);
        // Asking about a later instant does not change earlier answers.
        assert_eq!(b.status_at(day(10)), BondStatus::Active);
        assert_eq!(b.days_remaining(day(10)), 80);
        assert_eq!(b.state(), &BondState::Outstanding);
        assert_eq!(b.maturity_date(), day(90));
    }

    #[test]
    fn redeem_freezes_value() {
        let mut b = bond(dec!(250000), dec!(0.08), 180);
        let value = b.redeem(day(90)).unwrap();
        assert_eq!(value, dec!(260000));
        assert_eq!(b.status_at(day(10)), BondStatus::Redeemed);
        assert_eq!(b.current_value(day(180)), dec!(260000));
        assert_eq!(
            b.state(),
            &BondState::Redeemed {
                value: dec!(260000),
                redeemed_at: day(90),
            }
        );
        let settlement = b.settlement().unwrap();
        assert_eq!(settlement.value, dec!(260000));
        assert_eq!(settlement.reason, None);
    }

    #[test]
    fn double_redeem_rejected() {
        let mut b = bond(dec!(1000), dec!(0.05), 90);
        b.redeem(day(30)).unwrap();
        let err = b.redeem(day(60)).unwrap_err();
        assert!(matches!(
            err,
            MonetizationError::InvalidBondState {
                status: BondStatus::Redeemed,
                operation: "redeem",
                ..
            }
        ));
        assert_eq!(b.current_value(day(90)), b.state().frozen_value().unwrap());
    }

    #[test]
    fn matured_bond_redeems_at_nominal_value() {
        let mut b = bond(dec!(1000), dec!(0.05), 90);
        assert_eq!(b.status_at(day(200)), BondStatus::Matured);
        assert_eq!(b.redeem(day(200)).unwrap(), dec!(1050));
    }

    #[test]
    fn default_freezes_value_and_is_terminal() {
        let mut b = bond(dec!(1000), dec!(0.10), 100);
        assert_eq!(b.mark_defaulted("issuer insolvent", day(50)).unwrap(), dec!(1050));
        assert_eq!(b.status_at(day(100)), BondStatus::Defaulted);
        assert_eq!(b.current_value(day(100)), dec!(1050));
        let settlement = b.settlement().unwrap();
        assert_eq!(settlement.at, day(50));
        assert_eq!(settlement.reason, Some("issuer insolvent"));
        assert!(b.redeem(day(60)).is_err());
        assert!(b.mark_defaulted("again", day(60)).is_err());
    }

    #[test]
    fn default_requires_reason() {
        let mut b = bond(dec!(1000), dec!(0.10), 100);
        assert!(matches!(
            b.mark_defaulted("  ", day(1)),
            Err(MonetizationError::InvalidParameter { field: "reason", .. })
        ));
        assert_eq!(b.state(), &BondState::Outstanding);
    }

    #[test]
    fn terms_validation() {
        assert!(terms(dec!(0), dec!(0.05), 90).validate().is_err());
        assert!(terms(dec!(-1), dec!(0.05), 90).validate().is_err());
        assert!(terms(dec!(100), dec!(-0.01), 90).validate().is_err());
        assert!(terms(dec!(100), dec!(0.05), 0).validate().is_err());
        assert!(terms(dec!(100), dec!(11), 90).validate().is_err());
        assert!(terms(dec!(100), dec!(0.05), MAX_MATURITY_DAYS + 1).validate().is_err());
        assert!(terms(MAX_PRINCIPAL + Decimal::ONE, dec!(0.05), 90).validate().is_err());
        assert!(terms(dec!(100), Decimal::ZERO, 1).validate().is_ok());

        let mut blank_issuer = terms(dec!(100), dec!(0.05), 90);
        blank_issuer.issuer = " ".into();
        assert!(matches!(
            blank_issuer.validate(),
            Err(MonetizationError::InvalidParameter { field: "issuer", .. })
        ));
    }

    #[test]
    fn status_parses_and_displays() {
        for status in BondStatus::ALL {
            assert_eq!(status.to_string().parse::<BondStatus>().unwrap(), status);
        }
        assert!("pending".parse::<BondStatus>().is_err());
        assert!(BondStatus::Redeemed.is_terminal());
        assert!(BondStatus::Matured.is_outstanding());
    }

    #[test]
    fn bond_serializes_with_tagged_state() {
        let mut b = bond(dec!(1000), dec!(0.05), 90);
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["state"]["state"], "outstanding");

        b.mark_defaulted("missed coupon", day(10)).unwrap();
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["state"]["state"], "defaulted");
        assert_eq!(json["state"]["reason"], "missed coupon");
        assert_eq!(json["principal"], "1000");
    }
}
