//! Error types for the monetization core.
//!
//! Every fallible operation in this crate returns a [`MonetizationError`].
//! All variants are local, recoverable conditions: the caller decides how to
//! surface them (the node maps them onto 4xx responses). None of them is
//! fatal and none is worth retrying, since the core does no I/O.

use thiserror::Error;

use crate::bond::BondStatus;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MonetizationError>;

/// Errors that can occur while valuing assets or managing bonds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonetizationError {
    /// A data asset attribute violates its invariant (score out of range,
    /// negative volume, unknown quality tier, malformed id).
    #[error("invalid asset: {field} {reason}")]
    InvalidAsset {
        /// The offending attribute.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A bond issuance argument is out of bounds.
    #[error("invalid parameter: {field} {reason}")]
    InvalidParameter {
        /// The offending argument.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// No bond with this id is held by the manager.
    #[error("bond not found: {0}")]
    BondNotFound(String),

    /// The bond's lifecycle state does not permit the requested transition.
    #[error("invalid bond state: cannot {operation} bond {bond_id} in status {status}")]
    InvalidBondState {
        /// The bond the transition was attempted on.
        bond_id: String,
        /// The status the bond is currently in.
        status: BondStatus,
        /// The rejected operation ("redeem", "default").
        operation: &'static str,
    },

    /// No asset with this id is registered.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// An asset with this id is already registered.
    #[error("asset already registered: {0}")]
    DuplicateAsset(String),

    /// Engine configuration is inconsistent (e.g. a non-increasing rate table).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of a [`MonetizationError`].
///
/// Lets outer layers map errors onto transport status codes with an
/// exhaustive match instead of string inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent bad input.
    Invalid,
    /// The referenced entity does not exist.
    NotFound,
    /// The request conflicts with the current state.
    Conflict,
}

impl ErrorKind {
    /// Stable lower-case label used in API error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Invalid => "invalid",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
        }
    }
}

impl MonetizationError {
    /// Returns the coarse class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MonetizationError::InvalidAsset { .. }
            | MonetizationError::InvalidParameter { .. }
            | MonetizationError::InvalidConfig(_) => ErrorKind::Invalid,
            MonetizationError::BondNotFound(_) | MonetizationError::AssetNotFound(_) => {
                ErrorKind::NotFound
            }
            MonetizationError::InvalidBondState { .. } | MonetizationError::DuplicateAsset(_) => {
                ErrorKind::Conflict
            }
        }
    }

    pub(crate) fn invalid_asset(field: &'static str, reason: impl Into<String>) -> Self {
        MonetizationError::InvalidAsset {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(field: &'static str, reason: impl Into<String>) -> Self {
        MonetizationError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}
