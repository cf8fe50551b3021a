//! Domain types for commission negotiation.
//!
//! This module provides:
//! - Lossless money handling via the Decimal wrapper
//! - Domain primitives: BankId, BankCode, GuaranteeType, Regime
//! - The commission snapshot, the edited field, and the rate floor
//! - Offers and reward rate tiers

pub mod decimal;
pub mod offer;
pub mod primitives;
pub mod snapshot;
pub mod tier;

pub use decimal::Decimal;
pub use offer::Offer;
pub use primitives::{
    join_guarantee_types, parse_guarantee_types, BankCode, BankId, GuaranteeType, GuaranteeTypes,
    Regime, TagParseError,
};
pub use snapshot::{ChangedField, CommissionSnapshot, RateFloor, ValidationError};
pub use tier::{NewRateTier, RateTier};
