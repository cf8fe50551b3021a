//! Commission snapshot, the edited field, and the floor returned by the rate lookup.

use crate::domain::Decimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Rejections raised before any commission math runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown changed field: {0}")]
    UnknownField(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid decimal in {field}: {value}")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("invalid date in {field}: {value}")]
    InvalidDate { field: &'static str, value: String },
    #[error("guarantee term must be at least one day, got {0} days")]
    NonPositiveInterval(i64),
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("{0}")]
    Tag(#[from] crate::domain::TagParseError),
    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

/// The single field a negotiator just edited.
///
/// Absent (`None` at the call site) means the first calculation for an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    Amount,
    IntervalFrom,
    IntervalTo,
    DefaultCommissionBank,
    DeltaCommissionBank,
    DefaultCommissionPercent,
    CommissionBankPercent,
}

impl ChangedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangedField::Amount => "amount",
            ChangedField::IntervalFrom => "interval_from",
            ChangedField::IntervalTo => "interval_to",
            ChangedField::DefaultCommissionBank => "default_commission_bank",
            ChangedField::DeltaCommissionBank => "delta_commission_bank",
            ChangedField::DefaultCommissionPercent => "default_commission_percent",
            ChangedField::CommissionBankPercent => "commission_bank_percent",
        }
    }

    /// Parse the wire value; a blank string means nothing was edited yet.
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<ChangedField>, ValidationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

impl FromStr for ChangedField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amount" => Ok(ChangedField::Amount),
            "interval_from" => Ok(ChangedField::IntervalFrom),
            "interval_to" => Ok(ChangedField::IntervalTo),
            "default_commission_bank" => Ok(ChangedField::DefaultCommissionBank),
            "delta_commission_bank" => Ok(ChangedField::DeltaCommissionBank),
            "default_commission_percent" => Ok(ChangedField::DefaultCommissionPercent),
            "commission_bank_percent" => Ok(ChangedField::CommissionBankPercent),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

impl std::fmt::Display for ChangedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commission fields of one offer under negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSnapshot {
    /// Guaranteed sum the commission is computed against.
    pub amount: Decimal,
    pub interval_from: NaiveDate,
    pub interval_to: NaiveDate,
    /// Bank baseline commission as an amount.
    pub default_commission_bank: Decimal,
    /// Bank baseline commission as an annualized percent.
    pub default_commission_percent: Decimal,
    /// Negotiator adjustment on top of the baseline amount.
    pub delta_commission_bank: Decimal,
    /// Effective commission: baseline plus delta.
    pub commission_bank: Decimal,
    pub commission_bank_percent: Decimal,
}

impl CommissionSnapshot {
    /// Snapshot with the given deal size and term and every commission field at zero.
    pub fn blank(amount: Decimal, interval_from: NaiveDate, interval_to: NaiveDate) -> Self {
        Self {
            amount,
            interval_from,
            interval_to,
            default_commission_bank: Decimal::zero(),
            default_commission_percent: Decimal::zero(),
            delta_commission_bank: Decimal::zero(),
            commission_bank: Decimal::zero(),
            commission_bank_percent: Decimal::zero(),
        }
    }

    /// Calendar days between the term bounds; may be zero or negative on bad input.
    pub fn interval_days(&self) -> i64 {
        (self.interval_to - self.interval_from).num_days()
    }

    /// Check the deal size and term that every percent conversion divides by.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let days = self.interval_days();
        if days <= 0 {
            return Err(ValidationError::NonPositiveInterval(days));
        }
        if !self.amount.is_positive() {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }

    /// Copy with both percent fields rounded to 2 decimal places for display.
    pub fn rounded_for_display(&self) -> Self {
        Self {
            default_commission_percent: self.default_commission_percent.round_dp(2),
            commission_bank_percent: self.commission_bank_percent.round_dp(2),
            ..self.clone()
        }
    }
}

/// Minimal commission a bank or regulator permits for a deal profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateFloor {
    pub commission: Decimal,
    pub percent: Decimal,
}

impl RateFloor {
    pub fn new(commission: Decimal, percent: Decimal) -> Self {
        Self {
            commission,
            percent,
        }
    }

    /// No rule matched: nothing is enforced.
    pub fn none() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_changed_field_parse() {
        assert_eq!(
            ChangedField::parse_optional(Some("delta_commission_bank")).unwrap(),
            Some(ChangedField::DeltaCommissionBank)
        );
        assert_eq!(ChangedField::parse_optional(None).unwrap(), None);
        assert_eq!(ChangedField::parse_optional(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_changed_field_unknown() {
        let err = ChangedField::parse_optional(Some("commission_agent")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownField("commission_agent".to_string())
        );
    }

    #[test]
    fn test_interval_days() {
        let s = CommissionSnapshot::blank(
            Decimal::new(dec!(1000000)),
            date("2024-02-01"),
            date("2024-03-02"),
        );
        assert_eq!(s.interval_days(), 30);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_term() {
        let s = CommissionSnapshot::blank(
            Decimal::new(dec!(1000000)),
            date("2024-02-01"),
            date("2024-02-01"),
        );
        assert_eq!(s.validate(), Err(ValidationError::NonPositiveInterval(0)));
    }

    #[test]
    fn test_validate_rejects_inverted_term() {
        let s = CommissionSnapshot::blank(
            Decimal::new(dec!(1000000)),
            date("2024-02-10"),
            date("2024-02-01"),
        );
        assert_eq!(s.validate(), Err(ValidationError::NonPositiveInterval(-9)));
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let s = CommissionSnapshot::blank(Decimal::zero(), date("2024-02-01"), date("2024-03-01"));
        assert!(matches!(
            s.validate(),
            Err(ValidationError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_rounded_for_display_only_touches_percents() {
        let mut s = CommissionSnapshot::blank(
            Decimal::new(dec!(1000000)),
            date("2024-02-01"),
            date("2024-03-02"),
        );
        s.default_commission_bank = Decimal::new(dec!(5000.125));
        s.default_commission_percent = Decimal::new(dec!(6.083333));
        s.commission_bank_percent = Decimal::new(dec!(7.3049));

        let r = s.rounded_for_display();
        assert_eq!(r.default_commission_bank, s.default_commission_bank);
        assert_eq!(r.default_commission_percent.inner(), dec!(6.08));
        assert_eq!(r.commission_bank_percent.inner(), dec!(7.30));
    }
}
