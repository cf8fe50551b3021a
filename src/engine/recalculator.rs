//! Commission recalculation state machine.
//!
//! One pass takes the snapshot, the field the negotiator just edited, and the
//! floor from the minimal-rate service, and returns a snapshot where
//! `commission_bank == default_commission_bank + delta_commission_bank` and the
//! baseline never sits below the floor.

use crate::datasource::{FloorQuery, LookupError, MinimalRateLookup};
use crate::domain::{ChangedField, CommissionSnapshot, Decimal, Offer, RateFloor, ValidationError};
use crate::engine::annualize::{Annualizer, DayCount};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CommissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("minimal rate lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

/// Result of one recalculation pass at full precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recalculation {
    pub snapshot: CommissionSnapshot,
    pub floor: RateFloor,
}

impl Recalculation {
    /// Snapshot with percent fields rounded to 2 decimal places.
    pub fn display_snapshot(&self) -> CommissionSnapshot {
        self.snapshot.rounded_for_display()
    }
}

/// Runs recalculation passes against an external floor lookup.
#[derive(Debug, Clone)]
pub struct CommissionRecalculator {
    lookup: Arc<dyn MinimalRateLookup>,
    reference_year: Option<i32>,
}

impl CommissionRecalculator {
    pub fn new(lookup: Arc<dyn MinimalRateLookup>) -> Self {
        Self {
            lookup,
            reference_year: None,
        }
    }

    /// Pin the calendar year that decides the 365/366 day count.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    fn day_count(&self) -> DayCount {
        match self.reference_year {
            Some(year) => DayCount::for_year(year),
            None => DayCount::current(),
        }
    }

    /// Recalculate the offer's commission after `changed` was edited.
    ///
    /// With `changed == None` the snapshot is discarded and rebuilt from the
    /// offer's requested amount and term. The floor is looked up exactly once,
    /// against the amount and term the pass will compute with.
    ///
    /// # Errors
    /// Validation errors are raised before the lookup; a lookup failure aborts
    /// the pass.
    pub async fn recalculate(
        &self,
        offer: &Offer,
        snapshot: CommissionSnapshot,
        changed: Option<ChangedField>,
    ) -> Result<Recalculation, CommissionError> {
        let snapshot = match changed {
            None => offer.initial_snapshot(),
            Some(_) => snapshot,
        };
        snapshot.validate()?;

        let query = FloorQuery {
            amount: snapshot.amount,
            interval_days: snapshot.interval_days(),
            regime: offer.regime,
            guarantee_types: offer.guarantee_types.clone(),
            bank_code: offer.bank_code.clone(),
        };
        let floor = self.lookup.minimal_rate(&query).await?.unwrap_or_default();
        debug!(
            "Recalculating offer={} changed={:?} floor={}/{}",
            offer.id, changed, floor.commission, floor.percent
        );

        let snapshot = apply_edit(snapshot, changed, floor, self.day_count())?;
        Ok(Recalculation { snapshot, floor })
    }
}

/// Pure transition: derive a consistent snapshot from the edited one.
///
/// # Errors
/// Rejects a non-positive amount or term, and arithmetic overflow.
pub fn apply_edit(
    snapshot: CommissionSnapshot,
    changed: Option<ChangedField>,
    floor: RateFloor,
    day_count: DayCount,
) -> Result<CommissionSnapshot, ValidationError> {
    let rates = Annualizer::new(&snapshot, day_count)?;
    let mut pass = Pass {
        s: snapshot,
        floor,
        rates,
    };

    match changed {
        None => pass.first_calculation()?,
        Some(ChangedField::Amount)
        | Some(ChangedField::IntervalFrom)
        | Some(ChangedField::IntervalTo)
        | Some(ChangedField::DefaultCommissionBank)
        | Some(ChangedField::DeltaCommissionBank) => pass.rederive_percents()?,
        Some(ChangedField::DefaultCommissionPercent) => pass.default_percent_edited()?,
        Some(ChangedField::CommissionBankPercent) => pass.effective_percent_edited()?,
    }

    Ok(pass.s)
}

struct Pass {
    s: CommissionSnapshot,
    floor: RateFloor,
    rates: Annualizer,
}

impl Pass {
    fn first_calculation(&mut self) -> Result<(), ValidationError> {
        self.s.default_commission_bank = Decimal::zero();
        self.s.default_commission_percent = Decimal::zero();
        self.s.delta_commission_bank = Decimal::zero();
        self.s.commission_bank = Decimal::zero();
        self.s.commission_bank_percent = Decimal::zero();
        self.enforce_floor()?;
        self.calculate_commission()
    }

    /// Size, term, baseline or delta amount changed: percents follow amounts.
    fn rederive_percents(&mut self) -> Result<(), ValidationError> {
        self.enforce_floor()?;
        self.calculate_commission()
    }

    fn default_percent_edited(&mut self) -> Result<(), ValidationError> {
        self.s.default_commission_bank = self.rates.deannualize(self.s.default_commission_percent)?;
        self.enforce_floor()?;
        self.calculate_commission()
    }

    /// The delta absorbs the gap between the requested effective rate and the
    /// enforced baseline.
    fn effective_percent_edited(&mut self) -> Result<(), ValidationError> {
        self.enforce_floor()?;
        if self.s.default_commission_percent == self.s.commission_bank_percent {
            self.s.delta_commission_bank = Decimal::zero();
            self.s.commission_bank = self.s.default_commission_bank;
        } else {
            self.s.commission_bank = self.rates.deannualize(self.s.commission_bank_percent)?;
            self.s.delta_commission_bank = self
                .s
                .commission_bank
                .checked_sub(self.s.default_commission_bank)
                .ok_or(ValidationError::Overflow("commission delta"))?;
        }
        Ok(())
    }

    /// Raise the baseline to the floor; otherwise only resync its percent.
    fn enforce_floor(&mut self) -> Result<(), ValidationError> {
        if self.s.default_commission_bank <= self.floor.commission {
            self.s.default_commission_bank = self.floor.commission;
            self.s.default_commission_percent = self.floor.percent;
        } else {
            self.s.default_commission_percent =
                self.rates.annualize(self.s.default_commission_bank)?;
        }
        Ok(())
    }

    fn calculate_commission(&mut self) -> Result<(), ValidationError> {
        self.s.commission_bank = self
            .s
            .default_commission_bank
            .checked_add(self.s.delta_commission_bank)
            .ok_or(ValidationError::Overflow("effective commission"))?;
        self.s.commission_bank_percent = if self.s.delta_commission_bank.is_zero() {
            self.s.default_commission_percent
        } else {
            self.rates.annualize(self.s.commission_bank)?
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(v: rust_decimal::Decimal) -> Decimal {
        Decimal::new(v)
    }

    fn base() -> CommissionSnapshot {
        let from = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        CommissionSnapshot::blank(d(dec!(1000000)), from, from + chrono::Duration::days(30))
    }

    fn floor() -> RateFloor {
        RateFloor::new(d(dec!(5000)), d(dec!(6.08)))
    }

    fn year() -> DayCount {
        DayCount::for_year(2025)
    }

    #[test]
    fn test_first_calculation_clamps_to_floor() {
        let out = apply_edit(base(), None, floor(), year()).unwrap();
        assert_eq!(out.default_commission_bank, d(dec!(5000)));
        assert_eq!(out.default_commission_percent, d(dec!(6.08)));
        assert_eq!(out.delta_commission_bank, Decimal::zero());
        assert_eq!(out.commission_bank, d(dec!(5000)));
        assert_eq!(out.commission_bank_percent, d(dec!(6.08)));
    }

    #[test]
    fn test_first_calculation_discards_commission_fields() {
        let mut s = base();
        s.default_commission_bank = d(dec!(9000));
        s.delta_commission_bank = d(dec!(-100));
        s.commission_bank = d(dec!(8900));
        let out = apply_edit(s, None, floor(), year()).unwrap();
        assert_eq!(out, apply_edit(base(), None, floor(), year()).unwrap());
    }

    #[test]
    fn test_first_calculation_without_floor_is_all_zero() {
        let out = apply_edit(base(), None, RateFloor::none(), year()).unwrap();
        assert!(out.default_commission_bank.is_zero());
        assert!(out.commission_bank.is_zero());
        assert!(out.commission_bank_percent.is_zero());
    }

    #[test]
    fn test_delta_edit_annualizes_effective_commission() {
        let mut s = apply_edit(base(), None, floor(), year()).unwrap();
        s.delta_commission_bank = d(dec!(1000));
        let out = apply_edit(s, Some(ChangedField::DeltaCommissionBank), floor(), year()).unwrap();
        assert_eq!(out.commission_bank, d(dec!(6000)));
        // 6000 * 365 * 100 / 1_000_000 / 30 = 7.3
        assert_eq!(out.commission_bank_percent, d(dec!(7.3)));
        assert_eq!(out.default_commission_bank, d(dec!(5000)));
    }

    #[test]
    fn test_default_amount_above_floor_resyncs_percent() {
        let mut s = base();
        s.default_commission_bank = d(dec!(7300));
        let out = apply_edit(s, Some(ChangedField::DefaultCommissionBank), floor(), year()).unwrap();
        assert_eq!(out.default_commission_bank, d(dec!(7300)));
        // 7300 * 365 * 100 / 1_000_000 / 30
        assert_eq!(out.default_commission_percent.round_dp(4), d(dec!(8.8817)));
        assert_eq!(out.commission_bank_percent, out.default_commission_percent);
    }

    #[test]
    fn test_default_amount_below_floor_is_raised() {
        let mut s = base();
        s.default_commission_bank = d(dec!(10));
        s.delta_commission_bank = d(dec!(-500));
        let out = apply_edit(s, Some(ChangedField::DefaultCommissionBank), floor(), year()).unwrap();
        assert_eq!(out.default_commission_bank, d(dec!(5000)));
        assert_eq!(out.commission_bank, d(dec!(4500)));
    }

    #[test]
    fn test_default_percent_below_floor_clamps() {
        let mut s = base();
        s.default_commission_percent = d(dec!(3));
        let out =
            apply_edit(s, Some(ChangedField::DefaultCommissionPercent), floor(), year()).unwrap();
        assert_eq!(out.default_commission_bank, d(dec!(5000)));
        assert_eq!(out.default_commission_percent, d(dec!(6.08)));
        assert_eq!(out.commission_bank, d(dec!(5000)));
    }

    #[test]
    fn test_default_percent_above_floor_derives_amount() {
        let mut s = base();
        s.default_commission_percent = d(dec!(7.3));
        let out =
            apply_edit(s, Some(ChangedField::DefaultCommissionPercent), floor(), year()).unwrap();
        // 1_000_000 * 0.073 * 30 / 365 = 6000
        assert_eq!(out.default_commission_bank, d(dec!(6000)));
        assert_eq!(out.default_commission_percent.round_dp(2), d(dec!(7.30)));
        assert_eq!(out.commission_bank, d(dec!(6000)));
    }

    #[test]
    fn test_effective_percent_equal_to_default_clears_delta() {
        let mut s = apply_edit(base(), None, floor(), year()).unwrap();
        s.delta_commission_bank = d(dec!(1000));
        s.commission_bank = d(dec!(6000));
        s.commission_bank_percent = d(dec!(6.08));
        let out = apply_edit(s, Some(ChangedField::CommissionBankPercent), floor(), year()).unwrap();
        assert!(out.delta_commission_bank.is_zero());
        assert_eq!(out.commission_bank, d(dec!(5000)));
        assert_eq!(out.commission_bank_percent, d(dec!(6.08)));
    }

    #[test]
    fn test_effective_percent_sets_delta() {
        let mut s = apply_edit(base(), None, floor(), year()).unwrap();
        s.commission_bank_percent = d(dec!(7.3));
        let out = apply_edit(s, Some(ChangedField::CommissionBankPercent), floor(), year()).unwrap();
        assert_eq!(out.commission_bank, d(dec!(6000)));
        assert_eq!(out.delta_commission_bank, d(dec!(1000)));
        assert_eq!(out.commission_bank_percent, d(dec!(7.3)));
    }

    #[test]
    fn test_effective_percent_below_floor_gives_negative_delta() {
        let mut s = apply_edit(base(), None, floor(), year()).unwrap();
        s.commission_bank_percent = d(dec!(3.65));
        let out = apply_edit(s, Some(ChangedField::CommissionBankPercent), floor(), year()).unwrap();
        // 1_000_000 * 0.0365 * 30 / 365 = 3000
        assert_eq!(out.commission_bank, d(dec!(3000)));
        assert_eq!(out.delta_commission_bank, d(dec!(-2000)));
        assert_eq!(out.default_commission_bank, d(dec!(5000)));
    }

    #[test]
    fn test_term_edit_rederives_percents() {
        let mut s = apply_edit(base(), None, RateFloor::none(), year()).unwrap();
        s.default_commission_bank = d(dec!(6000));
        s.delta_commission_bank = d(dec!(1000));
        s.interval_to = s.interval_from + chrono::Duration::days(60);
        let out = apply_edit(s, Some(ChangedField::IntervalTo), RateFloor::none(), year()).unwrap();
        // 6000 * 365 * 100 / 1_000_000 / 60 = 3.65
        assert_eq!(out.default_commission_percent, d(dec!(3.65)));
        assert_eq!(out.commission_bank, d(dec!(7000)));
        assert_eq!(out.commission_bank_percent.round_dp(4), d(dec!(4.2583)));
    }

    #[test]
    fn test_leap_reference_year_changes_annualization() {
        let mut s = base();
        s.default_commission_bank = d(dec!(6000));
        let out = apply_edit(
            s,
            Some(ChangedField::DefaultCommissionBank),
            RateFloor::none(),
            DayCount::for_year(2024),
        )
        .unwrap();
        // 6000 * 366 * 100 / 1_000_000 / 30 = 7.32
        assert_eq!(out.default_commission_percent, d(dec!(7.32)));
    }

    #[test]
    fn test_invariants_hold_for_every_edit() {
        let edits = [
            (ChangedField::Amount, dec!(0)),
            (ChangedField::IntervalFrom, dec!(0)),
            (ChangedField::IntervalTo, dec!(0)),
            (ChangedField::DefaultCommissionBank, dec!(4000)),
            (ChangedField::DeltaCommissionBank, dec!(-750)),
            (ChangedField::DefaultCommissionPercent, dec!(9.5)),
            (ChangedField::CommissionBankPercent, dec!(11.25)),
        ];
        for (field, value) in edits {
            let mut s = apply_edit(base(), None, floor(), year()).unwrap();
            match field {
                ChangedField::DefaultCommissionBank => s.default_commission_bank = d(value),
                ChangedField::DeltaCommissionBank => s.delta_commission_bank = d(value),
                ChangedField::DefaultCommissionPercent => s.default_commission_percent = d(value),
                ChangedField::CommissionBankPercent => s.commission_bank_percent = d(value),
                _ => {}
            }
            let out = apply_edit(s, Some(field), floor(), year()).unwrap();
            assert_eq!(
                out.commission_bank,
                out.default_commission_bank + out.delta_commission_bank,
                "consistency broken after {}",
                field
            );
            assert!(
                out.default_commission_bank >= floor().commission,
                "floor broken after {}",
                field
            );
        }
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        let mut s = base();
        s.interval_to = s.interval_from;
        let err = apply_edit(s, Some(ChangedField::IntervalTo), floor(), year()).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveInterval(0));
    }

    #[test]
    fn test_huge_delta_is_an_overflow_error() {
        let mut s = base();
        s.default_commission_bank = d(dec!(1000000000000000000000000));
        s.delta_commission_bank = Decimal::new(rust_decimal::Decimal::MAX);
        let err =
            apply_edit(s, Some(ChangedField::DeltaCommissionBank), floor(), year()).unwrap_err();
        assert!(matches!(err, ValidationError::Overflow(_)));
    }
}
