//! Conversion between a commission amount and its annualized percent.

use crate::domain::{CommissionSnapshot, Decimal, ValidationError};
use chrono::{Datelike, Local, NaiveDate};

/// Year length used to annualize commissions.
///
/// The leap-year decision follows the calendar year at computation time, not
/// the year the guarantee term falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount {
    days_in_year: i64,
}

impl DayCount {
    pub fn for_year(year: i32) -> Self {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        Self { days_in_year }
    }

    /// Day count of the current local calendar year.
    pub fn current() -> Self {
        Self::for_year(Local::now().year())
    }

    pub fn days_in_year(&self) -> i64 {
        self.days_in_year
    }
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Percent/amount converter for one deal size and term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annualizer {
    amount: Decimal,
    interval_days: Decimal,
    days_in_year: Decimal,
}

impl Annualizer {
    /// Build a converter for the snapshot's amount and term.
    ///
    /// # Errors
    /// Rejects a non-positive term or amount, both of which are divisors.
    pub fn new(snapshot: &CommissionSnapshot, day_count: DayCount) -> Result<Self, ValidationError> {
        snapshot.validate()?;
        Ok(Self {
            amount: snapshot.amount,
            interval_days: Decimal::from_i64(snapshot.interval_days()),
            days_in_year: Decimal::from_i64(day_count.days_in_year()),
        })
    }

    /// `commission * days_in_year * 100 / amount / interval_days`
    pub fn annualize(&self, commission: Decimal) -> Result<Decimal, ValidationError> {
        commission
            .checked_mul(self.days_in_year)
            .and_then(|v| v.checked_mul(Decimal::hundred()))
            .and_then(|v| v.checked_div(self.amount))
            .and_then(|v| v.checked_div(self.interval_days))
            .ok_or(ValidationError::Overflow("annualized percent"))
    }

    /// `amount * (percent / 100) * interval_days / days_in_year`
    pub fn deannualize(&self, percent: Decimal) -> Result<Decimal, ValidationError> {
        percent
            .checked_div(Decimal::hundred())
            .and_then(|rate| self.amount.checked_mul(rate))
            .and_then(|v| v.checked_mul(self.interval_days))
            .and_then(|v| v.checked_div(self.days_in_year))
            .ok_or(ValidationError::Overflow("commission amount"))
    }
}
