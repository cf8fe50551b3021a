//! The guarantee offer that owns a negotiation session.

use crate::domain::{BankCode, BankId, CommissionSnapshot, Decimal, GuaranteeTypes, Regime};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bank-guarantee offer as requested by the applicant.
///
/// The engine reads it for the originally requested amount and term and for
/// the floor lookup profile. Storage belongs to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub bank_id: BankId,
    pub bank_code: BankCode,
    pub regime: Regime,
    pub guarantee_types: GuaranteeTypes,
    /// Requested guaranteed sum.
    pub amount: Decimal,
    pub interval_from: NaiveDate,
    pub interval_to: NaiveDate,
}

impl Offer {
    /// Fresh commission snapshot at the requested amount and term.
    pub fn initial_snapshot(&self) -> CommissionSnapshot {
        CommissionSnapshot::blank(self.amount, self.interval_from, self.interval_to)
    }
}
