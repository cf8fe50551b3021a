//! Bank-configured reward rate tiers.

use crate::domain::{BankId, Decimal, GuaranteeType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (bank, guarantee type, amount range) reward rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTier {
    pub id: i64,
    pub bank_id: BankId,
    pub guarantee_type: GuaranteeType,
    pub limit_from: Option<Decimal>,
    pub limit_to: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub commission_on_excess: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl RateTier {
    /// `limit_from <= amount <= limit_to`; a missing bound never matches.
    pub fn contains(&self, amount: Decimal) -> bool {
        match (self.limit_from, self.limit_to) {
            (Some(from), Some(to)) => from <= amount && amount <= to,
            _ => false,
        }
    }

    /// `limit_from <= amount` with the upper bound ignored.
    pub fn starts_at_or_below(&self, amount: Decimal) -> bool {
        self.limit_from.map_or(false, |from| from <= amount)
    }

    /// Commission usable for rewards: present and strictly positive.
    pub fn usable_commission(&self) -> Option<Decimal> {
        self.commission.filter(Decimal::is_positive)
    }
}

/// A tier about to be stored; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRateTier {
    pub bank_id: BankId,
    pub guarantee_type: GuaranteeType,
    pub limit_from: Option<Decimal>,
    pub limit_to: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub commission_on_excess: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl NewRateTier {
    pub fn with_id(self, id: i64) -> RateTier {
        RateTier {
            id,
            bank_id: self.bank_id,
            guarantee_type: self.guarantee_type,
            limit_from: self.limit_from,
            limit_to: self.limit_to,
            commission: self.commission,
            commission_on_excess: self.commission_on_excess,
            updated_at: self.updated_at,
        }
    }
}
