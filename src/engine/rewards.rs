//! Deal-level reward rates across several guarantee types.

use crate::domain::{BankId, Decimal, GuaranteeTypes, RateTier};
use crate::engine::tier_resolver::{RateTierResolver, TierSourceError};
use futures::future::try_join_all;
use serde::Serialize;

/// Reward rates for one deal. `None` means no rule is configured, which is
/// not the same as a zero reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rewards {
    pub commission: Option<Decimal>,
    pub commission_on_excess: Option<Decimal>,
}

/// Max of the usable values of each metric over the resolved tiers.
///
/// Overlapping guarantee types are rewarded at the most generous tier, never
/// the sum.
pub fn aggregate<'a>(tiers: impl IntoIterator<Item = &'a RateTier>) -> Rewards {
    let tiers: Vec<&RateTier> = tiers.into_iter().collect();

    let commission = tiers
        .iter()
        .filter_map(|t| t.usable_commission())
        .max()
        .filter(Decimal::is_positive);
    let commission_on_excess = tiers
        .iter()
        .filter_map(|t| t.commission_on_excess)
        .max()
        .filter(Decimal::is_positive);

    Rewards {
        commission,
        commission_on_excess,
    }
}

#[derive(Clone)]
pub struct RewardAggregator {
    resolver: RateTierResolver,
}

impl RewardAggregator {
    pub fn new(resolver: RateTierResolver) -> Self {
        Self { resolver }
    }

    /// Resolve one tier per guarantee type and aggregate them.
    pub async fn rewards(
        &self,
        bank_id: BankId,
        guarantee_types: &GuaranteeTypes,
        amount: Decimal,
    ) -> Result<Rewards, TierSourceError> {
        let resolved = try_join_all(
            guarantee_types
                .iter()
                .map(|t| self.resolver.resolve(bank_id, *t, amount)),
        )
        .await?;

        Ok(aggregate(resolved.iter().flatten()))
    }
}
