//! Rate-tier resolution with cascading fallback.
//!
//! Resolution order for (bank, guarantee type, amount):
//! 1. tiers whose `[limit_from, limit_to]` contains the amount
//! 2. tiers whose `limit_from` is at or below the amount
//! 3. any tier for the pair
//!
//! Each level picks the most recently updated tier. A configuration gap
//! falls through to a broader level rather than failing.

use crate::domain::{BankId, Decimal, GuaranteeType, RateTier};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TierSourceError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Read access to the configured rate tiers.
#[async_trait]
pub trait TierSource: Send + Sync {
    /// All tiers for a bank and guarantee type, in storage order.
    async fn tiers_for(
        &self,
        bank_id: BankId,
        guarantee_type: GuaranteeType,
    ) -> Result<Vec<RateTier>, TierSourceError>;
}

/// Tier table held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTierSource {
    tiers: Vec<RateTier>,
}

impl InMemoryTierSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tier(mut self, tier: RateTier) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn with_tiers(mut self, tiers: Vec<RateTier>) -> Self {
        self.tiers.extend(tiers);
        self
    }
}

#[async_trait]
impl TierSource for InMemoryTierSource {
    async fn tiers_for(
        &self,
        bank_id: BankId,
        guarantee_type: GuaranteeType,
    ) -> Result<Vec<RateTier>, TierSourceError> {
        Ok(self
            .tiers
            .iter()
            .filter(|t| t.bank_id == bank_id && t.guarantee_type == guarantee_type)
            .cloned()
            .collect())
    }
}

/// Pick the best tier for `amount` from the tiers of one (bank, type) pair.
pub fn select_tier(tiers: &[RateTier], amount: Decimal) -> Option<&RateTier> {
    most_recent(tiers.iter().filter(|t| t.contains(amount)))
        .or_else(|| most_recent(tiers.iter().filter(|t| t.starts_at_or_below(amount))))
        .or_else(|| most_recent(tiers.iter()))
}

/// Latest `updated_at`; on a tie the earlier tier in iteration order wins.
fn most_recent<'a>(tiers: impl Iterator<Item = &'a RateTier>) -> Option<&'a RateTier> {
    tiers.fold(None, |best: Option<&RateTier>, t| match best {
        Some(b) if b.updated_at >= t.updated_at => Some(b),
        _ => Some(t),
    })
}

/// Stateless resolver over an explicit tier source.
#[derive(Clone)]
pub struct RateTierResolver {
    source: Arc<dyn TierSource>,
}

impl RateTierResolver {
    pub fn new(source: Arc<dyn TierSource>) -> Self {
        Self { source }
    }

    /// Resolve the applicable tier, or `None` when the pair has no tiers at all.
    pub async fn resolve(
        &self,
        bank_id: BankId,
        guarantee_type: GuaranteeType,
        amount: Decimal,
    ) -> Result<Option<RateTier>, TierSourceError> {
        let tiers = self.source.tiers_for(bank_id, guarantee_type).await?;
        let tier = select_tier(&tiers, amount).cloned();
        debug!(
            "Resolved tier bank={} type={} amount={} -> {:?}",
            bank_id,
            guarantee_type,
            amount,
            tier.as_ref().map(|t| t.id)
        );
        Ok(tier)
    }
}
