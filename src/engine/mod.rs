//! Commission negotiation engine: recalculation state machine and tier lookups.

pub mod annualize;
pub mod recalculator;
pub mod rewards;
pub mod tier_resolver;

pub use annualize::{Annualizer, DayCount};
pub use recalculator::{apply_edit, CommissionError, CommissionRecalculator, Recalculation};
pub use rewards::{RewardAggregator, Rewards};
pub use tier_resolver::{
    select_tier, InMemoryTierSource, RateTierResolver, TierSource, TierSourceError,
};
