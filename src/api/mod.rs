pub mod commission;
pub mod health;
pub mod offers;
pub mod rewards;
pub mod tiers;

use crate::datasource::MinimalRateLookup;
use crate::db::Repository;
use crate::domain::{Decimal, ValidationError};
use crate::engine::{CommissionRecalculator, RateTierResolver, RewardAggregator, TierSource};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub recalculator: Arc<CommissionRecalculator>,
    pub resolver: RateTierResolver,
    pub rewards: RewardAggregator,
}

impl AppState {
    /// Wire the engine to the repository (tiers) and the floor lookup.
    ///
    /// `reference_year` pins the leap-year day count; `None` follows the clock.
    pub fn new(
        repo: Arc<Repository>,
        lookup: Arc<dyn MinimalRateLookup>,
        reference_year: Option<i32>,
    ) -> Self {
        let mut recalculator = CommissionRecalculator::new(lookup);
        if let Some(year) = reference_year {
            recalculator = recalculator.with_reference_year(year);
        }

        let tiers: Arc<dyn TierSource> = repo.clone();
        let resolver = RateTierResolver::new(tiers);
        let rewards = RewardAggregator::new(resolver.clone());

        Self {
            repo,
            recalculator: Arc::new(recalculator),
            resolver,
            rewards,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/offers", post(offers::create_offer))
        .route("/v1/offers/:id", get(offers::get_offer))
        .route(
            "/v1/offers/:id/commission",
            post(commission::recalculate_commission),
        )
        .route("/v1/offers/:id/rewards", get(rewards::get_offer_rewards))
        .route("/v1/rate-tiers", post(tiers::create_tier))
        .route(
            "/v1/banks/:bank_id/rate-tiers/resolve",
            get(tiers::resolve_tier),
        )
        .layer(cors)
        .with_state(state)
}

pub(crate) fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str_canonical(raw).map_err(|_| ValidationError::InvalidDecimal {
        field,
        value: raw.to_string(),
    })
}

pub(crate) fn parse_optional_decimal(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<Decimal>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_decimal(field, s).map(Some),
    }
}

pub(crate) fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}
