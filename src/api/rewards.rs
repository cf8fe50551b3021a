use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::offers::load_offer;
use crate::api::AppState;
use crate::engine::Rewards;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsResponse {
    pub offer_id: Uuid,
    /// `null` when no tier is configured for any of the offer's guarantee types.
    #[serde(flatten)]
    pub rewards: Rewards,
}

pub async fn get_offer_rewards(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RewardsResponse>, AppError> {
    let offer = load_offer(&state, &id).await?;
    let rewards = state
        .rewards
        .rewards(offer.bank_id, &offer.guarantee_types, offer.amount)
        .await?;

    Ok(Json(RewardsResponse {
        offer_id: offer.id,
        rewards,
    }))
}
