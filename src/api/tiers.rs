use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::{parse_decimal, parse_optional_decimal, AppState};
use crate::domain::{BankId, GuaranteeType, NewRateTier, RateTier, ValidationError};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTierRequest {
    pub bank_id: i64,
    pub guarantee_type: String,
    pub limit_from: Option<String>,
    pub limit_to: Option<String>,
    pub commission: Option<String>,
    pub commission_on_excess: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveQuery {
    pub guarantee_type: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub tier: Option<RateTier>,
}

pub async fn create_tier(
    State(state): State<AppState>,
    Json(body): Json<CreateTierRequest>,
) -> Result<(StatusCode, Json<RateTier>), AppError> {
    let limit_from = parse_optional_decimal("limit_from", body.limit_from.as_deref())?;
    let limit_to = parse_optional_decimal("limit_to", body.limit_to.as_deref())?;
    if let (Some(from), Some(to)) = (limit_from, limit_to) {
        if from > to {
            return Err(AppError::BadRequest("limitFrom must be <= limitTo".into()));
        }
    }

    let tier = NewRateTier {
        bank_id: BankId::new(body.bank_id),
        guarantee_type: GuaranteeType::from_str(&body.guarantee_type)
            .map_err(ValidationError::from)?,
        limit_from,
        limit_to,
        commission: parse_optional_decimal("commission", body.commission.as_deref())?,
        commission_on_excess: parse_optional_decimal(
            "commission_on_excess",
            body.commission_on_excess.as_deref(),
        )?,
        updated_at: chrono::Utc::now(),
    };

    let stored = state.repo.insert_tier(&tier).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn resolve_tier(
    Path(bank_id): Path<i64>,
    Query(params): Query<ResolveQuery>,
    State(state): State<AppState>,
) -> Result<Json<ResolveResponse>, AppError> {
    let guarantee_type =
        GuaranteeType::from_str(&params.guarantee_type).map_err(ValidationError::from)?;
    let amount = parse_decimal("amount", &params.amount)?;

    let tier = state
        .resolver
        .resolve(BankId::new(bank_id), guarantee_type, amount)
        .await?;
    Ok(Json(ResolveResponse { tier }))
}
