use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::api::{parse_date, parse_decimal, AppState};
use crate::domain::{
    BankCode, BankId, GuaranteeType, GuaranteeTypes, Offer, Regime, ValidationError,
};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    pub bank_id: i64,
    pub bank_code: String,
    pub regime: String,
    pub guarantee_types: Vec<String>,
    pub amount: String,
    pub interval_from: String,
    pub interval_to: String,
}

impl CreateOfferRequest {
    fn into_offer(self, id: Uuid) -> Result<Offer, AppError> {
        let bank_code = self.bank_code.trim().to_string();
        if bank_code.is_empty() {
            return Err(AppError::BadRequest("bankCode must not be empty".into()));
        }
        let guarantee_types = self
            .guarantee_types
            .iter()
            .map(|t| GuaranteeType::from_str(t))
            .collect::<Result<GuaranteeTypes, _>>()
            .map_err(ValidationError::from)?;
        if guarantee_types.is_empty() {
            return Err(AppError::BadRequest(
                "guaranteeTypes must name at least one type".into(),
            ));
        }

        let offer = Offer {
            id,
            bank_id: BankId::new(self.bank_id),
            bank_code: BankCode::new(bank_code),
            regime: Regime::from_str(&self.regime).map_err(ValidationError::from)?,
            guarantee_types,
            amount: parse_decimal("amount", &self.amount)?,
            interval_from: parse_date("interval_from", &self.interval_from)?,
            interval_to: parse_date("interval_to", &self.interval_to)?,
        };
        offer.initial_snapshot().validate()?;
        Ok(offer)
    }
}

pub async fn create_offer(
    State(state): State<AppState>,
    Json(body): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<Offer>), AppError> {
    let offer = body.into_offer(Uuid::new_v4())?;
    state.repo.insert_offer(&offer).await?;
    info!("Registered offer {} for bank {}", offer.id, offer.bank_code);
    Ok((StatusCode::CREATED, Json(offer)))
}

pub async fn get_offer(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Offer>, AppError> {
    let offer = load_offer(&state, &id).await?;
    Ok(Json(offer))
}

/// Parse the path id and fetch the offer, or 404.
pub(crate) async fn load_offer(state: &AppState, raw_id: &str) -> Result<Offer, AppError> {
    let id = Uuid::parse_str(raw_id)
        .map_err(|_| AppError::BadRequest(format!("Invalid offer id: {}", raw_id)))?;
    state
        .repo
        .get_offer(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Offer {} not found", id)))
}
