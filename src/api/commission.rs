//! Live commission recalculation for one offer.
//!
//! Keys are the snapshot field names themselves, since `changed` refers to
//! them by name.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::offers::load_offer;
use crate::api::{parse_date, parse_decimal, parse_optional_decimal, AppState};
use crate::domain::{ChangedField, CommissionSnapshot, Decimal, Offer, ValidationError};
use crate::error::AppError;

/// Field values as the negotiator's form holds them, decimals as strings.
#[derive(Debug, Default, Deserialize)]
pub struct RecalculationRequest {
    pub changed: Option<String>,
    pub amount: Option<String>,
    pub interval_from: Option<String>,
    pub interval_to: Option<String>,
    pub default_commission_bank: Option<String>,
    pub default_commission_percent: Option<String>,
    pub delta_commission_bank: Option<String>,
    pub commission_bank: Option<String>,
    pub commission_bank_percent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecalculationResponse {
    #[serde(flatten)]
    pub snapshot: CommissionSnapshot,
    pub minimal_commission: Decimal,
    pub minimal_percent: Decimal,
}

fn required<'a>(field: &'static str, raw: &'a Option<String>) -> Result<&'a str, ValidationError> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

impl RecalculationRequest {
    /// Parse the edit. Nothing is required for a first calculation, since the
    /// snapshot is rebuilt from the offer; `commission_bank` is always derived.
    pub fn parse(
        &self,
        offer: &Offer,
    ) -> Result<(CommissionSnapshot, Option<ChangedField>), ValidationError> {
        let changed = ChangedField::parse_optional(self.changed.as_deref())?;
        if changed.is_none() {
            return Ok((offer.initial_snapshot(), None));
        }

        let snapshot = CommissionSnapshot {
            amount: parse_decimal("amount", required("amount", &self.amount)?)?,
            interval_from: parse_date(
                "interval_from",
                required("interval_from", &self.interval_from)?,
            )?,
            interval_to: parse_date("interval_to", required("interval_to", &self.interval_to)?)?,
            default_commission_bank: parse_decimal(
                "default_commission_bank",
                required("default_commission_bank", &self.default_commission_bank)?,
            )?,
            default_commission_percent: parse_decimal(
                "default_commission_percent",
                required("default_commission_percent", &self.default_commission_percent)?,
            )?,
            delta_commission_bank: parse_decimal(
                "delta_commission_bank",
                required("delta_commission_bank", &self.delta_commission_bank)?,
            )?,
            commission_bank: parse_optional_decimal(
                "commission_bank",
                self.commission_bank.as_deref(),
            )?
            .unwrap_or_default(),
            commission_bank_percent: parse_decimal(
                "commission_bank_percent",
                required("commission_bank_percent", &self.commission_bank_percent)?,
            )?,
        };
        Ok((snapshot, changed))
    }
}

pub async fn recalculate_commission(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<RecalculationRequest>,
) -> Result<Json<RecalculationResponse>, AppError> {
    let offer = load_offer(&state, &id).await?;
    let (snapshot, changed) = body.parse(&offer)?;

    let result = state
        .recalculator
        .recalculate(&offer, snapshot, changed)
        .await?;

    Ok(Json(RecalculationResponse {
        snapshot: result.display_snapshot(),
        minimal_commission: result.floor.commission,
        minimal_percent: result.floor.percent,
    }))
}
