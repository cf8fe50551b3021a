//! Offer operations.

use super::{decode_decimal, decode_error, Repository};
use crate::domain::{join_guarantee_types, parse_guarantee_types, BankCode, BankId, Offer, Regime};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

impl Repository {
    /// Insert a new offer.
    ///
    /// # Errors
    /// Returns an error if the insert fails, including a duplicate id.
    pub async fn insert_offer(&self, offer: &Offer) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO offers (
                id, bank_id, bank_code, regime, guarantee_types,
                amount, interval_from, interval_to, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(offer.id.to_string())
        .bind(offer.bank_id.as_i64())
        .bind(offer.bank_code.as_str())
        .bind(offer.regime.as_str())
        .bind(join_guarantee_types(&offer.guarantee_types))
        .bind(offer.amount.to_canonical_string())
        .bind(offer.interval_from.format(DATE_FORMAT).to_string())
        .bind(offer.interval_to.format(DATE_FORMAT).to_string())
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch an offer by id.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored row is corrupt.
    pub async fn get_offer(&self, id: Uuid) -> Result<Option<Offer>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, bank_id, bank_code, regime, guarantee_types,
                   amount, interval_from, interval_to
            FROM offers
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(offer_from_row).transpose()
    }
}

fn offer_from_row(row: &SqliteRow) -> Result<Offer, sqlx::Error> {
    let id: String = row.get("id");
    let regime: String = row.get("regime");
    let guarantee_types: String = row.get("guarantee_types");
    let amount: String = row.get("amount");
    let interval_from: String = row.get("interval_from");
    let interval_to: String = row.get("interval_to");

    Ok(Offer {
        id: Uuid::parse_str(&id).map_err(|e| decode_error("id", e))?,
        bank_id: BankId::new(row.get("bank_id")),
        bank_code: BankCode::new(row.get("bank_code")),
        regime: Regime::from_str(&regime).map_err(|e| decode_error("regime", e))?,
        guarantee_types: parse_guarantee_types(&guarantee_types)
            .map_err(|e| decode_error("guarantee_types", e))?,
        amount: decode_decimal("amount", &amount)?,
        interval_from: NaiveDate::parse_from_str(&interval_from, DATE_FORMAT)
            .map_err(|e| decode_error("interval_from", e))?,
        interval_to: NaiveDate::parse_from_str(&interval_to, DATE_FORMAT)
            .map_err(|e| decode_error("interval_to", e))?,
    })
}
