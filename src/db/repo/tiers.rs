//! Rate tier operations.

use super::{decode_error, decode_optional_decimal, Repository};
use crate::domain::{BankId, Decimal, GuaranteeType, NewRateTier, RateTier};
use crate::engine::{TierSource, TierSourceError};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

const INSERT_TIER: &str = r#"
    INSERT INTO rate_tiers (
        bank_id, guarantee_type, limit_from, limit_to,
        commission, commission_on_excess, updated_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

// Re-importing the same export must not duplicate rows.
const INSERT_TIER_IF_NEW: &str = r#"
    INSERT OR IGNORE INTO rate_tiers (
        bank_id, guarantee_type, limit_from, limit_to,
        commission, commission_on_excess, updated_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

fn canonical(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_canonical_string())
}

impl Repository {
    /// Store a rate tier and return it with its assigned id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_tier(&self, tier: &NewRateTier) -> Result<RateTier, sqlx::Error> {
        let result = sqlx::query(INSERT_TIER)
            .bind(tier.bank_id.as_i64())
            .bind(tier.guarantee_type.as_str())
            .bind(canonical(tier.limit_from))
            .bind(canonical(tier.limit_to))
            .bind(canonical(tier.commission))
            .bind(canonical(tier.commission_on_excess))
            .bind(tier.updated_at.timestamp_millis())
            .execute(&self.pool)
            .await?;

        Ok(tier.clone().with_id(result.last_insert_rowid()))
    }

    /// Store multiple tiers in a single transaction.
    ///
    /// Tiers already stored with the same bank, type, bounds and `updated_at`
    /// are skipped. Returns the number of newly inserted tiers.
    ///
    /// # Errors
    /// Returns an error if the transaction fails; nothing is stored then.
    pub async fn insert_tiers_batch(&self, tiers: &[NewRateTier]) -> Result<usize, sqlx::Error> {
        if tiers.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for tier in tiers {
            let result = sqlx::query(INSERT_TIER_IF_NEW)
                .bind(tier.bank_id.as_i64())
                .bind(tier.guarantee_type.as_str())
                .bind(canonical(tier.limit_from))
                .bind(canonical(tier.limit_to))
                .bind(canonical(tier.commission))
                .bind(canonical(tier.commission_on_excess))
                .bind(tier.updated_at.timestamp_millis())
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected() as usize;
        }
        tx.commit().await?;

        Ok(inserted)
    }

    /// Query the tiers of one bank and guarantee type, most recently updated first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored row is corrupt.
    pub async fn query_tiers(
        &self,
        bank_id: BankId,
        guarantee_type: GuaranteeType,
    ) -> Result<Vec<RateTier>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, bank_id, guarantee_type, limit_from, limit_to,
                   commission, commission_on_excess, updated_at
            FROM rate_tiers
            WHERE bank_id = ? AND guarantee_type = ?
            ORDER BY updated_at DESC, id ASC
            "#,
        )
        .bind(bank_id.as_i64())
        .bind(guarantee_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(tier_from_row).collect()
    }
}

fn tier_from_row(row: &SqliteRow) -> Result<RateTier, sqlx::Error> {
    let guarantee_type: String = row.get("guarantee_type");
    let updated_at_ms: i64 = row.get("updated_at");

    Ok(RateTier {
        id: row.get("id"),
        bank_id: BankId::new(row.get("bank_id")),
        guarantee_type: GuaranteeType::from_str(&guarantee_type)
            .map_err(|e| decode_error("guarantee_type", e))?,
        limit_from: decode_optional_decimal("limit_from", row.get("limit_from"))?,
        limit_to: decode_optional_decimal("limit_to", row.get("limit_to"))?,
        commission: decode_optional_decimal("commission", row.get("commission"))?,
        commission_on_excess: decode_optional_decimal(
            "commission_on_excess",
            row.get("commission_on_excess"),
        )?,
        updated_at: Utc
            .timestamp_millis_opt(updated_at_ms)
            .single()
            .ok_or_else(|| decode_error("updated_at", updated_at_ms))?,
    })
}

#[async_trait]
impl TierSource for Repository {
    async fn tiers_for(
        &self,
        bank_id: BankId,
        guarantee_type: GuaranteeType,
    ) -> Result<Vec<RateTier>, TierSourceError> {
        Ok(self.query_tiers(bank_id, guarantee_type).await?)
    }
}
