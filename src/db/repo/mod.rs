//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by table:
//! - `offers.rs` - Guarantee offers owning a negotiation
//! - `tiers.rs` - Reward rate tiers and the `TierSource` implementation

mod offers;
mod tiers;

use crate::domain::Decimal;
use sqlx::sqlite::SqlitePool;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Round-trip a trivial query to check the database is reachable.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Decimals are stored as canonical strings; a bad one is a decode error, not a zero.
fn decode_decimal(column: &str, raw: &str) -> Result<Decimal, sqlx::Error> {
    Decimal::from_str_canonical(raw)
        .map_err(|e| sqlx::Error::Decode(format!("column {}: {}", column, e).into()))
}

fn decode_optional_decimal(column: &str, raw: Option<String>) -> Result<Option<Decimal>, sqlx::Error> {
    raw.map(|s| decode_decimal(column, &s)).transpose()
}

fn decode_error(column: &str, err: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::Decode(format!("column {}: {}", column, err).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_decimal() {
        assert_eq!(
            decode_decimal("amount", "1000000.50").unwrap().to_canonical_string(),
            "1000000.5"
        );
        assert!(matches!(
            decode_decimal("amount", "n/a"),
            Err(sqlx::Error::Decode(_))
        ));
    }

    #[test]
    fn test_decode_optional_decimal() {
        assert_eq!(decode_optional_decimal("limit_to", None).unwrap(), None);
        assert!(decode_optional_decimal("limit_to", Some("5".to_string()))
            .unwrap()
            .is_some());
    }
}
