//! Rate tier import from CSV exports of bank administration tooling.
//!
//! Expected header:
//! `bank_id,guarantee_type,limit_from,limit_to,commission,commission_on_excess,updated_at`
//! where `updated_at` is RFC 3339 and empty cells mean "not set".

use crate::db::Repository;
use crate::domain::{BankId, Decimal, GuaranteeType, NewRateTier};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TierImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv parse error: {0}")]
    Csv(String),
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Deserialize)]
struct Row {
    bank_id: i64,
    guarantee_type: String,
    limit_from: Option<String>,
    limit_to: Option<String>,
    commission: Option<String>,
    commission_on_excess: Option<String>,
    updated_at: String,
}

/// Parse a tier CSV. Any invalid row rejects the whole file.
pub fn parse_tiers_csv(csv_bytes: &[u8]) -> Result<Vec<NewRateTier>, TierImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_bytes);

    let mut tiers = Vec::new();
    for (idx, record) in reader.deserialize::<Row>().enumerate() {
        // header is line 1
        let line = idx + 2;
        let row = record.map_err(|e| TierImportError::Csv(e.to_string()))?;
        let invalid = |reason: String| TierImportError::InvalidRow { row: line, reason };

        let guarantee_type =
            GuaranteeType::from_str(&row.guarantee_type).map_err(|e| invalid(e.to_string()))?;
        let updated_at = DateTime::parse_from_rfc3339(&row.updated_at)
            .map_err(|e| invalid(format!("invalid updated_at: {}", e)))?
            .with_timezone(&Utc);

        let cell = |name: &str, value: Option<String>| -> Result<Option<Decimal>, TierImportError> {
            match value.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => Decimal::from_str_canonical(s)
                    .map(Some)
                    .map_err(|e| invalid(format!("invalid {}: {}", name, e))),
            }
        };

        let limit_from = cell("limit_from", row.limit_from)?;
        let limit_to = cell("limit_to", row.limit_to)?;
        if let (Some(from), Some(to)) = (limit_from, limit_to) {
            if from > to {
                return Err(invalid(format!("limit_from {} exceeds limit_to {}", from, to)));
            }
        }

        tiers.push(NewRateTier {
            bank_id: BankId::new(row.bank_id),
            guarantee_type,
            limit_from,
            limit_to,
            commission: cell("commission", row.commission)?,
            commission_on_excess: cell("commission_on_excess", row.commission_on_excess)?,
            updated_at,
        });
    }

    Ok(tiers)
}

/// Read a tier CSV from disk and store it in one transaction.
///
/// Rows already stored by an earlier import are skipped; returns the number
/// of new tiers.
pub async fn import_tiers_csv(repo: &Repository, path: &Path) -> Result<usize, TierImportError> {
    let bytes = std::fs::read(path).map_err(|source| TierImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let tiers = parse_tiers_csv(&bytes)?;
    let inserted = repo.insert_tiers_batch(&tiers).await?;
    info!(
        "Imported {} new of {} rate tiers from {}",
        inserted,
        tiers.len(),
        path.display()
    );
    Ok(inserted)
}
