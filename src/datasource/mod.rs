//! Minimal-rate lookup abstraction: the external service that supplies commission floors.

use crate::domain::{BankCode, Decimal, GuaranteeTypes, RateFloor, Regime};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

pub mod http;
pub mod mock;

pub use http::HttpRateLookup;
pub use mock::MockRateLookup;

/// Deal profile the floor is looked up for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorQuery {
    pub amount: Decimal,
    pub interval_days: i64,
    pub regime: Regime,
    pub guarantee_types: GuaranteeTypes,
    pub bank_code: BankCode,
}

/// Source of minimal commission floors.
///
/// A failed lookup is an error, never "no floor": callers must not fall back
/// to zero when the service is unreachable.
#[async_trait]
pub trait MinimalRateLookup: Send + Sync + fmt::Debug {
    /// Fetch the floor for a deal profile.
    ///
    /// # Returns
    /// `None` when no rule matches the profile.
    async fn minimal_rate(&self, query: &FloorQuery) -> Result<Option<RateFloor>, LookupError>;
}

/// Error type for floor lookups.
#[derive(Debug, Clone)]
pub enum LookupError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 5xx server error after retries)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            LookupError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            LookupError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            LookupError::RateLimited => write!(f, "Rate limited"),
            LookupError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}
