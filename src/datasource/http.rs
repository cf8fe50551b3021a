//! HTTP client for the minimal-rate service.

use super::{FloorQuery, LookupError, MinimalRateLookup};
use crate::domain::{Decimal, RateFloor};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Floor lookup backed by the minimal-rate HTTP service.
///
/// Transient failures (network, 429, 5xx) are retried with exponential backoff
/// until `max_elapsed` runs out; the last error is then returned to the caller.
#[derive(Debug, Clone)]
pub struct HttpRateLookup {
    client: Client,
    base_url: String,
    max_elapsed: Duration,
}

impl HttpRateLookup {
    /// Create a new lookup client.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        base_url: String,
        request_timeout: Duration,
        max_elapsed: Duration,
    ) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| LookupError::Other(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_elapsed,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/minimal-rate", self.base_url)
    }

    async fn post_query(&self, query: &FloorQuery) -> Result<serde_json::Value, LookupError> {
        let url = self.endpoint();
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&url)
                .json(query)
                .send()
                .await
                .map_err(|e| {
                    warn!("Minimal-rate request failed: {}", e);
                    backoff::Error::transient(LookupError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
                return Ok(serde_json::Value::Null);
            }
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(backoff::Error::transient(LookupError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(LookupError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(LookupError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(LookupError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl MinimalRateLookup for HttpRateLookup {
    async fn minimal_rate(&self, query: &FloorQuery) -> Result<Option<RateFloor>, LookupError> {
        debug!(
            "Looking up floor for bank={}, regime={}, amount={}, days={}",
            query.bank_code, query.regime, query.amount, query.interval_days
        );

        let response = self.post_query(query).await?;
        parse_floor(&response)
    }
}

/// Parse the service response: `null` means no rule, otherwise `{commission, percent}`.
fn parse_floor(value: &serde_json::Value) -> Result<Option<RateFloor>, LookupError> {
    if value.is_null() {
        return Ok(None);
    }

    let obj = value
        .as_object()
        .ok_or_else(|| LookupError::ParseError("Expected object response".to_string()))?;

    let commission = parse_decimal_field(obj.get("commission"), "commission")?;
    let percent = parse_decimal_field(obj.get("percent"), "percent")?;
    Ok(Some(RateFloor::new(commission, percent)))
}

/// Accepts decimal strings and JSON numbers; a missing or null field counts as zero.
fn parse_decimal_field(
    value: Option<&serde_json::Value>,
    name: &str,
) -> Result<Decimal, LookupError> {
    let raw = match value {
        None | Some(serde_json::Value::Null) => return Ok(Decimal::zero()),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(LookupError::ParseError(format!(
                "Invalid {}: {}",
                name, other
            )))
        }
    };
    Decimal::from_str_canonical(&raw)
        .map_err(|e| LookupError::ParseError(format!("Invalid {}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_floor_strings() {
        let floor = parse_floor(&json!({"commission": "5000.00", "percent": "6.08"}))
            .unwrap()
            .unwrap();
        assert_eq!(floor.commission.to_canonical_string(), "5000");
        assert_eq!(floor.percent.to_canonical_string(), "6.08");
    }

    #[test]
    fn test_parse_floor_numbers() {
        let floor = parse_floor(&json!({"commission": 1500, "percent": 2.5}))
            .unwrap()
            .unwrap();
        assert_eq!(floor.commission.to_canonical_string(), "1500");
        assert_eq!(floor.percent.to_canonical_string(), "2.5");
    }

    #[test]
    fn test_parse_floor_null_is_no_rule() {
        assert_eq!(parse_floor(&serde_json::Value::Null).unwrap(), None);
    }

    #[test]
    fn test_parse_floor_missing_field_is_zero() {
        let floor = parse_floor(&json!({"commission": "700"})).unwrap().unwrap();
        assert!(floor.percent.is_zero());
    }

    #[test]
    fn test_parse_floor_rejects_garbage() {
        assert!(matches!(
            parse_floor(&json!([1, 2])),
            Err(LookupError::ParseError(_))
        ));
        assert!(matches!(
            parse_floor(&json!({"commission": "lots"})),
            Err(LookupError::ParseError(_))
        ));
        assert!(matches!(
            parse_floor(&json!({"commission": true})),
            Err(LookupError::ParseError(_))
        ));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let lookup = HttpRateLookup::new(
            "http://rates.local/api/".to_string(),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(lookup.endpoint(), "http://rates.local/api/minimal-rate");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let lookup = HttpRateLookup::new(
            "http://127.0.0.1:1".to_string(),
            Duration::from_millis(200),
            Duration::from_millis(300),
        )
        .unwrap();
        let query = FloorQuery {
            amount: Decimal::from_str_canonical("1000").unwrap(),
            interval_days: 10,
            regime: crate::domain::Regime::Commercial,
            guarantee_types: Default::default(),
            bank_code: crate::domain::BankCode::new("x".to_string()),
        };
        let err = lookup.minimal_rate(&query).await.unwrap_err();
        assert!(matches!(err, LookupError::NetworkError(_)));
    }
}
