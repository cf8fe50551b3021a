//! Mock floor lookup for testing without network calls.

use super::{FloorQuery, LookupError, MinimalRateLookup};
use crate::domain::RateFloor;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock lookup that returns a predefined floor and records the queries it saw.
#[derive(Debug, Clone, Default)]
pub struct MockRateLookup {
    floor: Option<RateFloor>,
    failure: Option<LookupError>,
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<FloorQuery>>>,
}

impl MockRateLookup {
    /// Create a mock that matches no rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this floor for every query.
    pub fn with_floor(mut self, floor: RateFloor) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Fail every query with this error.
    pub fn failing(mut self, error: LookupError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of lookups served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most recent query, if any.
    pub fn last_query(&self) -> Option<FloorQuery> {
        self.queries
            .lock()
            .ok()
            .and_then(|queries| queries.last().cloned())
    }
}

#[async_trait]
impl MinimalRateLookup for MockRateLookup {
    async fn minimal_rate(&self, query: &FloorQuery) -> Result<Option<RateFloor>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }

        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.floor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BankCode, Decimal, Regime};

    fn query() -> FloorQuery {
        FloorQuery {
            amount: Decimal::from_str_canonical("1000000").unwrap(),
            interval_days: 30,
            regime: Regime::Fz223,
            guarantee_types: Default::default(),
            bank_code: BankCode::new("vtb".to_string()),
        }
    }

    #[tokio::test]
    async fn test_mock_returns_floor() {
        let floor = RateFloor::new(
            Decimal::from_str_canonical("5000").unwrap(),
            Decimal::from_str_canonical("6.08").unwrap(),
        );
        let mock = MockRateLookup::new().with_floor(floor);
        let result = mock.minimal_rate(&query()).await.unwrap();
        assert_eq!(result, Some(floor));
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_query(), Some(query()));
    }

    #[tokio::test]
    async fn test_mock_without_floor() {
        let mock = MockRateLookup::new();
        assert_eq!(mock.minimal_rate(&query()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let mock = MockRateLookup::new().failing(LookupError::RateLimited);
        let err = mock.minimal_rate(&query()).await.unwrap_err();
        assert!(matches!(err, LookupError::RateLimited));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_call_counter() {
        let mock = MockRateLookup::new();
        let clone = mock.clone();
        clone.minimal_rate(&query()).await.unwrap();
        assert_eq!(mock.call_count(), 1);
    }
}
