use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{DateRange, PriceSeries};

use crate::error::{MarketDataError, Result};
use crate::{check_range, Interval, MarketDataProvider};

/// Serves a fixed series, or a fixed failure.
///
/// Counts its fetches so callers can check whether it was consulted at all.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    series: PriceSeries,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose every fetch fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            series: PriceSeries::empty(),
            failure: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(
        &self,
        _symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        _interval: Interval,
    ) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        check_range(start, end)?;

        if let Some(message) = &self.failure {
            return Err(MarketDataError::Provider(message.clone()));
        }
        Ok(self.series.within(DateRange::new(start, end)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PricePoint;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_filters_and_counts() {
        let provider = InMemoryProvider::new(PriceSeries::new(vec![
            PricePoint::new(date(2024, 5, 1), 1.0),
            PricePoint::new(date(2024, 6, 3), 2.0),
        ]));

        let series = provider
            .fetch("BZ=F", date(2024, 5, 16), date(2024, 6, 15), Interval::Daily)
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = InMemoryProvider::failing("rate limited");
        let err = provider
            .fetch("BZ=F", date(2024, 5, 16), date(2024, 6, 15), Interval::Daily)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(provider.calls(), 1);
    }
}
