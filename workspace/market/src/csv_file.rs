use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{DateRange, PricePoint, PriceSeries};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{MarketDataError, Result};
use crate::{check_range, Interval, MarketDataProvider};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    close: f64,
}

/// Reads daily closes from a `date,close` CSV file (dates as `YYYY-MM-DD`).
///
/// The file is read on every fetch so it can be refreshed while the server
/// runs. The symbol is only used for logging: one file holds one ticker.
#[derive(Debug, Clone)]
pub struct CsvFileProvider {
    path: PathBuf,
}

impl CsvFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_series(path: &Path) -> Result<PriceSeries> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut points = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row?;
            if !row.close.is_finite() {
                return Err(MarketDataError::Parse(format!(
                    "Non-finite close on {} in {}",
                    row.date,
                    path.display()
                )));
            }
            points.push(PricePoint::new(row.date, row.close));
        }
        Ok(PriceSeries::new(points))
    }
}

#[async_trait]
impl MarketDataProvider for CsvFileProvider {
    fn name(&self) -> &str {
        "csv"
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        _interval: Interval,
    ) -> Result<PriceSeries> {
        check_range(start, end)?;

        let path = self.path.clone();
        let series = tokio::task::spawn_blocking(move || Self::read_series(&path))
            .await
            .map_err(|e| MarketDataError::Provider(format!("CSV reader task failed: {}", e)))??
            .within(DateRange::new(start, end));
        debug!("Loaded {} rows for {} from file", series.len(), symbol);
        Ok(series)
    }
}
