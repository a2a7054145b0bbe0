//! Market data providers.
//!
//! A provider turns `(symbol, start, end, interval)` into a normalized
//! [`PriceSeries`]. The forecast core only sees the [`MarketDataProvider`]
//! trait, so the transport (Yahoo Finance over HTTP, a CSV file, a fixed
//! in-memory series) can be swapped without touching it.

pub mod csv_file;
pub mod error;
pub mod memory;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::PriceSeries;
use serde::{Deserialize, Serialize};

pub use csv_file::CsvFileProvider;
pub use error::{MarketDataError, Result};
pub use memory::InMemoryProvider;
pub use yahoo::YahooFinanceProvider;

/// Bar size of the requested series. Only daily bars are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    Daily,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
        }
    }
}

/// Source of daily closing prices.
#[async_trait]
pub trait MarketDataProvider: Send + Sync + std::fmt::Debug {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetches closing prices for `symbol` between `start` and `end`.
    ///
    /// `start` is inclusive. Whether a bar dated `end` is included depends on
    /// the provider (Yahoo treats `end` as exclusive).
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<PriceSeries>;
}

pub(crate) fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(MarketDataError::InvalidRange(format!(
            "start {} is after end {}",
            start, end
        )));
    }
    Ok(())
}
