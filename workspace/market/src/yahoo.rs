//! Yahoo Finance chart API client.
//!
//! Uses the public v8 chart endpoint, which serves daily bars for futures
//! tickers such as `BZ=F` without an API key.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use common::{PricePoint, PriceSeries};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, trace, warn};

use crate::error::{MarketDataError, Result};
use crate::{check_range, Interval, MarketDataProvider};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// The endpoint rejects requests without a browser-like user agent
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    // Absent when the range holds no trading day
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// [`MarketDataProvider`] backed by the Yahoo Finance chart API.
#[derive(Debug, Clone)]
pub struct YahooFinanceProvider {
    client: Client,
    base_url: String,
}

impl YahooFinanceProvider {
    /// Builds a provider with its own HTTP client.
    ///
    /// `timeout` bounds the whole request; the forecast core has no timeout
    /// of its own.
    pub fn new(timeout: Duration, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    /// Builds a provider on a pre-configured client, optionally pointing at
    /// another base URL (a proxy or a mock server).
    pub fn with_client(client: Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn unix_midnight(date: NaiveDate) -> i64 {
        date.and_time(NaiveTime::MIN).and_utc().timestamp()
    }

    /// Decodes a chart payload into a series.
    ///
    /// Rows without a close are skipped. Timestamps are shifted by the
    /// exchange offset so that each bar lands on its trading date.
    fn parse_response(body: &str) -> Result<PriceSeries> {
        let response: ChartResponse =
            serde_json::from_str(body).map_err(|e| MarketDataError::Parse(e.to_string()))?;

        if let Some(error) = response.chart.error {
            return Err(MarketDataError::Api {
                code: error.code,
                description: error.description,
            });
        }

        let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(PriceSeries::empty());
        };

        let offset = data.meta.map(|m| m.gmtoffset).unwrap_or(0);
        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let mut points = Vec::with_capacity(data.timestamp.len());
        for (i, ts) in data.timestamp.iter().enumerate() {
            let Some(close) = closes.get(i).copied().flatten() else {
                trace!(timestamp = ts, "Skipping bar without close");
                continue;
            };
            let date = DateTime::from_timestamp(ts + offset, 0)
                .ok_or_else(|| MarketDataError::Parse(format!("Invalid timestamp: {}", ts)))?
                .date_naive();
            points.push(PricePoint::new(date, close));
        }

        Ok(PriceSeries::new(points))
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    #[instrument(skip(self))]
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<PriceSeries> {
        check_range(start, end)?;

        let url = format!("{}/{}", self.base_url, symbol);
        let query = [
            ("period1", Self::unix_midnight(start).to_string()),
            ("period2", Self::unix_midnight(end).to_string()),
            ("interval", interval.as_str().to_string()),
        ];
        debug!("Requesting {} with {:?}", url, query);

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Error payloads come with 4xx statuses; prefer their description
        match Self::parse_response(&body) {
            Ok(series) if status.is_success() => {
                debug!("Received {} bars for {}", series.len(), symbol);
                Ok(series)
            }
            Err(err @ MarketDataError::Api { .. }) => {
                warn!("Yahoo Finance rejected {}: {}", symbol, err);
                Err(err)
            }
            Err(err) if status.is_success() => Err(err),
            _ => Err(MarketDataError::HttpStatus {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            }),
        }
    }
}
