use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use common::{ForecastRequest, ForecastResult, PriceSeries};
use market::{Interval, MarketDataProvider};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{ForecastError, Result};
use crate::frame::{future_frame, price_frame, tail_points};
use crate::model::{ForecastModel, SeasonalityConfig};

/// Fewest observations the engine will fit a model on.
pub const MIN_OBSERVATIONS: usize = 5;

/// Tunables of a forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Ticker forecast by the web form
    pub symbol: String,
    /// Calendar days of history fetched before `now`
    pub lookback_days: u32,
    /// Business days predicted after the last observation
    pub horizon_days: u32,
    pub seasonality: SeasonalityConfig,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            symbol: "BZ=F".to_string(),
            lookback_days: 30,
            horizon_days: 5,
            seasonality: SeasonalityConfig::without_daily(),
        }
    }
}

/// Fetches history, fits the model and extracts the forecast horizon.
///
/// Holds no per-request state; one engine serves every request.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    provider: Arc<dyn MarketDataProvider>,
    model: Arc<dyn ForecastModel>,
    settings: ForecastSettings,
}

impl ForecastEngine {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        model: Arc<dyn ForecastModel>,
        settings: ForecastSettings,
    ) -> Self {
        Self {
            provider,
            model,
            settings,
        }
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn request(&self, symbol: &str) -> ForecastRequest {
        ForecastRequest {
            symbol: symbol.to_string(),
            lookback_days: self.settings.lookback_days,
            horizon_days: self.settings.horizon_days,
        }
    }

    /// Forecasts `symbol` from the history ending at `now`.
    ///
    /// Fetches `[now - lookback_days, now]` at day precision and predicts
    /// `horizon_days` business days after the last observed close.
    #[instrument(skip(self), fields(provider = self.provider.name(), model = self.model.name()))]
    pub async fn forecast(&self, symbol: &str, now: DateTime<Utc>) -> Result<ForecastResult> {
        let request = self.request(symbol);
        if request.symbol.trim().is_empty() {
            return Err(ForecastError::failure("symbol must not be empty"));
        }

        let end = now.date_naive();
        let start = end
            .checked_sub_signed(Duration::days(i64::from(request.lookback_days)))
            .ok_or_else(|| ForecastError::failure("lookback window out of range"))?;
        debug!("Fetching {} from {} to {}", request.symbol, start, end);

        let series = self
            .provider
            .fetch(&request.symbol, start, end, Interval::Daily)
            .await
            .inspect_err(|e| warn!("Market data fetch for {} failed: {}", request.symbol, e))?;

        self.forecast_series(&request, series)
    }

    /// Validates, reshapes, fits and predicts on an already fetched series.
    pub fn forecast_series(
        &self,
        request: &ForecastRequest,
        series: PriceSeries,
    ) -> Result<ForecastResult> {
        if series.len() < MIN_OBSERVATIONS {
            warn!(
                "Only {} observations for {}, at least {} required",
                series.len(),
                request.symbol,
                MIN_OBSERVATIONS
            );
            return Err(ForecastError::InsufficientData {
                observed: series.len(),
                required: MIN_OBSERVATIONS,
            });
        }

        let horizon = request.horizon_days as usize;
        let history = price_frame(&series)?;
        let fitted = self.model.fit(&history, &self.settings.seasonality)?;
        let projection = fitted.predict(&future_frame(&history, horizon)?)?;
        let predictions = tail_points(&projection, horizon)?;

        info!(
            "Forecast {} over {} observations ({:?}): {} predictions",
            request.symbol,
            series.len(),
            series.date_range(),
            predictions.len()
        );

        Ok(ForecastResult {
            symbol: request.symbol.clone(),
            input_series: series,
            predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdditiveModel, FittedModel};
    use crate::testing::{business_day_series, date, utc_noon};
    use common::PricePoint;
    use market::InMemoryProvider;
    use polars::prelude::DataFrame;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Model that records fits and must never be reached in some tests
    #[derive(Debug, Default)]
    struct CountingModel {
        fits: AtomicUsize,
    }

    impl ForecastModel for CountingModel {
        fn name(&self) -> &str {
            "counting"
        }

        fn fit(
            &self,
            history: &DataFrame,
            seasonality: &SeasonalityConfig,
        ) -> std::result::Result<Box<dyn FittedModel>, crate::error::ModelError> {
            self.fits.fetch_add(1, Ordering::SeqCst);
            AdditiveModel::default().fit(history, seasonality)
        }
    }

    fn engine_with(provider: Arc<InMemoryProvider>, model: Arc<CountingModel>) -> ForecastEngine {
        ForecastEngine::new(provider, model, ForecastSettings::default())
    }

    #[tokio::test]
    async fn test_forecast_june_scenario() {
        let series = business_day_series(date(2024, 5, 16), date(2024, 6, 14), 82.0, 0.15);
        assert_eq!(series.len(), 22);

        let provider = Arc::new(InMemoryProvider::new(series));
        let engine = engine_with(provider.clone(), Arc::new(CountingModel::default()));

        let result = engine.forecast("BZ=F", utc_noon(2024, 6, 15)).await.unwrap();

        let dates: Vec<_> = result.predictions.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 6, 17),
                date(2024, 6, 18),
                date(2024, 6, 19),
                date(2024, 6, 20),
                date(2024, 6, 21),
            ]
        );
        assert_eq!(result.input_series.len(), 22);
        assert_eq!(result.symbol, "BZ=F");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_forecast_window_is_thirty_days() {
        // Points outside [2024-05-16, 2024-06-15] are dropped by the provider
        let series = business_day_series(date(2024, 4, 1), date(2024, 6, 14), 80.0, 0.1);
        let provider = Arc::new(InMemoryProvider::new(series));
        let engine = engine_with(provider, Arc::new(CountingModel::default()));

        let result = engine.forecast("BZ=F", utc_noon(2024, 6, 15)).await.unwrap();
        assert_eq!(result.input_series.first_date(), Some(date(2024, 5, 16)));
        assert_eq!(result.input_series.len(), 22);
    }

    #[tokio::test]
    async fn test_predictions_follow_history() {
        for (start, end) in [
            (date(2024, 6, 10), date(2024, 6, 14)),
            (date(2024, 5, 20), date(2024, 6, 12)),
            (date(2024, 5, 16), date(2024, 6, 13)),
        ] {
            let series = business_day_series(start, end, 75.0, -0.2);
            let provider = Arc::new(InMemoryProvider::new(series));
            let engine = engine_with(provider, Arc::new(CountingModel::default()));

            let result = engine.forecast("BZ=F", utc_noon(2024, 6, 15)).await.unwrap();
            let last = result.input_series.last_date().unwrap();

            assert_eq!(result.predictions.len(), 5);
            assert!(result.predictions[0].date > last);
            assert!(result.predictions.windows(2).all(|w| w[0].date < w[1].date));
        }
    }

    #[tokio::test]
    async fn test_insufficient_data_skips_model() {
        for count in [0usize, 1, 4] {
            let series = business_day_series(date(2024, 6, 10), date(2024, 6, 14), 80.0, 0.1)
                .points()
                .iter()
                .take(count)
                .copied()
                .collect::<PriceSeries>();
            let model = Arc::new(CountingModel::default());
            let engine = engine_with(Arc::new(InMemoryProvider::new(series)), model.clone());

            let err = engine.forecast("BZ=F", utc_noon(2024, 6, 15)).await.unwrap_err();
            assert!(
                matches!(err, ForecastError::InsufficientData { observed, required: 5 } if observed == count)
            );
            assert_eq!(model.fits.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_provider_error_is_wrapped() {
        let provider = Arc::new(InMemoryProvider::failing("No data found, symbol may be delisted"));
        let engine = engine_with(provider, Arc::new(CountingModel::default()));

        let err = engine.forecast("XX=F", utc_noon(2024, 6, 15)).await.unwrap_err();
        assert!(matches!(err, ForecastError::Failure { .. }));
        assert!(err.to_string().contains("symbol may be delisted"));
    }

    #[tokio::test]
    async fn test_empty_symbol_fails() {
        let provider = Arc::new(InMemoryProvider::default());
        let engine = engine_with(provider.clone(), Arc::new(CountingModel::default()));

        let err = engine.forecast("  ", utc_noon(2024, 6, 15)).await.unwrap_err();
        assert!(matches!(err, ForecastError::Failure { .. }));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_lookback_fails_without_fetching() {
        let provider = Arc::new(InMemoryProvider::default());
        let settings = ForecastSettings {
            lookback_days: u32::MAX,
            ..ForecastSettings::default()
        };
        let engine = ForecastEngine::new(provider.clone(), Arc::new(CountingModel::default()), settings);

        let err = engine.forecast("BZ=F", utc_noon(2024, 6, 15)).await.unwrap_err();
        assert!(matches!(err, ForecastError::Failure { .. }));
        assert!(err.to_string().contains("lookback window out of range"));
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_forecast_series_is_repeatable() {
        let series = PriceSeries::new(
            [82.1, 82.9, 81.7, 82.4, 83.3, 83.0, 82.2, 84.1, 83.6, 83.9]
                .iter()
                .zip(crate::calendar::business_days_between(date(2024, 6, 3), date(2024, 6, 14)))
                .map(|(close, d)| PricePoint::new(d, *close))
                .collect(),
        );
        let engine = engine_with(
            Arc::new(InMemoryProvider::default()),
            Arc::new(CountingModel::default()),
        );
        let request = engine.request("BZ=F");

        let first = engine.forecast_series(&request, series.clone()).unwrap();
        let second = engine.forecast_series(&request, series).unwrap();
        assert_eq!(first.predictions, second.predictions);
    }

    #[test]
    fn test_default_settings() {
        let settings = ForecastSettings::default();
        assert_eq!(settings.symbol, "BZ=F");
        assert_eq!(settings.lookback_days, 30);
        assert_eq!(settings.horizon_days, 5);
        assert_eq!(settings.seasonality, SeasonalityConfig::without_daily());
    }
}
