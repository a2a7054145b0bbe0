pub mod calendar;
pub mod engine;
pub mod error;
pub mod frame;
pub mod model;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Arc;

use market::MarketDataProvider;

pub use engine::{ForecastEngine, ForecastSettings, MIN_OBSERVATIONS};
pub use error::{ForecastError, ModelError};
pub use model::{AdditiveModel, ForecastModel, SeasonalityConfig, SeasonalityMode};

/// Returns the engine used by the application: the given provider with the
/// default additive model.
pub fn default_engine(
    provider: Arc<dyn MarketDataProvider>,
    settings: ForecastSettings,
) -> ForecastEngine {
    ForecastEngine::new(provider, Arc::new(AdditiveModel::default()), settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use market::InMemoryProvider;
    use testing::{business_day_series, date, utc_noon};

    /// The default engine forecasts the configured horizon on a regular
    /// month of closes.
    #[tokio::test]
    async fn test_default_engine() {
        let series = business_day_series(date(2024, 5, 16), date(2024, 6, 14), 82.0, 0.05);
        let engine = default_engine(
            Arc::new(InMemoryProvider::new(series)),
            ForecastSettings::default(),
        );

        let result = engine
            .forecast("BZ=F", utc_noon(2024, 6, 15))
            .await
            .expect("Failed to forecast");

        assert_eq!(result.predictions.len(), 5);
        assert!(result
            .predictions
            .iter()
            .all(|p| p.predicted_value.is_finite()));
    }

    #[tokio::test]
    async fn test_default_engine_respects_horizon_setting() {
        let series = business_day_series(date(2024, 5, 16), date(2024, 6, 14), 82.0, 0.05);
        let settings = ForecastSettings {
            horizon_days: 3,
            ..ForecastSettings::default()
        };
        let engine = default_engine(Arc::new(InMemoryProvider::new(series)), settings);

        let result = engine.forecast("BZ=F", utc_noon(2024, 6, 15)).await.unwrap();
        assert_eq!(result.predictions.len(), 3);
        assert_eq!(result.predictions[2].date, date(2024, 6, 19));
    }
}
