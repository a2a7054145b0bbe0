//! Pluggable forecasting models.
//!
//! A [`ForecastModel`] is fitted on a `(ds, y)` frame and yields a
//! [`FittedModel`] that projects any frame of `ds` values. The engine never
//! looks inside either, so another model can be dropped in as long as it
//! honours the frame contract described in [`crate::frame`].

pub mod additive;
mod linalg;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

pub use additive::AdditiveModel;

/// Whether a seasonal component is part of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    /// Let the model decide from the span and spacing of the history
    #[default]
    Auto,
    Enabled,
    Disabled,
}

/// Seasonal components requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalityConfig {
    pub daily: SeasonalityMode,
    pub weekly: SeasonalityMode,
    pub yearly: SeasonalityMode,
}

impl SeasonalityConfig {
    /// Daily seasonality off, weekly and yearly left to the model.
    pub fn without_daily() -> Self {
        Self {
            daily: SeasonalityMode::Disabled,
            ..Self::default()
        }
    }
}

/// A time-series model that can be fitted on a `(ds, y)` frame.
pub trait ForecastModel: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Fits the model. Fails on missing columns or null values.
    fn fit(
        &self,
        history: &DataFrame,
        seasonality: &SeasonalityConfig,
    ) -> Result<Box<dyn FittedModel>, ModelError>;
}

/// Trained state of a [`ForecastModel`].
pub trait FittedModel: Send + std::fmt::Debug {
    /// Projects every `ds` of `future`, returning `ds`, `trend`,
    /// `yhat_lower`, `yhat_upper` and `yhat` columns in the same row order.
    fn predict(&self, future: &DataFrame) -> Result<DataFrame, ModelError>;
}
