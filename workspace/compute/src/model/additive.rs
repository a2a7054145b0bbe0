//! Additive trend + seasonality regression.
//!
//! `y(t) = trend(t) + seasonal(t) + noise`, where the trend is piecewise
//! linear with potential changepoints spread over the first part of the
//! history and every seasonal component is a truncated Fourier series.
//! Coefficients get Gaussian priors, so the fit is a ridge regression
//! solved in closed form: identical inputs always produce identical
//! estimates.

use std::f64::consts::PI;

use chrono::NaiveDate;
use polars::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, instrument, trace};

use super::linalg::Matrix;
use super::{FittedModel, ForecastModel, SeasonalityConfig, SeasonalityMode};
use crate::error::ModelError;
use crate::frame::{date_column, value_column, DS, TREND, Y, YHAT, YHAT_LOWER, YHAT_UPPER};

const MIN_OBSERVATIONS: usize = 2;

// Lower bound on the noise variance (in scaled units) used to weight the
// priors; keeps the normal equations well conditioned on noiseless input.
const MIN_NOISE_VARIANCE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Seasonality {
    name: &'static str,
    period_days: f64,
    order: usize,
}

const DAILY: Seasonality = Seasonality {
    name: "daily",
    period_days: 1.0,
    order: 4,
};

const WEEKLY: Seasonality = Seasonality {
    name: "weekly",
    period_days: 7.0,
    order: 3,
};

const YEARLY: Seasonality = Seasonality {
    name: "yearly",
    period_days: 365.25,
    order: 10,
};

/// Default [`ForecastModel`]: piecewise linear trend plus Fourier seasonality.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveModel {
    /// Upper bound on the number of trend changepoints
    pub n_changepoints: usize,
    /// Share of the history in which changepoints may be placed
    pub changepoint_range: f64,
    /// Prior standard deviation of trend rate changes; larger is more flexible
    pub changepoint_prior_scale: f64,
    /// Prior standard deviation of the Fourier coefficients
    pub seasonality_prior_scale: f64,
    /// Prior standard deviation of the base level and growth rate
    pub trend_prior_scale: f64,
    /// Coverage of `yhat_lower..yhat_upper`
    pub interval_width: f64,
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            trend_prior_scale: 5.0,
            interval_width: 0.8,
        }
    }
}

impl AdditiveModel {
    fn validate(&self) -> Result<(), ModelError> {
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        for (name, value) in [
            ("changepoint_prior_scale", self.changepoint_prior_scale),
            ("seasonality_prior_scale", self.seasonality_prior_scale),
            ("trend_prior_scale", self.trend_prior_scale),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ModelError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Changepoints on the scaled time axis, placed on observed dates evenly
    /// across the first `changepoint_range` of the history.
    fn changepoints(&self, sorted_t: &[f64]) -> Vec<f64> {
        let hist_size = (sorted_t.len() as f64 * self.changepoint_range).floor() as usize;
        let count = self.n_changepoints.min(hist_size.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }

        let mut points: Vec<f64> = (1..=count)
            .map(|j| {
                let idx = (j as f64 * (hist_size - 1) as f64 / count as f64).round() as usize;
                sorted_t[idx]
            })
            .collect();
        points.dedup();
        points
    }

    fn seasonalities(
        config: &SeasonalityConfig,
        span_days: f64,
        min_spacing_days: f64,
    ) -> Vec<Seasonality> {
        let resolve = |mode: SeasonalityMode, auto: bool| match mode {
            SeasonalityMode::Enabled => true,
            SeasonalityMode::Disabled => false,
            SeasonalityMode::Auto => auto,
        };

        let mut components = Vec::new();
        if resolve(config.yearly, span_days >= 730.0) {
            components.push(YEARLY);
        }
        if resolve(config.weekly, span_days >= 14.0 && min_spacing_days < 7.0) {
            components.push(WEEKLY);
        }
        // Daily observations carry no intra-day pattern
        if resolve(config.daily, min_spacing_days < 1.0) {
            components.push(DAILY);
        }
        components
    }
}

impl ForecastModel for AdditiveModel {
    fn name(&self) -> &str {
        "additive"
    }

    #[instrument(skip(self, history), fields(rows = history.height()))]
    fn fit(
        &self,
        history: &DataFrame,
        seasonality: &SeasonalityConfig,
    ) -> Result<Box<dyn FittedModel>, ModelError> {
        self.validate()?;

        let dates = date_column(history, DS)?;
        let values = value_column(history, Y)?;
        let n = dates.len();
        if n < MIN_OBSERVATIONS {
            return Err(ModelError::TooFewObservations {
                observed: n,
                required: MIN_OBSERVATIONS,
            });
        }

        let mut sorted_dates = dates.clone();
        sorted_dates.sort();
        let start = sorted_dates[0];
        let span_days = (sorted_dates[n - 1] - start).num_days() as f64;
        if span_days <= 0.0 {
            return Err(ModelError::DegenerateTimeRange);
        }
        let min_spacing_days = sorted_dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days() as f64)
            .filter(|d| *d > 0.0)
            .fold(f64::INFINITY, f64::min);

        let y_scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };
        let ys: Vec<f64> = values.iter().map(|v| v / y_scale).collect();

        let sorted_t: Vec<f64> = sorted_dates
            .iter()
            .map(|d| (*d - start).num_days() as f64 / span_days)
            .collect();

        let mut fit = AdditiveFit {
            start,
            span_days,
            y_scale,
            changepoints: self.changepoints(&sorted_t),
            seasonalities: Self::seasonalities(seasonality, span_days, min_spacing_days),
            coefficients: Vec::new(),
            sigma: 0.0,
            z: 0.0,
        };

        let rows: Vec<Vec<f64>> = dates.iter().map(|d| fit.features(*d)).collect();
        let width = fit.width();

        let mut prior_sd = vec![self.trend_prior_scale; 2];
        prior_sd.extend(std::iter::repeat_n(self.changepoint_prior_scale, fit.changepoints.len()));
        prior_sd.extend(std::iter::repeat_n(self.seasonality_prior_scale, width - prior_sd.len()));

        let noise_variance = baseline_noise_variance(&rows, &ys).max(MIN_NOISE_VARIANCE);

        let mut xtx = Matrix::zeros(width);
        let mut xty = vec![0.0; width];
        for (row, y) in rows.iter().zip(&ys) {
            for i in 0..width {
                xty[i] += row[i] * y;
                for j in 0..width {
                    xtx.add(i, j, row[i] * row[j]);
                }
            }
        }
        for (i, sd) in prior_sd.iter().enumerate() {
            xtx.add(i, i, noise_variance / (sd * sd));
        }

        fit.coefficients = xtx.solve_spd(&xty).ok_or(ModelError::Singular)?;

        let rss: f64 = rows
            .iter()
            .zip(&ys)
            .map(|(row, y)| (y - dot(row, &fit.coefficients)).powi(2))
            .sum();
        fit.sigma = (rss / n as f64).sqrt();

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ModelError::InvalidParameter(e.to_string()))?;
        fit.z = normal.inverse_cdf(0.5 + self.interval_width / 2.0);

        let components = fit.seasonality_names();
        debug!(
            observations = n,
            changepoints = fit.changepoint_count(),
            seasonalities = ?components,
            sigma = fit.sigma * y_scale,
            "Fitted additive model"
        );

        Ok(Box::new(fit))
    }
}

/// Residual variance of a plain least-squares line through the data, used
/// as the noise level that weighs the priors against the likelihood.
fn baseline_noise_variance(rows: &[Vec<f64>], ys: &[f64]) -> f64 {
    let n = ys.len() as f64;
    let t: Vec<f64> = rows.iter().map(|r| r[1]).collect();
    let mean_t = t.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let sxx: f64 = t.iter().map(|x| (x - mean_t).powi(2)).sum();
    let sxy: f64 = t.iter().zip(ys).map(|(x, y)| (x - mean_t) * (y - mean_y)).sum();
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_t;

    t.iter()
        .zip(ys)
        .map(|(x, y)| (y - intercept - slope * x).powi(2))
        .sum::<f64>()
        / n
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Trained [`AdditiveModel`].
#[derive(Debug, Clone)]
pub struct AdditiveFit {
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    coefficients: Vec<f64>,
    /// Residual standard deviation in scaled units
    sigma: f64,
    z: f64,
}

impl AdditiveFit {
    fn trend_width(&self) -> usize {
        2 + self.changepoints.len()
    }

    fn width(&self) -> usize {
        self.trend_width() + self.seasonalities.iter().map(|s| 2 * s.order).sum::<usize>()
    }

    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    /// Design row: intercept, growth, changepoint hinges, then sin/cos pairs.
    fn features(&self, date: NaiveDate) -> Vec<f64> {
        let t = self.scaled_time(date);
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|cp| (t - cp).max(0.0)));

        // Fourier terms run on absolute time so the phase does not depend on the window
        let days = (date - NaiveDate::default()).num_days() as f64;
        for seasonality in &self.seasonalities {
            for k in 1..=seasonality.order {
                let angle = 2.0 * PI * k as f64 * days / seasonality.period_days;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        row
    }

    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }

    pub fn seasonality_names(&self) -> Vec<&'static str> {
        self.seasonalities.iter().map(|s| s.name).collect()
    }
}

impl FittedModel for AdditiveFit {
    fn predict(&self, future: &DataFrame) -> Result<DataFrame, ModelError> {
        let dates = date_column(future, DS)?;
        trace!("Predicting {} rows", dates.len());

        let trend_width = self.trend_width();
        let mut trend = Vec::with_capacity(dates.len());
        let mut yhat = Vec::with_capacity(dates.len());
        let mut lower = Vec::with_capacity(dates.len());
        let mut upper = Vec::with_capacity(dates.len());

        for date in &dates {
            let row = self.features(*date);
            let level = dot(&row[..trend_width], &self.coefficients[..trend_width]);
            let value = dot(&row, &self.coefficients);

            // Band widens with the distance past the end of the history
            let beyond = (self.scaled_time(*date) - 1.0).max(0.0);
            let half_width = self.z * self.sigma * (1.0 + beyond).sqrt();

            trend.push(level * self.y_scale);
            yhat.push(value * self.y_scale);
            lower.push((value - half_width) * self.y_scale);
            upper.push((value + half_width) * self.y_scale);
        }

        let df = DataFrame::new(vec![
            Series::new(DS.into(), dates).into(),
            Series::new(TREND.into(), trend).into(),
            Series::new(YHAT_LOWER.into(), lower).into(),
            Series::new(YHAT_UPPER.into(), upper).into(),
            Series::new(YHAT.into(), yhat).into(),
        ])?;

        Ok(df)
    }
}
