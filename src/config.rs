use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use compute::{default_engine, ForecastSettings};
use config::{Config, Environment, File};
use market::{CsvFileProvider, MarketDataProvider, YahooFinanceProvider};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::presentation::PlotlyPresenter;
use crate::schemas::AppState;

/// Config file looked up in the working directory when no path is given
const DEFAULT_CONFIG_FILE: &str = "pricecast";
const ENV_PREFIX: &str = "PRICECAST";
/// Upper bound on `forecast.lookback_days`, about a century
const MAX_LOOKBACK_DAYS: u32 = 36_525;

/// Application configuration.
///
/// Layered as defaults, then the config file, then `PRICECAST__*`
/// environment variables (e.g. `PRICECAST__FORECAST__HORIZON_DAYS=3`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub forecast: ForecastSettings,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Upper bound on a whole HTTP request, fetch and fit included
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    Yahoo {
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default = "default_provider_timeout")]
        timeout_secs: u64,
    },
    Csv {
        path: PathBuf,
    },
}

fn default_provider_timeout() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Yahoo {
            base_url: None,
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from `path`, or from an optional
    /// `pricecast.toml` in the working directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let forecast = &self.forecast;
        if forecast.symbol.trim().is_empty() {
            bail!("forecast.symbol must not be empty");
        }
        if forecast.lookback_days == 0 || forecast.lookback_days > MAX_LOOKBACK_DAYS {
            bail!(
                "forecast.lookback_days must be between 1 and {}, got {}",
                MAX_LOOKBACK_DAYS,
                forecast.lookback_days
            );
        }
        if forecast.horizon_days == 0 {
            bail!("forecast.horizon_days must be at least 1");
        }
        if self.server.request_timeout_secs == 0 {
            bail!("server.request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}

pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn MarketDataProvider>> {
    let provider: Arc<dyn MarketDataProvider> = match config {
        ProviderConfig::Yahoo {
            base_url,
            timeout_secs,
        } => Arc::new(
            YahooFinanceProvider::new(Duration::from_secs(*timeout_secs), base_url.clone())
                .context("Failed to build the Yahoo Finance client")?,
        ),
        ProviderConfig::Csv { path } => {
            if !path.is_file() {
                bail!("Price file {} does not exist", path.display());
            }
            Arc::new(CsvFileProvider::new(path.clone()))
        }
    };

    info!("Using {} market data provider", provider.name());
    Ok(provider)
}

/// Initialize application state from the configuration
pub fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    let provider = build_provider(&config.provider)?;
    let engine = default_engine(provider, config.forecast.clone());
    Ok(AppState::new(engine, Arc::new(PlotlyPresenter)))
}
