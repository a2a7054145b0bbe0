use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

pub mod commands;

use commands::{forecast, serve};

#[derive(Parser)]
#[command(name = "pricecast")]
#[command(about = "Commodity closing price forecasts as a web form, a JSON API and a CLI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Path to a configuration file (TOML, YAML or JSON)
        ///
        /// Defaults to an optional pricecast.toml in the working directory.
        #[arg(short, long, env = "PRICECAST_CONFIG")]
        config: Option<PathBuf>,

        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080).
        /// Overrides server.bind_address from the configuration.
        #[arg(short, long, env = "BIND_ADDRESS")]
        bind_address: Option<String>,
    },
    /// Run one forecast and print it
    Forecast {
        /// Path to a configuration file (TOML, YAML or JSON)
        #[arg(short, long, env = "PRICECAST_CONFIG")]
        config: Option<PathBuf>,

        /// Ticker to forecast instead of the configured one
        #[arg(short, long)]
        symbol: Option<String>,

        /// Date the history window ends on (YYYY-MM-DD), today by default
        #[arg(short, long)]
        now: Option<NaiveDate>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve { config, bind_address } => {
                serve(config.as_deref(), bind_address).await?;
            }
            Commands::Forecast { config, symbol, now } => {
                forecast(config.as_deref(), symbol, now).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forecast_command() {
        let cli = Cli::try_parse_from([
            "pricecast",
            "forecast",
            "--symbol",
            "CL=F",
            "--now",
            "2024-06-15",
        ])
        .unwrap();

        match cli.command {
            Commands::Forecast { symbol, now, .. } => {
                assert_eq!(symbol.as_deref(), Some("CL=F"));
                assert_eq!(now, NaiveDate::from_ymd_opt(2024, 6, 15));
            }
            _ => panic!("Expected forecast command"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        assert!(Cli::try_parse_from(["pricecast", "forecast", "--now", "15-06-2024"]).is_err());
    }
}
