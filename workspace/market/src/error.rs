use thiserror::Error;

/// Error types for market data providers
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// Transport level failure (DNS, TLS, timeout, connection reset)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status} for {symbol}")]
    HttpStatus { status: u16, symbol: String },

    /// Provider reported an error in its payload (unknown symbol, rate limit)
    #[error("Provider error [{code}]: {description}")]
    Api { code: String, description: String },

    /// Payload could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic provider failure
    #[error("{0}")]
    Provider(String),
}

/// Type alias for Result with MarketDataError
pub type Result<T> = std::result::Result<T, MarketDataError>;
