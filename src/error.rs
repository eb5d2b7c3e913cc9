use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Unknown frequency '{0}': expected once, daily, weekly, monthly or yearly")]
    UnknownFrequency(String),

    #[error("Invalid weekly factor {0}: must not be negative")]
    InvalidWeeklyFactor(Decimal),

    #[error("Invalid change tolerance {0}: must not be negative")]
    InvalidChangeTolerance(Decimal),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;
