use reqwest::StatusCode;

/// A single failed attempt at reading the stats endpoint.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Request to the stats endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Stats endpoint answered with status {0}")]
    Status(StatusCode),
    #[error("Stats body is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Raised once the contiguous failure count exceeds the configured maximum.
#[derive(thiserror::Error, Debug)]
#[error("Giving up after more than {max_failures} contiguous fetch failures, last error: {last}")]
pub struct RetryExhausted {
    pub max_failures: u32,
    #[source]
    pub last: FetchError,
}

#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("Failed to send metric to statsd: {0}")]
    Io(#[from] std::io::Error),
    #[error("statsd address {0:?} did not resolve")]
    Unresolved(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("column {position} is missing")]
    Missing { position: usize },
    #[error("column {position} is not an integer: {value:?}")]
    NotNumeric { position: usize, value: String },
}
