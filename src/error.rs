use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    #[error("No {dataset} dataset (.json or .csv) in {dir}")]
    MissingDataset { dataset: String, dir: String },
}

impl RadarError {
    /// Transport failures, rate limiting and upstream 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            RadarError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RadarError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RadarError>;
