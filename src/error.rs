/// Client-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    Network(String),

    /// Structured error reported by the recommendation service, surfaced verbatim
    #[error("{0}")]
    Validation(String),

    #[error("Rate at least {required} songs to get recommendations ({rated} rated so far)")]
    NotEligible { rated: usize, required: usize },

    #[error("Stored ratings could not be parsed: {0}")]
    PersistenceParse(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session was reset while the recommendation request was in flight")]
    StaleResponse,
}

impl AppError {
    /// True for transport failures and non-success responses without an error body
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::HttpClient(_) | AppError::Network(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
