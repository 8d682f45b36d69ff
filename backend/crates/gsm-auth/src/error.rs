use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing API key {location}")]
    MissingApiKey { location: ErrorLocation },

    #[error("Invalid API key {location}")]
    InvalidApiKey { location: ErrorLocation },

    #[error("Rate limit exceeded: {limit} requests per {window_secs}s {location}")]
    RateLimitExceeded {
        limit: u32,
        window_secs: u64,
        location: ErrorLocation,
    },
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey { .. } => "MISSING_API_KEY",
            Self::InvalidApiKey { .. } => "INVALID_API_KEY",
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
        }
    }

    /// Client-facing message without the source location.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingApiKey { .. } => {
                String::from("API key required: send it in the X-API-Key header")
            }
            Self::InvalidApiKey { .. } => String::from("Invalid API key"),
            Self::RateLimitExceeded {
                limit, window_secs, ..
            } => format!("Rate limit exceeded: {limit} requests per {window_secs}s"),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
