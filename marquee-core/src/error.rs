use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Transport or API failure reported by a [`MetadataApi`](crate::providers::MetadataApi).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Not found")]
    NotFound,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported listing '{0}'")]
    UnsupportedListing(String),
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::InvalidApiKey | ProviderError::NotFound => false,
            ProviderError::ParseError(_)
            | ProviderError::UnsupportedListing(_) => false,
            ProviderError::ApiError(_)
            | ProviderError::RateLimited
            | ProviderError::NetworkError(_) => true,
        }
    }
}

/// Caller mistakes the cache layer refuses to act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("listing category must not be empty")]
    EmptyCategory,

    #[error("invalid page input '{0}'")]
    InvalidPageInput(String),
}

/// Recorded as a listing's `last_error` when a fetch fails. Nothing is
/// committed for the page, so the next request for it is a genuine miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub page: u32,
    pub attempts: u32,
    pub message: String,
    pub failed_at: DateTime<Utc>,
}

impl FetchFailure {
    pub fn new(page: u32, attempts: u32, error: &ProviderError) -> Self {
        Self {
            page,
            attempts,
            message: error.to_string(),
            failed_at: Utc::now(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} failed after {} attempt(s): {}",
            self.page, self.attempts, self.message
        )
    }
}
