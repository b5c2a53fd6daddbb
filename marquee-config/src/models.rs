use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};
use url::Url;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_EVENT_CAPACITY: usize = 256;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb: TmdbConfig,
    pub catalog: CatalogConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: Url,
    pub image_base_url: Url,
    pub language: Option<String>,
    pub region: Option<String>,
    pub request_timeout: Duration,
}

impl TmdbConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &if self.has_api_key() { "<set>" } else { "<unset>" })
            .field("base_url", &self.base_url.as_str())
            .field("image_base_url", &self.image_base_url.as_str())
            .field("language", &self.language)
            .field("region", &self.region)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Region passed as an auxiliary listing param when the caller does not
    /// choose one.
    pub default_region: Option<String>,
    pub fetch: FetchSettings,
    pub stale_responses: StaleResponseMode,
    pub event_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_region: Some("US".to_string()),
            fetch: FetchSettings::default(),
            stale_responses: StaleResponseMode::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Network attempt budget per fetch. One attempt means no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::from_millis(250),
        }
    }
}

/// What to do with a response whose fetch was superseded by a newer fetch
/// in the same listing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StaleResponseMode {
    #[default]
    Commit,
    Discard,
}

impl FromStr for StaleResponseMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "commit" => Ok(Self::Commit),
            "discard" => Ok(Self::Discard),
            other => Err(format!("expected 'commit' or 'discard', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
