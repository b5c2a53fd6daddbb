use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf};

use crate::models::StaleResponseMode;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub tmdb: FileTmdbConfig,
    #[serde(default)]
    pub catalog: FileCatalogConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// humantime duration, e.g. `15s`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_max_attempts: Option<u32>,
    /// humantime duration, e.g. `250ms`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_backoff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_responses: Option<StaleResponseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_capacity: Option<usize>,
}

/// Environment overrides, kept as raw strings until composition so invalid
/// values can be reported with their key.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: Option<String>,
    pub tmdb_image_base_url: Option<String>,
    pub tmdb_language: Option<String>,
    pub tmdb_region: Option<String>,
    pub tmdb_request_timeout: Option<String>,
    pub default_region: Option<String>,
    pub fetch_max_attempts: Option<String>,
    pub fetch_backoff: Option<String>,
    pub stale_responses: Option<String>,
    pub event_capacity: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_lookup(|key| map.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            config_path: var("MARQUEE_CONFIG_PATH").map(PathBuf::from),
            tmdb_api_key: var("TMDB_API_KEY"),
            tmdb_base_url: var("TMDB_BASE_URL"),
            tmdb_image_base_url: var("TMDB_IMAGE_BASE_URL"),
            tmdb_language: var("TMDB_LANG"),
            tmdb_region: var("TMDB_REGION"),
            tmdb_request_timeout: var("TMDB_REQUEST_TIMEOUT"),
            default_region: var("MARQUEE_DEFAULT_REGION"),
            fetch_max_attempts: var("MARQUEE_FETCH_MAX_ATTEMPTS"),
            fetch_backoff: var("MARQUEE_FETCH_BACKOFF"),
            stale_responses: var("MARQUEE_STALE_RESPONSES"),
            event_capacity: var("MARQUEE_EVENT_CAPACITY"),
        }
    }
}
