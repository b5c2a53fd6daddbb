use async_trait::async_trait;
use marquee_config::TmdbConfig;
use marquee_model::{ListingPage, RawMovie, RawPerson};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use url::Url;

use super::MetadataApi;
use crate::error::ProviderError;

/// Params the client sets itself; listing params with these names are not
/// forwarded verbatim.
const RESERVED_PARAMS: [&str; 4] = ["api_key", "page", "language", "region"];

#[derive(Debug, Serialize)]
struct ListingQuery<'a> {
    api_key: &'a str,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TmdbErrorBody {
    #[serde(default)]
    status_message: Option<String>,
}

/// [`MetadataApi`] backed by the TMDB v3 REST API.
#[derive(Clone)]
pub struct TmdbMetadataApi {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
    language: Option<String>,
    region: Option<String>,
}

impl std::fmt::Debug for TmdbMetadataApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbMetadataApi")
            .field("base_url", &self.base_url.as_str())
            .field("language", &self.language)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl TmdbMetadataApi {
    pub fn new(api_key: impl Into<String>, base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url,
            language: None,
            region: None,
        }
    }

    pub fn from_config(config: &TmdbConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            language: config.language.clone(),
            region: config.region.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::ApiError(format!(
                    "base url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_tmdb_json<T>(
        &self,
        url: Url,
        page: u32,
        params: &BTreeMap<String, String>,
    ) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::InvalidApiKey);
        }

        let query = ListingQuery {
            api_key: &self.api_key,
            page: page.max(1),
            language: params
                .get("language")
                .map(String::as_str)
                .or(self.language.as_deref()),
            region: params
                .get("region")
                .map(String::as_str)
                .or(self.region.as_deref()),
        };
        let extra: Vec<(&str, &str)> = params
            .iter()
            .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        debug!(path = url.path(), page = query.page, "requesting TMDB listing");
        let response = self
            .http
            .get(url)
            .query(&query)
            .query(&extra)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str::<T>(&body)
                .map_err(|err| ProviderError::ParseError(err.to_string()));
        }

        let message = response
            .json::<TmdbErrorBody>()
            .await
            .ok()
            .and_then(|body| body.status_message)
            .unwrap_or_else(|| {
                format!("TMDB request failed with status {}", status)
            });

        match status.as_u16() {
            401 => Err(ProviderError::InvalidApiKey),
            404 => Err(ProviderError::NotFound),
            429 => Err(ProviderError::RateLimited),
            _ => Err(ProviderError::ApiError(message)),
        }
    }
}

#[async_trait]
impl MetadataApi for TmdbMetadataApi {
    #[instrument(skip(self, params))]
    async fn movie_listing(
        &self,
        category: &str,
        page: u32,
        params: &BTreeMap<String, String>,
    ) -> Result<ListingPage<RawMovie>, ProviderError> {
        let url = self.endpoint(&["movie", category])?;
        self.get_tmdb_json(url, page, params).await
    }

    #[instrument(skip(self))]
    async fn popular_people(
        &self,
        page: u32,
    ) -> Result<ListingPage<RawPerson>, ProviderError> {
        let url = self.endpoint(&["person", "popular"])?;
        self.get_tmdb_json(url, page, &BTreeMap::new()).await
    }
}
