use once_cell::sync::Lazy;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use tracing::debug;
use url::Url;

use crate::{
    error::ConfigLoadError,
    models::{
        CatalogConfig, Config, ConfigMetadata, DEFAULT_EVENT_CAPACITY,
        DEFAULT_REQUEST_TIMEOUT, DEFAULT_TMDB_BASE_URL,
        DEFAULT_TMDB_IMAGE_BASE_URL, FetchSettings, StaleResponseMode,
        TmdbConfig,
    },
    sources::{EnvConfig, FileConfig},
    warnings::ConfigWarnings,
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("marquee.toml"),
        PathBuf::from("config/marquee.toml"),
    ]
});

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Load `.env` (if present), then compose file and process environment.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.compose(EnvConfig::gather(), env_file_loaded)
    }

    /// Compose configuration from an explicit environment snapshot without
    /// touching the process environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        self.compose(env, false)
    }

    fn compose(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();
        let (file, config_path) = self.load_file_config(&env)?;
        let FileConfig {
            tmdb: file_tmdb,
            catalog: file_catalog,
        } = file.unwrap_or_default();

        let api_key = env.tmdb_api_key.or(file_tmdb.api_key).unwrap_or_default();
        if api_key.trim().is_empty() {
            warnings.push_with_hint(
                "TMDB API key is not configured; listing requests will be rejected",
                "set TMDB_API_KEY or tmdb.api_key",
            );
        }

        let base_url = parse_url(
            "TMDB_BASE_URL",
            env.tmdb_base_url
                .or(file_tmdb.base_url)
                .as_deref()
                .unwrap_or(DEFAULT_TMDB_BASE_URL),
        )?;
        let image_base_url = parse_url(
            "TMDB_IMAGE_BASE_URL",
            env.tmdb_image_base_url
                .or(file_tmdb.image_base_url)
                .as_deref()
                .unwrap_or(DEFAULT_TMDB_IMAGE_BASE_URL),
        )?;
        let request_timeout = env
            .tmdb_request_timeout
            .or(file_tmdb.request_timeout)
            .map(|raw| parse_duration("TMDB_REQUEST_TIMEOUT", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let tmdb = TmdbConfig {
            api_key,
            base_url,
            image_base_url,
            language: env.tmdb_language.or(file_tmdb.language),
            region: env.tmdb_region.or(file_tmdb.region),
            request_timeout,
        };

        let defaults = FetchSettings::default();
        let max_attempts = match env.fetch_max_attempts {
            Some(raw) => parse_number::<u32>("MARQUEE_FETCH_MAX_ATTEMPTS", &raw)?,
            None => file_catalog
                .fetch_max_attempts
                .unwrap_or(defaults.max_attempts),
        };
        if max_attempts == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "MARQUEE_FETCH_MAX_ATTEMPTS",
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }
        let backoff = env
            .fetch_backoff
            .or(file_catalog.fetch_backoff)
            .map(|raw| parse_duration("MARQUEE_FETCH_BACKOFF", &raw))
            .transpose()?
            .unwrap_or(defaults.backoff);
        if max_attempts > 1 && backoff.is_zero() {
            warnings.push(
                "fetch retries are enabled with a zero backoff; failed listings will be retried immediately",
            );
        }

        let stale_responses = match env.stale_responses {
            Some(raw) => StaleResponseMode::from_str(&raw).map_err(|reason| {
                ConfigLoadError::InvalidValue {
                    key: "MARQUEE_STALE_RESPONSES",
                    value: raw.clone(),
                    reason,
                }
            })?,
            None => file_catalog.stale_responses.unwrap_or_default(),
        };

        let event_capacity = match env.event_capacity {
            Some(raw) => parse_number::<usize>("MARQUEE_EVENT_CAPACITY", &raw)?,
            None => file_catalog
                .event_capacity
                .unwrap_or(DEFAULT_EVENT_CAPACITY),
        }
        .max(1);

        let default_region = env
            .default_region
            .or(file_catalog.default_region)
            .or_else(|| CatalogConfig::default().default_region)
            .filter(|region| !region.eq_ignore_ascii_case("none"));

        let catalog = CatalogConfig {
            default_region,
            fetch: FetchSettings {
                max_attempts,
                backoff,
            },
            stale_responses,
            event_capacity,
        };

        let config = Config {
            tmdb,
            catalog,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };
        debug!(?config, "configuration composed");

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                path
            }
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path.clone(),
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigLoadError> {
    Url::parse(raw.trim()).map_err(|err| ConfigLoadError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: err.to_string(),
    })
}

fn parse_duration(
    key: &'static str,
    raw: &str,
) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw.trim()).map_err(|err| {
        ConfigLoadError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: err.to_string(),
        }
    })
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigLoadError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| ConfigLoadError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_or_env() {
        let load = ConfigLoader::new()
            .load_with_env(EnvConfig::default())
            .expect("config");

        assert_eq!(load.config.tmdb.base_url.as_str(), "https://api.themoviedb.org/3");
        assert_eq!(load.config.catalog.fetch.max_attempts, 1);
        assert_eq!(load.config.catalog.default_region.as_deref(), Some("US"));
        assert_eq!(
            load.config.catalog.stale_responses,
            StaleResponseMode::Commit
        );
        // missing API key
        assert_eq!(load.warnings.len(), 1);
    }

    #[test]
    fn env_values_are_validated_with_their_key() {
        let env = EnvConfig::from_pairs([("MARQUEE_FETCH_BACKOFF", "soon")]);
        let err = ConfigLoader::new()
            .load_with_env(env)
            .expect_err("invalid backoff");

        assert!(matches!(
            err,
            ConfigLoadError::InvalidValue {
                key: "MARQUEE_FETCH_BACKOFF",
                ..
            }
        ));
    }

    #[test]
    fn zero_attempts_rejected() {
        let env = EnvConfig::from_pairs([("MARQUEE_FETCH_MAX_ATTEMPTS", "0")]);
        assert!(ConfigLoader::new().load_with_env(env).is_err());
    }

    #[test]
    fn region_none_disables_default_region() {
        let env = EnvConfig::from_pairs([
            ("MARQUEE_DEFAULT_REGION", "none"),
            ("TMDB_API_KEY", "k"),
        ]);
        let load = ConfigLoader::new().load_with_env(env).expect("config");
        assert_eq!(load.config.catalog.default_region, None);
        assert!(load.warnings.is_empty());
    }
}
