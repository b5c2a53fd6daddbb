//! Configuration loading for Marquee.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables (optionally seeded from a `.env` file). The catalog
//! core only ever sees the typed [`Config`] produced here.

pub mod error;
pub mod loader;
pub mod models;
pub mod sources;
pub mod warnings;

pub use error::ConfigLoadError;
pub use loader::{ConfigLoad, ConfigLoader};
pub use models::{
    CatalogConfig, Config, ConfigMetadata, DEFAULT_EVENT_CAPACITY,
    FetchSettings, StaleResponseMode, TmdbConfig,
};
pub use sources::{EnvConfig, FileConfig};
pub use warnings::{ConfigWarning, ConfigWarnings};
