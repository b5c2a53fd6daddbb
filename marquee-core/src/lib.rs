//! # Marquee Core
//!
//! Client-side cache for paginated TMDB movie and people listings.
//!
//! ## Overview
//!
//! - **Entity Store**: normalized entities keyed by id, one store per namespace
//! - **Pagination Index**: ordered id lists per listing page, plus totals and fetch flags
//! - **Fetch Orchestrator**: loads a page at most once per key and commits it atomically
//! - **Query Synchronizer**: reads and writes the `page` parameter of a query string
//! - **View Style State**: the shared poster/backdrop toggle
//!
//! ## Architecture
//!
//! - [`catalog`]: store, index, per-namespace state and the orchestrator
//! - [`providers`]: the [`MetadataApi`](providers::MetadataApi) seam and its TMDB client
//! - [`controller`]: page views assembled from a query string
//! - [`query_sync`]: `page` query parameter handling
//! - [`view_style`]: global view style slot
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use marquee_config::ConfigLoader;
//! use marquee_core::{Catalog, providers::TmdbMetadataApi};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ConfigLoader::new().load()?.config;
//! let api = Arc::new(TmdbMetadataApi::from_config(&config.tmdb)?);
//! let catalog = Catalog::from_config(api, &config.catalog);
//!
//! let listing = catalog.movie_listing("popular")?;
//! let view = catalog.movie_pages().load(&listing, "page=2").await;
//! println!("{} ({} movies)", view.title, view.items.len());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod controller;
pub mod error;
pub mod providers;
pub mod query_sync;
pub mod view_style;

pub use catalog::{
    Catalog, CatalogEvent, CatalogState, FetchOrchestrator, FetchPolicy,
    ListingKey, LoadOutcome, PageFetchState, RetryPolicy, StaleResponsePolicy,
};
pub use controller::{PageController, PageView};
pub use error::{CatalogError, FetchFailure, ProviderError};
pub use providers::{Fetchable, MetadataApi};
pub use query_sync::{read_page, write_page};
pub use view_style::ViewStyleState;
