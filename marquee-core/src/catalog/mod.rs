//! Normalized entity cache and per-listing pagination for movies and people.

pub mod entity_store;
pub mod events;
pub mod listing;
pub mod orchestrator;
pub mod pagination;
pub mod state;

pub use entity_store::{EntityStore, NormalizedPage, normalize_records};
pub use events::CatalogEvent;
pub use listing::ListingKey;
pub use orchestrator::{
    FetchOrchestrator, FetchPolicy, FetchStats, LoadOutcome, RetryPolicy,
    StaleResponsePolicy,
};
pub use pagination::{CategoryPaginationState, PageFetchState, PaginationIndex};
pub use state::{CatalogState, CommitSummary, PageSnapshot};

use marquee_config::{CatalogConfig, DEFAULT_EVENT_CAPACITY};
use marquee_model::{MovieEntity, PersonEntity};
use std::sync::Arc;

use crate::{
    controller::PageController,
    error::CatalogError,
    providers::{MetadataApi, PEOPLE_CATEGORY},
    view_style::{self, ViewStyleState},
};

/// Both namespaces wired to one metadata API.
#[derive(Debug, Clone)]
pub struct Catalog {
    movies: Arc<FetchOrchestrator<MovieEntity>>,
    people: Arc<FetchOrchestrator<PersonEntity>>,
    view_style: ViewStyleState,
    default_region: Option<String>,
}

impl Catalog {
    pub fn new(api: Arc<dyn MetadataApi>, policy: FetchPolicy) -> Self {
        Self::with_event_capacity(api, policy, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_event_capacity(
        api: Arc<dyn MetadataApi>,
        policy: FetchPolicy,
        event_capacity: usize,
    ) -> Self {
        let movies = FetchOrchestrator::new(
            Arc::new(CatalogState::new(event_capacity)),
            Arc::clone(&api),
            policy,
        );
        let people = FetchOrchestrator::new(
            Arc::new(CatalogState::new(event_capacity)),
            api,
            policy,
        );

        Self {
            movies: Arc::new(movies),
            people: Arc::new(people),
            view_style: view_style::global().clone(),
            default_region: None,
        }
    }

    pub fn from_config(api: Arc<dyn MetadataApi>, config: &CatalogConfig) -> Self {
        let mut catalog = Self::with_event_capacity(
            api,
            FetchPolicy::from(config),
            config.event_capacity,
        );
        catalog.default_region = config.default_region.clone();
        catalog
    }

    /// Use a private view style instead of the process-wide one.
    pub fn with_view_style(mut self, view_style: ViewStyleState) -> Self {
        self.view_style = view_style;
        self
    }

    pub fn movies(&self) -> &Arc<FetchOrchestrator<MovieEntity>> {
        &self.movies
    }

    pub fn people(&self) -> &Arc<FetchOrchestrator<PersonEntity>> {
        &self.people
    }

    pub fn view_style(&self) -> &ViewStyleState {
        &self.view_style
    }

    /// Key for a movie listing, scoped to the default region if one is set.
    pub fn movie_listing(&self, category: &str) -> Result<ListingKey, CatalogError> {
        Ok(ListingKey::new(category)?.with_region(self.default_region.as_deref()))
    }

    pub fn people_listing(&self) -> ListingKey {
        ListingKey::from_static(PEOPLE_CATEGORY)
    }

    pub fn movie_pages(&self) -> PageController<MovieEntity> {
        PageController::new(Arc::clone(&self.movies), self.view_style.clone())
    }

    pub fn people_pages(&self) -> PageController<PersonEntity> {
        PageController::new(Arc::clone(&self.people), self.view_style.clone())
    }
}
