use marquee_model::ViewStyle;
use std::sync::Arc;
use tracing::debug;

use crate::{
    catalog::{FetchOrchestrator, ListingKey, LoadOutcome},
    error::FetchFailure,
    providers::Fetchable,
    query_sync::{read_page, write_page},
    view_style::ViewStyleState,
};

/// Skeleton cards rendered while a page has nothing to show yet.
pub const PLACEHOLDER_CARDS: usize = 20;

/// One listing page as a view would render it.
#[derive(Debug, Clone)]
pub struct PageView<E> {
    pub title: String,
    pub listing: ListingKey,
    pub page: u32,
    pub items: Vec<E>,
    pub total_pages: Option<u32>,
    pub is_fetching: bool,
    /// The listing's last failure, when it was for this page.
    pub last_error: Option<FetchFailure>,
    pub view_style: ViewStyle,
    pub outcome: LoadOutcome,
}

impl<E> PageView<E> {
    /// Pager is shown only for multi-page listings with the current page in range.
    pub fn show_pager(&self) -> bool {
        matches!(self.total_pages, Some(total) if total > 1 && self.page <= total)
    }

    /// Following page, if the listing is known to have one.
    pub fn next_page(&self) -> Option<u32> {
        match self.total_pages {
            Some(total) if self.page < total => Some(self.page + 1),
            _ => None,
        }
    }

    pub fn grid_columns(&self) -> u16 {
        self.view_style.grid_columns()
    }

    pub fn placeholder_count(&self) -> usize {
        if self.is_fetching && self.items.is_empty() {
            PLACEHOLDER_CARDS
        } else {
            0
        }
    }
}

/// Drives one namespace's listing pages from a location query string.
#[derive(Debug, Clone)]
pub struct PageController<E: Fetchable> {
    orchestrator: Arc<FetchOrchestrator<E>>,
    view_style: ViewStyleState,
}

impl<E: Fetchable> PageController<E> {
    pub fn new(
        orchestrator: Arc<FetchOrchestrator<E>>,
        view_style: ViewStyleState,
    ) -> Self {
        Self {
            orchestrator,
            view_style,
        }
    }

    pub async fn load(&self, listing: &ListingKey, query: &str) -> PageView<E> {
        let page = read_page(query);
        let outcome = self.orchestrator.ensure_loaded(listing, page).await;
        let snapshot = self.orchestrator.state().snapshot(listing, page);
        debug!(%listing, page, ?outcome, "page view resolved");

        PageView {
            title: E::listing_title(listing),
            listing: listing.clone(),
            page,
            items: snapshot.entities.unwrap_or_default(),
            total_pages: snapshot.total_pages,
            is_fetching: snapshot.is_fetching,
            last_error: snapshot
                .last_error
                .filter(|failure| failure.page == page),
            view_style: self.view_style.get(),
            outcome,
        }
    }

    /// Link target for a pager button.
    pub fn page_href(&self, query: &str, page: u32) -> String {
        let query = write_page(query.strip_prefix('?').unwrap_or(query), page);
        format!("?{query}")
    }

    pub fn view_style(&self) -> &ViewStyleState {
        &self.view_style
    }
}
