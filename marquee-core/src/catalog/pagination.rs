use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    hash::Hash,
};

use super::listing::ListingKey;
use crate::error::FetchFailure;

/// Where a single page of a listing stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFetchState {
    Unfetched,
    Fetching,
    /// Committed, or known to lie beyond the last page.
    Fetched,
    /// The latest attempt failed; nothing was committed.
    Failed,
}

/// Pagination bookkeeping for one listing.
#[derive(Debug, Clone)]
pub struct CategoryPaginationState<Id> {
    pages: BTreeMap<u32, Vec<Id>>,
    total_pages: Option<u32>,
    in_flight: BTreeSet<u32>,
    failed: BTreeSet<u32>,
    last_error: Option<FetchFailure>,
    generation: u64,
}

impl<Id> Default for CategoryPaginationState<Id> {
    fn default() -> Self {
        Self {
            pages: BTreeMap::new(),
            total_pages: None,
            in_flight: BTreeSet::new(),
            failed: BTreeSet::new(),
            last_error: None,
            generation: 0,
        }
    }
}

impl<Id> CategoryPaginationState<Id> {
    /// Ids for `page`. Pages past a known total resolve to an empty slice.
    pub fn page(&self, page: u32) -> Option<&[Id]> {
        if let Some(ids) = self.pages.get(&page) {
            return Some(ids.as_slice());
        }
        if self.is_beyond_last(page) {
            return Some(&[]);
        }
        None
    }

    pub fn has_page(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn is_beyond_last(&self, page: u32) -> bool {
        matches!(self.total_pages, Some(total) if page > total)
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn is_fetching(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn is_fetching_page(&self, page: u32) -> bool {
        self.in_flight.contains(&page)
    }

    pub fn fetched_pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn last_error(&self) -> Option<&FetchFailure> {
        self.last_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetch_state(&self, page: u32) -> PageFetchState {
        if self.in_flight.contains(&page) {
            PageFetchState::Fetching
        } else if self.pages.contains_key(&page) || self.is_beyond_last(page) {
            PageFetchState::Fetched
        } else if self.failed.contains(&page) {
            PageFetchState::Failed
        } else {
            PageFetchState::Unfetched
        }
    }

    /// Mark `page` in flight and return the listing's new generation.
    pub(crate) fn begin_fetch(&mut self, page: u32) -> u64 {
        self.in_flight.insert(page);
        self.generation += 1;
        self.generation
    }

    pub(crate) fn record_page(
        &mut self,
        page: u32,
        ids: Vec<Id>,
        total_pages: u32,
    ) {
        self.pages.insert(page, ids);
        self.total_pages = Some(total_pages);
        self.in_flight.remove(&page);
        self.failed.remove(&page);
        self.last_error = None;
    }

    pub(crate) fn record_failure(&mut self, failure: FetchFailure) {
        self.in_flight.remove(&failure.page);
        self.failed.insert(failure.page);
        self.last_error = Some(failure);
    }

    /// Clear the in-flight flag without recording any result.
    pub(crate) fn abandon(&mut self, page: u32) {
        self.in_flight.remove(&page);
    }
}

/// Per-listing pagination state for one namespace.
#[derive(Debug)]
pub struct PaginationIndex<Id> {
    listings: HashMap<ListingKey, CategoryPaginationState<Id>>,
}

impl<Id> Default for PaginationIndex<Id> {
    fn default() -> Self {
        Self {
            listings: HashMap::new(),
        }
    }
}

impl<Id: Copy + Eq + Hash> PaginationIndex<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing(
        &self,
        listing: &ListingKey,
    ) -> Option<&CategoryPaginationState<Id>> {
        self.listings.get(listing)
    }

    pub fn get_page(&self, listing: &ListingKey, page: u32) -> Option<&[Id]> {
        self.listing(listing).and_then(|state| state.page(page))
    }

    pub fn get_total_pages(&self, listing: &ListingKey) -> Option<u32> {
        self.listing(listing).and_then(|state| state.total_pages())
    }

    pub fn is_fetching(&self, listing: &ListingKey, page: u32) -> bool {
        self.listing(listing)
            .is_some_and(|state| state.is_fetching_page(page))
    }

    pub fn fetch_state(
        &self,
        listing: &ListingKey,
        page: u32,
    ) -> PageFetchState {
        self.listing(listing)
            .map_or(PageFetchState::Unfetched, |state| state.fetch_state(page))
    }

    pub fn last_error(&self, listing: &ListingKey) -> Option<&FetchFailure> {
        self.listing(listing).and_then(|state| state.last_error())
    }

    /// All ids referenced by any page of any listing.
    pub fn referenced_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.listings
            .values()
            .flat_map(|state| state.pages.values())
            .flat_map(|ids| ids.iter().copied())
    }

    pub(crate) fn entry(
        &mut self,
        listing: &ListingKey,
    ) -> &mut CategoryPaginationState<Id> {
        self.listings.entry(listing.clone()).or_default()
    }
}
