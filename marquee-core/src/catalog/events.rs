use marquee_model::Namespace;

use super::listing::ListingKey;
use crate::error::FetchFailure;

/// Lifecycle notifications published by a namespace's catalog state.
///
/// Events are sent after the corresponding state change is visible to
/// readers. Slow subscribers may observe `RecvError::Lagged`.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    FetchStarted {
        namespace: Namespace,
        listing: ListingKey,
        page: u32,
    },
    PageCommitted {
        namespace: Namespace,
        listing: ListingKey,
        page: u32,
        ids: usize,
        skipped: usize,
        total_pages: u32,
    },
    FetchFailed {
        namespace: Namespace,
        listing: ListingKey,
        page: u32,
        failure: FetchFailure,
    },
    /// A response arrived after a newer fetch began in the same listing and
    /// was dropped.
    CommitDiscarded {
        namespace: Namespace,
        listing: ListingKey,
        page: u32,
    },
    /// The fetching task went away before settling.
    FetchAbandoned {
        namespace: Namespace,
        listing: ListingKey,
        page: u32,
    },
}

impl CatalogEvent {
    pub fn namespace(&self) -> Namespace {
        match self {
            CatalogEvent::FetchStarted { namespace, .. }
            | CatalogEvent::PageCommitted { namespace, .. }
            | CatalogEvent::FetchFailed { namespace, .. }
            | CatalogEvent::CommitDiscarded { namespace, .. }
            | CatalogEvent::FetchAbandoned { namespace, .. } => *namespace,
        }
    }

    pub fn listing(&self) -> &ListingKey {
        match self {
            CatalogEvent::FetchStarted { listing, .. }
            | CatalogEvent::PageCommitted { listing, .. }
            | CatalogEvent::FetchFailed { listing, .. }
            | CatalogEvent::CommitDiscarded { listing, .. }
            | CatalogEvent::FetchAbandoned { listing, .. } => listing,
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            CatalogEvent::FetchStarted { page, .. }
            | CatalogEvent::PageCommitted { page, .. }
            | CatalogEvent::FetchFailed { page, .. }
            | CatalogEvent::CommitDiscarded { page, .. }
            | CatalogEvent::FetchAbandoned { page, .. } => *page,
        }
    }
}
