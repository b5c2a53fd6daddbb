use marquee_model::CatalogEntity;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use super::{
    entity_store::{EntityStore, NormalizedPage},
    events::CatalogEvent,
    listing::ListingKey,
    pagination::{PageFetchState, PaginationIndex},
};
use crate::error::FetchFailure;

/// What a successful commit wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    pub ids: usize,
    pub skipped: usize,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommitOutcome {
    Committed(CommitSummary),
    Discarded,
}

/// Everything a view needs for one page, read under a single lock.
#[derive(Debug, Clone)]
pub struct PageSnapshot<E: CatalogEntity> {
    pub entities: Option<Vec<E>>,
    pub total_pages: Option<u32>,
    pub is_fetching: bool,
    pub last_error: Option<FetchFailure>,
}

#[derive(Debug)]
struct Shelf<E: CatalogEntity> {
    store: EntityStore<E>,
    index: PaginationIndex<E::Id>,
}

/// Entity store and pagination index of one namespace behind one lock.
///
/// Readers never observe a page whose ids are missing from the store, and
/// never observe a total without the page that reported it.
#[derive(Debug)]
pub struct CatalogState<E: CatalogEntity> {
    inner: RwLock<Shelf<E>>,
    events: broadcast::Sender<CatalogEvent>,
}

impl<E: CatalogEntity> CatalogState<E> {
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            inner: RwLock::new(Shelf {
                store: EntityStore::new(),
                index: PaginationIndex::new(),
            }),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub fn get_by_id(&self, id: &E::Id) -> Option<E> {
        self.inner.read().store.get(id).cloned()
    }

    pub fn get_page(&self, listing: &ListingKey, page: u32) -> Option<Vec<E::Id>> {
        self.inner
            .read()
            .index
            .get_page(listing, page)
            .map(<[E::Id]>::to_vec)
    }

    pub fn get_total_pages(&self, listing: &ListingKey) -> Option<u32> {
        self.inner.read().index.get_total_pages(listing)
    }

    pub fn is_fetching(&self, listing: &ListingKey, page: u32) -> bool {
        self.inner.read().index.is_fetching(listing, page)
    }

    pub fn fetch_state(&self, listing: &ListingKey, page: u32) -> PageFetchState {
        self.inner.read().index.fetch_state(listing, page)
    }

    pub fn last_error(&self, listing: &ListingKey) -> Option<FetchFailure> {
        self.inner.read().index.last_error(listing).cloned()
    }

    /// Resolve a page straight to entities.
    pub fn page_entities(&self, listing: &ListingKey, page: u32) -> Option<Vec<E>> {
        let shelf = self.inner.read();
        shelf
            .index
            .get_page(listing, page)
            .map(|ids| shelf.store.resolve(ids))
    }

    pub fn snapshot(&self, listing: &ListingKey, page: u32) -> PageSnapshot<E> {
        let shelf = self.inner.read();
        PageSnapshot {
            entities: shelf
                .index
                .get_page(listing, page)
                .map(|ids| shelf.store.resolve(ids)),
            total_pages: shelf.index.get_total_pages(listing),
            is_fetching: shelf.index.is_fetching(listing, page),
            last_error: shelf.index.last_error(listing).cloned(),
        }
    }

    pub fn entity_count(&self) -> usize {
        self.inner.read().store.len()
    }

    /// Run `f` against the store and index under one read lock.
    pub fn with_read<R>(
        &self,
        f: impl FnOnce(&EntityStore<E>, &PaginationIndex<E::Id>) -> R,
    ) -> R {
        let shelf = self.inner.read();
        f(&shelf.store, &shelf.index)
    }

    pub(crate) fn begin_fetch(&self, listing: &ListingKey, page: u32) -> u64 {
        let generation = self.inner.write().index.entry(listing).begin_fetch(page);
        trace!(namespace = %E::NAMESPACE, %listing, page, generation, "fetch started");
        self.emit(CatalogEvent::FetchStarted {
            namespace: E::NAMESPACE,
            listing: listing.clone(),
            page,
        });
        generation
    }

    /// Write a fetched page: entities first, then its ids and total.
    pub(crate) fn commit_page(
        &self,
        listing: &ListingKey,
        page: u32,
        generation: u64,
        normalized: NormalizedPage<E>,
        total_pages: u32,
        discard_stale: bool,
    ) -> CommitOutcome {
        let outcome = {
            let mut shelf = self.inner.write();
            let Shelf { store, index } = &mut *shelf;
            let state = index.entry(listing);

            if discard_stale && state.generation() > generation {
                state.abandon(page);
                CommitOutcome::Discarded
            } else {
                let ids = store.upsert_batch(normalized.entities);
                let summary = CommitSummary {
                    ids: ids.len(),
                    skipped: normalized.skipped,
                    total_pages,
                };
                state.record_page(page, ids, total_pages);
                CommitOutcome::Committed(summary)
            }
        };

        match outcome {
            CommitOutcome::Committed(summary) => {
                debug!(
                    namespace = %E::NAMESPACE,
                    %listing,
                    page,
                    ids = summary.ids,
                    skipped = summary.skipped,
                    total_pages,
                    "page committed"
                );
                self.emit(CatalogEvent::PageCommitted {
                    namespace: E::NAMESPACE,
                    listing: listing.clone(),
                    page,
                    ids: summary.ids,
                    skipped: summary.skipped,
                    total_pages,
                });
            }
            CommitOutcome::Discarded => {
                debug!(namespace = %E::NAMESPACE, %listing, page, "stale response discarded");
                self.emit(CatalogEvent::CommitDiscarded {
                    namespace: E::NAMESPACE,
                    listing: listing.clone(),
                    page,
                });
            }
        }

        outcome
    }

    pub(crate) fn record_failure(&self, listing: &ListingKey, failure: FetchFailure) {
        let page = failure.page;
        self.inner
            .write()
            .index
            .entry(listing)
            .record_failure(failure.clone());
        self.emit(CatalogEvent::FetchFailed {
            namespace: E::NAMESPACE,
            listing: listing.clone(),
            page,
            failure,
        });
    }

    pub(crate) fn abandon(&self, listing: &ListingKey, page: u32) {
        self.inner.write().index.entry(listing).abandon(page);
        self.emit(CatalogEvent::FetchAbandoned {
            namespace: E::NAMESPACE,
            listing: listing.clone(),
            page,
        });
    }

    fn emit(&self, event: CatalogEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entity_store::normalize_records;
    use marquee_model::{MovieEntity, MovieId, RawMovie};

    fn raw_page(ids: &[u64]) -> NormalizedPage<MovieEntity> {
        normalize_records::<MovieEntity>(
            ids.iter()
                .map(|id| RawMovie {
                    id: Some(*id),
                    title: Some(format!("movie {id}")),
                    ..RawMovie::default()
                })
                .collect(),
        )
    }

    fn popular() -> ListingKey {
        ListingKey::new("popular").expect("key")
    }

    #[test]
    fn committed_page_resolves_every_id() {
        let state = CatalogState::<MovieEntity>::new(8);
        let generation = state.begin_fetch(&popular(), 1);
        let outcome =
            state.commit_page(&popular(), 1, generation, raw_page(&[1, 2, 3]), 5, false);

        assert_eq!(
            outcome,
            CommitOutcome::Committed(CommitSummary {
                ids: 3,
                skipped: 0,
                total_pages: 5
            })
        );
        let ids = state.get_page(&popular(), 1).expect("page");
        assert!(ids.iter().all(|id| state.get_by_id(id).is_some()));
        assert_eq!(state.get_total_pages(&popular()), Some(5));
        assert!(!state.is_fetching(&popular(), 1));
    }

    #[test]
    fn superseded_commit_is_discarded_when_requested() {
        let state = CatalogState::<MovieEntity>::new(8);
        let first = state.begin_fetch(&popular(), 1);
        let second = state.begin_fetch(&popular(), 2);

        let stale =
            state.commit_page(&popular(), 1, first, raw_page(&[1]), 3, true);
        assert_eq!(stale, CommitOutcome::Discarded);
        assert_eq!(state.get_page(&popular(), 1), None);
        assert_eq!(state.get_by_id(&MovieId(1)), None);
        assert_eq!(state.fetch_state(&popular(), 1), PageFetchState::Unfetched);

        let fresh =
            state.commit_page(&popular(), 2, second, raw_page(&[2]), 3, true);
        assert!(matches!(fresh, CommitOutcome::Committed(_)));
    }

    #[test]
    fn events_follow_state_changes() {
        let state = CatalogState::<MovieEntity>::new(8);
        let mut events = state.subscribe();

        let generation = state.begin_fetch(&popular(), 1);
        state.commit_page(&popular(), 1, generation, raw_page(&[9]), 1, false);

        assert!(matches!(
            events.try_recv(),
            Ok(CatalogEvent::FetchStarted { page: 1, .. })
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(CatalogEvent::PageCommitted { ids: 1, total_pages: 1, .. })
        ));
    }
}
