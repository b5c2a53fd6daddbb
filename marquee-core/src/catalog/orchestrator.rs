use marquee_config::{CatalogConfig, StaleResponseMode};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::sync::watch;
use tracing::{Instrument, debug, instrument, warn};

use super::{
    entity_store::normalize_records,
    listing::{FetchKey, ListingKey},
    state::{CatalogState, CommitOutcome, CommitSummary},
};
use crate::{
    error::{FetchFailure, ProviderError},
    providers::{Fetchable, MetadataApi},
};

/// How many times a failed listing request is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before attempt `n + 1` is `backoff * n`.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const NONE: RetryPolicy = RetryPolicy {
        max_attempts: 1,
        backoff: Duration::ZERO,
    };

    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

/// What to do with a response whose fetch was superseded by a newer fetch
/// in the same listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleResponsePolicy {
    /// Last completed fetch wins.
    #[default]
    Commit,
    Discard,
}

impl From<StaleResponseMode> for StaleResponsePolicy {
    fn from(mode: StaleResponseMode) -> Self {
        match mode {
            StaleResponseMode::Commit => StaleResponsePolicy::Commit,
            StaleResponseMode::Discard => StaleResponsePolicy::Discard,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchPolicy {
    pub retry: RetryPolicy,
    pub stale_responses: StaleResponsePolicy,
}

impl From<&CatalogConfig> for FetchPolicy {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            retry: RetryPolicy {
                max_attempts: config.fetch.max_attempts.max(1),
                backoff: config.fetch.backoff,
            },
            stale_responses: config.stale_responses.into(),
        }
    }
}

/// Result of [`FetchOrchestrator::ensure_loaded`]. Failures are also
/// recorded in state; this is informational.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Page was already committed.
    Cached,
    /// Page lies past the listing's known total; nothing to fetch.
    BeyondLastPage,
    /// This call fetched and committed the page.
    Fetched(CommitSummary),
    /// Another call was already fetching the page; this one waited for it.
    Attached { loaded: bool },
    Failed(FetchFailure),
    /// Response was superseded and not committed.
    Discarded,
}

impl LoadOutcome {
    /// Whether the page can be read from state now.
    pub fn is_loaded(&self) -> bool {
        match self {
            LoadOutcome::Cached
            | LoadOutcome::BeyondLastPage
            | LoadOutcome::Fetched(_) => true,
            LoadOutcome::Attached { loaded } => *loaded,
            LoadOutcome::Failed(_) | LoadOutcome::Discarded => false,
        }
    }
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub leaders: u64,
    pub waiters: u64,
    pub requests: u64,
}

/// Settle signal for one in-flight key. `None` until the fetch settles.
type Settled = watch::Sender<Option<LoadOutcome>>;
type InFlight = Arc<Mutex<HashMap<FetchKey, Settled>>>;

enum Claim<E: Fetchable> {
    Resolved(LoadOutcome),
    Lead(FetchTask<E>, watch::Receiver<Option<LoadOutcome>>),
    Wait(watch::Receiver<Option<LoadOutcome>>),
}

struct FetchError {
    source: ProviderError,
    attempts: u32,
}

/// Loads listing pages into a [`CatalogState`], merging concurrent requests
/// for the same page into one provider call.
///
/// The provider call runs on its own task, so it commits (or records its
/// failure) even when every caller waiting on it has gone away.
pub struct FetchOrchestrator<E: Fetchable> {
    state: Arc<CatalogState<E>>,
    api: Arc<dyn MetadataApi>,
    policy: FetchPolicy,
    in_flight: InFlight,
    sf_leaders: AtomicU64,
    sf_waiters: AtomicU64,
    requests: Arc<AtomicU64>,
}

impl<E: Fetchable> fmt::Debug for FetchOrchestrator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOrchestrator")
            .field("namespace", &E::NAMESPACE)
            .field("policy", &self.policy)
            .field("in_flight", &self.in_flight.lock().len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<E: Fetchable> FetchOrchestrator<E> {
    pub fn new(
        state: Arc<CatalogState<E>>,
        api: Arc<dyn MetadataApi>,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            state,
            api,
            policy,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            sf_leaders: AtomicU64::new(0),
            sf_waiters: AtomicU64::new(0),
            requests: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> &Arc<CatalogState<E>> {
        &self.state
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    pub fn stats(&self) -> FetchStats {
        FetchStats {
            leaders: self.sf_leaders.load(Ordering::Relaxed),
            waiters: self.sf_waiters.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
        }
    }

    /// Make `page` of `listing` readable from state, fetching it at most
    /// once no matter how many callers ask concurrently. Page `0` is
    /// treated as page `1`.
    ///
    /// Must be called within a Tokio runtime. Dropping the returned future
    /// does not cancel a fetch it started.
    #[instrument(skip(self, listing), fields(namespace = %E::NAMESPACE, listing = %listing))]
    pub async fn ensure_loaded(
        &self,
        listing: &ListingKey,
        page: u32,
    ) -> LoadOutcome {
        let key = FetchKey::new(listing.clone(), page);

        match self.claim(&key) {
            Claim::Resolved(outcome) => outcome,
            Claim::Wait(settled) => {
                wait_settled(settled).await;
                self.attached(&key)
            }
            Claim::Lead(task, settled) => {
                tokio::spawn(task.run().in_current_span());
                match wait_settled(settled).await {
                    Some(outcome) => outcome,
                    // Fetch task torn down before settling.
                    None => self.attached(&key),
                }
            }
        }
    }

    fn claim(&self, key: &FetchKey) -> Claim<E> {
        let mut in_flight = self.in_flight.lock();

        if let Some(settled) = in_flight.get(key) {
            let waiters = self.sf_waiters.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(page = key.page, waiters, "attaching to in-flight fetch");
            return Claim::Wait(settled.subscribe());
        }

        let resolved = self.state.with_read(|_, index| {
            index.listing(&key.listing).and_then(|state| {
                if state.has_page(key.page) {
                    Some(LoadOutcome::Cached)
                } else if state.is_beyond_last(key.page) {
                    Some(LoadOutcome::BeyondLastPage)
                } else {
                    None
                }
            })
        });
        if let Some(outcome) = resolved {
            return Claim::Resolved(outcome);
        }

        let (settled, receiver) = watch::channel(None);
        in_flight.insert(key.clone(), settled);
        let generation = self.state.begin_fetch(&key.listing, key.page);
        let leaders = self.sf_leaders.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(page = key.page, generation, leaders, "leading fetch");

        let task = FetchTask {
            api: Arc::clone(&self.api),
            policy: self.policy,
            requests: Arc::clone(&self.requests),
            generation,
            guard: InFlightGuard {
                state: Arc::clone(&self.state),
                in_flight: Arc::clone(&self.in_flight),
                key: key.clone(),
                settled: false,
            },
        };
        Claim::Lead(task, receiver)
    }

    fn attached(&self, key: &FetchKey) -> LoadOutcome {
        let loaded = self
            .state
            .with_read(|_, index| index.get_page(&key.listing, key.page).is_some());
        LoadOutcome::Attached { loaded }
    }
}

/// `None` when the sender went away without settling.
async fn wait_settled(
    mut settled: watch::Receiver<Option<LoadOutcome>>,
) -> Option<LoadOutcome> {
    match settled.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone(),
        Err(_) => None,
    }
}

/// One provider fetch, detached from the callers waiting on it.
struct FetchTask<E: Fetchable> {
    api: Arc<dyn MetadataApi>,
    policy: FetchPolicy,
    requests: Arc<AtomicU64>,
    generation: u64,
    guard: InFlightGuard<E>,
}

impl<E: Fetchable> FetchTask<E> {
    async fn run(self) {
        let outcome = self.fetch_and_commit().await;
        self.guard.settle(outcome);
    }

    async fn fetch_and_commit(&self) -> LoadOutcome {
        let key = &self.guard.key;
        let state = &self.guard.state;

        match self.fetch_with_retry(key).await {
            Ok(page) => {
                if page.page != key.page {
                    debug!(
                        requested = key.page,
                        returned = page.page,
                        "provider returned a different page number"
                    );
                }
                if page.rejected > 0 {
                    warn!(
                        namespace = %E::NAMESPACE,
                        page = key.page,
                        rejected = page.rejected,
                        "skipping records that failed to decode"
                    );
                }
                let mut normalized = normalize_records::<E>(page.results);
                normalized.skipped += page.rejected;
                let discard_stale = self.policy.stale_responses
                    == StaleResponsePolicy::Discard;
                match state.commit_page(
                    &key.listing,
                    key.page,
                    self.generation,
                    normalized,
                    page.total_pages,
                    discard_stale,
                ) {
                    CommitOutcome::Committed(summary) => {
                        LoadOutcome::Fetched(summary)
                    }
                    CommitOutcome::Discarded => LoadOutcome::Discarded,
                }
            }
            Err(FetchError { source, attempts }) => {
                let failure = FetchFailure::new(key.page, attempts, &source);
                warn!(page = key.page, attempts, "listing fetch failed: {source}");
                state.record_failure(&key.listing, failure.clone());
                LoadOutcome::Failed(failure)
            }
        }
    }

    async fn fetch_with_retry(
        &self,
        key: &FetchKey,
    ) -> Result<marquee_model::ListingPage<E::Raw>, FetchError> {
        let retry = self.policy.retry;
        let max_attempts = retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            self.requests.fetch_add(1, Ordering::Relaxed);
            match E::fetch(self.api.as_ref(), &key.listing, key.page).await {
                Ok(page) => return Ok(page),
                Err(err) if attempt < max_attempts && err.is_retryable() => {
                    let delay = retry.delay_after(attempt);
                    warn!(
                        page = key.page,
                        attempt,
                        max_attempts,
                        ?delay,
                        "listing fetch attempt failed, retrying: {err}"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(source) => {
                    return Err(FetchError {
                        source,
                        attempts: attempt,
                    });
                }
            }
        }
    }
}

/// Owns a key's in-flight entry. Settling removes the entry and wakes every
/// caller; dropping the task unsettled (runtime shutdown, panic) returns the
/// page to unfetched instead.
struct InFlightGuard<E: Fetchable> {
    state: Arc<CatalogState<E>>,
    in_flight: InFlight,
    key: FetchKey,
    settled: bool,
}

impl<E: Fetchable> InFlightGuard<E> {
    fn release(&self) -> Option<Settled> {
        self.in_flight.lock().remove(&self.key)
    }

    fn settle(mut self, outcome: LoadOutcome) {
        self.settled = true;
        if let Some(settled) = self.release() {
            settled.send_replace(Some(outcome));
        }
    }
}

impl<E: Fetchable> Drop for InFlightGuard<E> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(
            namespace = %E::NAMESPACE,
            listing = %self.key.listing,
            page = self.key.page,
            "fetch abandoned before settling"
        );
        self.state.abandon(&self.key.listing, self.key.page);
        // Dropping the sender wakes attached callers.
        self.release();
    }
}
