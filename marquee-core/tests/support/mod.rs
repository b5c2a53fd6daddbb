//! Scripted in-memory metadata API shared by the integration suites.
#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use marquee_core::{
    Catalog, FetchPolicy, ListingKey, MetadataApi, ProviderError,
    ViewStyleState,
};
use marquee_model::{ListingPage, RawMovie, RawPerson};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Semaphore;

pub const PER_PAGE: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub page: u32,
    pub params: BTreeMap<String, String>,
}

/// Serves deterministic pages. Movie ids depend only on the page number, so
/// the same ids show up in every category.
#[derive(Debug)]
pub struct ScriptedApi {
    total_pages: u32,
    gate: Option<Semaphore>,
    failures: Mutex<HashMap<u32, VecDeque<ProviderError>>>,
    missing_id_pages: Mutex<Vec<u32>>,
    undecodable_pages: Mutex<Vec<u32>>,
    calls: AtomicUsize,
    log: Mutex<Vec<RecordedCall>>,
}

impl ScriptedApi {
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            gate: None,
            failures: Mutex::new(HashMap::new()),
            missing_id_pages: Mutex::new(Vec::new()),
            undecodable_pages: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Every call blocks until [`open`](Self::open) hands out a permit.
    pub fn gated(total_pages: u32) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(total_pages)
        }
    }

    pub fn open(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn fail_next(&self, page: u32, error: ProviderError) {
        self.failures.lock().entry(page).or_default().push_back(error);
    }

    pub fn include_record_without_id(&self, page: u32) {
        self.missing_id_pages.lock().push(page);
    }

    /// Serve `page` as a JSON body whose second record has a string id.
    pub fn include_undecodable_record(&self, page: u32) {
        self.undecodable_pages.lock().push(page);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Vec<RecordedCall> {
        self.log.lock().clone()
    }

    pub fn movie_id(page: u32, position: u64) -> u64 {
        u64::from(page) * 100 + position
    }

    async fn serve(
        &self,
        endpoint: String,
        page: u32,
        params: &BTreeMap<String, String>,
    ) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(RecordedCall {
            endpoint,
            page,
            params: params.clone(),
        });

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| ProviderError::ApiError("gate closed".into()))?
                .forget();
        }

        let failure = self
            .failures
            .lock()
            .get_mut(&page)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MetadataApi for ScriptedApi {
    async fn movie_listing(
        &self,
        category: &str,
        page: u32,
        params: &BTreeMap<String, String>,
    ) -> Result<ListingPage<RawMovie>, ProviderError> {
        self.serve(format!("movie/{category}"), page, params).await?;

        if self.undecodable_pages.lock().contains(&page) {
            let mut records: Vec<serde_json::Value> = (0..PER_PAGE)
                .map(|position| {
                    json!({
                        "id": Self::movie_id(page, position),
                        "title": format!("{category} {page}/{position}"),
                    })
                })
                .collect();
            records.insert(1, json!({"id": "tt-2", "title": "string id"}));
            let body = json!({
                "page": page,
                "total_pages": self.total_pages,
                "results": records,
            });
            return serde_json::from_value(body)
                .map_err(|err| ProviderError::ParseError(err.to_string()));
        }

        let mut results: Vec<RawMovie> = (0..PER_PAGE)
            .map(|position| RawMovie {
                id: Some(Self::movie_id(page, position)),
                title: Some(format!("{category} {page}/{position}")),
                vote_average: Some(7.5),
                vote_count: Some(10),
                poster_path: Some(format!("/p{page}{position}.jpg")),
                ..RawMovie::default()
            })
            .collect();
        if self.missing_id_pages.lock().contains(&page) {
            results.insert(
                1,
                RawMovie {
                    title: Some("no id".into()),
                    ..RawMovie::default()
                },
            );
        }

        Ok(ListingPage::new(page, self.total_pages, results))
    }

    async fn popular_people(
        &self,
        page: u32,
    ) -> Result<ListingPage<RawPerson>, ProviderError> {
        self.serve("person/popular".into(), page, &BTreeMap::new())
            .await?;

        let results = (0..PER_PAGE)
            .map(|position| RawPerson {
                id: Some(u64::from(page) * 1000 + position),
                name: Some(format!("Person {page}/{position}")),
                profile_path: None,
            })
            .collect();

        Ok(ListingPage::new(page, self.total_pages, results))
    }
}

pub fn catalog(api: &Arc<ScriptedApi>, policy: FetchPolicy) -> Catalog {
    let api: Arc<dyn MetadataApi> = api.clone();
    Catalog::new(api, policy).with_view_style(ViewStyleState::default())
}

pub fn listing(category: &str) -> ListingKey {
    ListingKey::new(category).expect("non-empty category")
}
