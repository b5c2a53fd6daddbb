use marquee_model::CatalogEntity;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Normalized entities of one namespace, keyed by id.
///
/// Entities are only ever added or replaced; nothing is evicted.
#[derive(Debug, Clone)]
pub struct EntityStore<E: CatalogEntity> {
    entities: HashMap<E::Id, E>,
}

impl<E: CatalogEntity> Default for EntityStore<E> {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
        }
    }
}

impl<E: CatalogEntity> EntityStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the previous value for the id.
    pub fn upsert(&mut self, entity: E) -> Option<E> {
        self.entities.insert(entity.id(), entity)
    }

    /// Upsert every entity and return their ids in input order. An id seen
    /// twice keeps its first position and its last value.
    pub fn upsert_batch<I>(&mut self, entities: I) -> Vec<E::Id>
    where
        I: IntoIterator<Item = E>,
    {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for entity in entities {
            let id = entity.id();
            if seen.insert(id) {
                ids.push(id);
            }
            self.upsert(entity);
        }
        ids
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.entities.contains_key(id)
    }

    /// Clone the entities behind `ids`, preserving order. Ids without an
    /// entity are skipped.
    pub fn resolve(&self, ids: &[E::Id]) -> Vec<E> {
        ids.iter()
            .filter_map(|id| self.entities.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Outcome of normalizing one page of raw provider records.
#[derive(Debug, Clone)]
pub struct NormalizedPage<E> {
    pub entities: Vec<E>,
    pub skipped: usize,
}

/// Normalize raw records, skipping the ones that cannot be identified.
pub fn normalize_records<E: CatalogEntity>(
    raw: Vec<E::Raw>,
) -> NormalizedPage<E> {
    let mut entities = Vec::with_capacity(raw.len());
    let mut skipped = 0;

    for (position, record) in raw.into_iter().enumerate() {
        match E::normalize(record) {
            Ok(entity) => entities.push(entity),
            Err(err) => {
                skipped += 1;
                warn!(namespace = %E::NAMESPACE, position, "skipping record: {err}");
            }
        }
    }

    NormalizedPage { entities, skipped }
}
