use serde::de::DeserializeOwned;
use std::{fmt, hash::Hash};

use crate::error::NormalizeError;

/// Separate id space for each entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Movies,
    People,
}

impl Namespace {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Namespace::Movies => "movies",
            Namespace::People => "people",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized record the catalog can store, keyed by a stable id within
/// its [`Namespace`].
pub trait CatalogEntity: Clone + fmt::Debug + Send + Sync + 'static {
    type Id: Copy
        + Eq
        + Hash
        + Ord
        + fmt::Debug
        + fmt::Display
        + Send
        + Sync
        + 'static;

    /// Raw API record this entity is normalized from.
    type Raw: DeserializeOwned + fmt::Debug + Send + 'static;

    const NAMESPACE: Namespace;

    fn id(&self) -> Self::Id;

    /// Map a raw record's natural key into the id field and keep the declared
    /// fields. Fails only when the record carries no id.
    fn normalize(raw: Self::Raw) -> Result<Self, NormalizeError>;
}
