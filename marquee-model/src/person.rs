use serde::{Deserialize, Serialize};

use crate::{
    entity::{CatalogEntity, Namespace},
    error::NormalizeError,
    ids::PersonId,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPerson {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonEntity {
    pub id: PersonId,
    pub name: String,
    pub profile_path: Option<String>,
}

impl CatalogEntity for PersonEntity {
    type Id = PersonId;
    type Raw = RawPerson;

    const NAMESPACE: Namespace = Namespace::People;

    fn id(&self) -> PersonId {
        self.id
    }

    fn normalize(raw: RawPerson) -> Result<Self, NormalizeError> {
        let id = raw.id.ok_or(NormalizeError::MissingId {
            namespace: Namespace::People,
        })?;

        Ok(Self {
            id: PersonId(id),
            name: raw.name.unwrap_or_default(),
            profile_path: raw.profile_path,
        })
    }
}
