use marquee_model::MovieCategory;
use std::{collections::BTreeMap, fmt};

use crate::error::CatalogError;

/// A named listing plus the auxiliary query params that scope it.
///
/// Two keys with the same category but a different region are distinct
/// listings with their own pages and totals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingKey {
    category: String,
    params: BTreeMap<String, String>,
}

impl ListingKey {
    pub fn new(category: impl Into<String>) -> Result<Self, CatalogError> {
        let category = category.into().trim().to_string();
        if category.is_empty() {
            return Err(CatalogError::EmptyCategory);
        }

        Ok(Self {
            category,
            params: BTreeMap::new(),
        })
    }

    pub(crate) fn from_static(category: &'static str) -> Self {
        Self {
            category: category.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Add an auxiliary param. `page` is owned by the pagination layer and
    /// is ignored here.
    pub fn with_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let key = key.into();
        if key != "page" {
            self.params.insert(key, value.into());
        }
        self
    }

    pub fn with_region(self, region: Option<&str>) -> Self {
        match region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(region) => self.with_param("region", region),
            None => self,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl From<MovieCategory> for ListingKey {
    fn from(category: MovieCategory) -> Self {
        Self {
            category: category.as_str().to_string(),
            params: BTreeMap::new(),
        }
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.category)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

/// Dedup key: one fetchable page of one listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FetchKey {
    pub(crate) listing: ListingKey,
    pub(crate) page: u32,
}

impl FetchKey {
    pub(crate) fn new(listing: ListingKey, page: u32) -> Self {
        Self {
            listing,
            page: page.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_category_rejected() {
        assert_eq!(ListingKey::new("   "), Err(CatalogError::EmptyCategory));
    }

    #[test]
    fn params_are_part_of_identity() {
        let us = ListingKey::from(MovieCategory::Popular)
            .with_region(Some("US"));
        let gb = ListingKey::from(MovieCategory::Popular)
            .with_region(Some("GB"));

        assert_ne!(us, gb);
        assert_eq!(us.to_string(), "popular?region=US");
        assert_eq!(
            ListingKey::new("popular").expect("key"),
            ListingKey::from(MovieCategory::Popular).with_region(None)
        );
    }

    #[test]
    fn page_param_is_not_an_auxiliary_param() {
        let key = ListingKey::new("upcoming")
            .expect("key")
            .with_param("page", "3");
        assert_eq!(key.param("page"), None);
    }
}
