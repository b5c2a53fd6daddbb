//! Metadata API seam. The catalog only ever talks to a [`MetadataApi`].

pub mod tmdb;

use async_trait::async_trait;
use futures::future::BoxFuture;
use marquee_model::{
    CatalogEntity, ListingPage, MovieEntity, PersonEntity, RawMovie, RawPerson,
    title_from_route,
};
use std::collections::BTreeMap;

use crate::{catalog::ListingKey, error::ProviderError};

pub use tmdb::TmdbMetadataApi;

/// Listing endpoints of the movie metadata service.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// `GET movie/{category}` with the listing's auxiliary params.
    async fn movie_listing(
        &self,
        category: &str,
        page: u32,
        params: &BTreeMap<String, String>,
    ) -> Result<ListingPage<RawMovie>, ProviderError>;

    /// `GET person/popular`.
    async fn popular_people(
        &self,
        page: u32,
    ) -> Result<ListingPage<RawPerson>, ProviderError>;
}

/// Entities whose listings can be fetched through a [`MetadataApi`].
pub trait Fetchable: CatalogEntity {
    /// Heading shown above a page of `listing`.
    fn listing_title(listing: &ListingKey) -> String {
        title_from_route(listing.category())
    }

    fn fetch<'a>(
        api: &'a dyn MetadataApi,
        listing: &'a ListingKey,
        page: u32,
    ) -> BoxFuture<'a, Result<ListingPage<Self::Raw>, ProviderError>>;
}

impl Fetchable for MovieEntity {
    fn fetch<'a>(
        api: &'a dyn MetadataApi,
        listing: &'a ListingKey,
        page: u32,
    ) -> BoxFuture<'a, Result<ListingPage<RawMovie>, ProviderError>> {
        api.movie_listing(listing.category(), page, listing.params())
    }
}

/// People only have the `popular` listing.
pub const PEOPLE_CATEGORY: &str = "popular";

impl Fetchable for PersonEntity {
    fn listing_title(listing: &ListingKey) -> String {
        format!("{} People", title_from_route(listing.category()))
    }

    fn fetch<'a>(
        api: &'a dyn MetadataApi,
        listing: &'a ListingKey,
        page: u32,
    ) -> BoxFuture<'a, Result<ListingPage<RawPerson>, ProviderError>> {
        if listing.category() != PEOPLE_CATEGORY {
            let category = listing.category().to_string();
            return Box::pin(async move {
                Err(ProviderError::UnsupportedListing(category))
            });
        }
        api.popular_people(page)
    }
}
