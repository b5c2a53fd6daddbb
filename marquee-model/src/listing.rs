use serde::{Deserialize, de::DeserializeOwned};

/// Paginated envelope shared by every listing endpoint.
///
/// Records are decoded one at a time. A record that does not decode is left
/// out of `results` and counted in `rejected`; the rest of the page stands.
#[derive(Debug, Clone, Deserialize)]
#[serde(
    from = "WireListingPage",
    bound(deserialize = "T: DeserializeOwned")
)]
pub struct ListingPage<T> {
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<T>,
    pub total_results: u32,
    pub rejected: usize,
}

impl<T> ListingPage<T> {
    pub fn new(page: u32, total_pages: u32, results: Vec<T>) -> Self {
        let total_results = u32::try_from(results.len()).unwrap_or(u32::MAX);
        Self {
            page,
            total_pages,
            results,
            total_results,
            rejected: 0,
        }
    }
}

#[derive(Deserialize)]
struct WireListingPage {
    page: u32,
    total_pages: u32,
    results: Vec<serde_json::Value>,
    #[serde(default)]
    total_results: u32,
}

impl<T: DeserializeOwned> From<WireListingPage> for ListingPage<T> {
    fn from(wire: WireListingPage) -> Self {
        let mut results = Vec::with_capacity(wire.results.len());
        let mut rejected = 0;
        for record in wire.results {
            match serde_json::from_value(record) {
                Ok(record) => results.push(record),
                Err(_) => rejected += 1,
            }
        }

        Self {
            page: wire.page,
            total_pages: wire.total_pages,
            results,
            total_results: wire.total_results,
            rejected,
        }
    }
}
