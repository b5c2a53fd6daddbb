//! The `page` parameter of a location query string.
//!
//! Only `page` is interpreted; every other pair passes through untouched and
//! in order.

use url::form_urlencoded;

use crate::error::CatalogError;

const PAGE_KEY: &str = "page";

/// Parse the `page` parameter, rejecting values that are not a whole number
/// of at least 1. An absent parameter is page 1.
pub fn try_read_page(query: &str) -> Result<u32, CatalogError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let Some(raw) = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == PAGE_KEY)
        .map(|(_, value)| value.into_owned())
    else {
        return Ok(1);
    };

    match raw.trim().parse::<u32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(CatalogError::InvalidPageInput(raw)),
    }
}

/// Current page from a query string. Never fails: missing or malformed
/// values yield page 1.
pub fn read_page(query: &str) -> u32 {
    try_read_page(query).unwrap_or(1)
}

/// Set `page` in `query`, in place if present and appended otherwise.
/// A leading `?` is kept if the input had one.
pub fn write_page(query: &str, page: u32) -> String {
    let (prefix, body) = match query.strip_prefix('?') {
        Some(body) => ("?", body),
        None => ("", query),
    };
    let page_pair = format!("{PAGE_KEY}={page}");

    let mut replaced = false;
    let mut pairs: Vec<&str> = Vec::new();
    for segment in body.split('&').filter(|segment| !segment.is_empty()) {
        let key = segment.split_once('=').map_or(segment, |(key, _)| key);
        if key != PAGE_KEY {
            pairs.push(segment);
        } else if !replaced {
            pairs.push(&page_pair);
            replaced = true;
        }
    }
    if !replaced {
        pairs.push(&page_pair);
    }

    format!("{prefix}{}", pairs.join("&"))
}
