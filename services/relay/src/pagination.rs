//! Cursor-based pagination walker
//!
//! Walks a paginated Resource API listing page by page until the upstream
//! signals the end, and returns every item as one flat, ordered list.

use common::{ResourceApi, UpstreamError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Page size used when none is configured
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Failure of a complete pagination walk
#[derive(Error, Debug)]
pub enum PaginationError {
    /// A page request failed; pages fetched before it are discarded
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The upstream kept returning full pages past the safety bound
    #[error("Pagination stopped after {max_pages} pages without reaching the end of the list")]
    LimitExceeded { max_pages: usize },
}

/// One page of a provider listing
#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Option<Vec<T>>,
    /// Continuation cursor, sent back as `start`
    last: Option<String>,
}

/// Walks a paginated listing with a fixed page size
pub struct PaginationWalker<'a> {
    api: &'a dyn ResourceApi,
    limit: usize,
    max_pages: usize,
}

impl<'a> PaginationWalker<'a> {
    /// Create a walker requesting `limit` items per page, for at most `max_pages` pages
    pub fn new(api: &'a dyn ResourceApi, limit: usize, max_pages: usize) -> Self {
        Self {
            api,
            limit: limit.max(1),
            max_pages,
        }
    }

    /// Fetch every item of `path` matching `base_filter`
    ///
    /// The walk ends on an empty page, on a page shorter than the limit, or
    /// on a full page that carries no cursor. Any failed page request
    /// fails the whole walk.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        base_filter: &[(String, String)],
    ) -> Result<Vec<T>, PaginationError> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            if pages == self.max_pages {
                return Err(PaginationError::LimitExceeded {
                    max_pages: self.max_pages,
                });
            }

            let mut query = base_filter.to_vec();
            query.push(("limit".to_string(), self.limit.to_string()));
            if let Some(start) = &cursor {
                query.push(("start".to_string(), start.clone()));
            }

            let body = self.api.get(path, &query).await?;
            let page: Page<T> = serde_json::from_value(body).map_err(UpstreamError::from)?;
            pages += 1;

            let items = match page.data {
                Some(items) if !items.is_empty() => items,
                _ => break,
            };

            let count = items.len();
            results.extend(items);
            debug!(
                "Fetched page {} of {} with {} items ({} total)",
                pages,
                path,
                count,
                results.len()
            );

            if count < self.limit {
                break;
            }

            match page.last {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(results)
    }
}
