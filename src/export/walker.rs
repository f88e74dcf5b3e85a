//! Sequential page walker for export operations.
//!
//! Drives the backend's pagination protocol as an explicit iterative loop:
//! the first fetch posts the full query, every later fetch follows the
//! server-provided `next` locator verbatim. Pages are fetched strictly
//! sequentially: the next locator is only known once the previous page has
//! arrived, and progress accounting assumes a monotonically increasing
//! offset.

use serde_json::Value;
use tracing::debug;

use crate::api::{SearchBackend, PAGE_SIZE};
use crate::error::Result;
use crate::query::SearchQuery;

/// Iterator-style walker over every page of one query's result set.
pub struct PageWalker<'a> {
    backend: &'a dyn SearchBackend,
    query: SearchQuery,
    locator: Option<String>,
    offset: u64,
    total: u64,
    pages_fetched: u32,
    started: bool,
    exhausted: bool,
}

impl<'a> PageWalker<'a> {
    /// Create a walker for the full result set of a query.
    ///
    /// Any pagination continuation token on the query is stripped: an
    /// export always walks from the first record regardless of the page
    /// the user was looking at.
    pub fn new(backend: &'a dyn SearchBackend, query: &SearchQuery) -> Self {
        Self {
            backend,
            query: query.without_pagination(),
            locator: None,
            offset: 0,
            total: 0,
            pages_fetched: 0,
            started: false,
            exhausted: false,
        }
    }

    /// Fetch the next page of records.
    ///
    /// # Returns
    /// * `Result<Option<Vec<Value>>>` - The page's records, or `None` once
    ///   the last page (null `next` locator) has been consumed
    ///
    /// A fetch error exhausts the walker; the export is abandoned rather
    /// than retried.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        if self.exhausted {
            return Ok(None);
        }

        let locator = if self.started {
            match &self.locator {
                Some(locator) => Some(locator.clone()),
                None => {
                    self.exhausted = true;
                    return Ok(None);
                }
            }
        } else {
            None
        };

        let page = match self.backend.fetch_page(&self.query, locator.as_deref()).await {
            Ok(page) => page,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            }
        };

        self.started = true;
        self.pages_fetched += 1;
        self.offset += PAGE_SIZE;
        self.total = page.count;
        self.locator = page.next.clone();

        debug!(
            page = self.pages_fetched,
            records = page.results.len(),
            total = self.total,
            last = page.is_last(),
            "fetched result page"
        );

        Ok(Some(page.results))
    }

    /// Current offset into the result set (multiple of the page size).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Server-reported total count, stable across one walk.
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SearchPage;
    use crate::error::ApiError;
    use crate::export::progress::ProgressTracker;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Backend serving a fixed sequence of pages, counting fetches.
    struct PagedBackend {
        pages: Vec<SearchPage>,
        fetches: AtomicU32,
        fail_on: Option<u32>,
    }

    impl PagedBackend {
        fn with_pages(per_page: &[usize], count: u64) -> Self {
            let last = per_page.len() - 1;
            let pages = per_page
                .iter()
                .enumerate()
                .map(|(i, n)| SearchPage {
                    results: (0..*n).map(|r| json!({"Record": i * 20 + r})).collect(),
                    count,
                    next: (i < last).then(|| format!("records/search/?limit=20&offset={}", (i + 1) * 20)),
                })
                .collect();
            Self {
                pages,
                fetches: AtomicU32::new(0),
                fail_on: None,
            }
        }
    }

    #[async_trait]
    impl SearchBackend for PagedBackend {
        async fn fetch_page(
            &self,
            _query: &SearchQuery,
            locator: Option<&str>,
        ) -> crate::error::Result<SearchPage> {
            let fetch = self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(fetch + 1) {
                return Err(ApiError::Status {
                    code: 502,
                    message: "Bad Gateway".to_string(),
                }
                .into());
            }
            // the first fetch has no locator, later ones follow `next`
            if fetch == 0 {
                assert!(locator.is_none());
            } else {
                assert!(locator.is_some());
            }
            Ok(self.pages[fetch as usize].clone())
        }
    }

    #[tokio::test]
    async fn test_walk_terminates_on_null_next() {
        let backend = PagedBackend::with_pages(&[20, 20, 10], 50);
        let tracker = ProgressTracker::new(false);
        let mut walker = PageWalker::new(&backend, &SearchQuery::new());

        let mut accumulated = Vec::new();
        while let Some(batch) = walker.next_page().await.unwrap() {
            accumulated.extend(batch);
            tracker.update(walker.offset(), walker.total_count());
        }

        assert_eq!(backend.fetches.load(Ordering::SeqCst), 3);
        assert_eq!(walker.pages_fetched(), 3);
        assert_eq!(accumulated.len(), 50);
        assert_eq!(tracker.current(), 100);

        // exhausted stays exhausted
        assert!(walker.next_page().await.unwrap().is_none());
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_progress_advances_per_page() {
        let backend = PagedBackend::with_pages(&[20, 20, 10], 50);
        let tracker = ProgressTracker::new(false);
        let mut walker = PageWalker::new(&backend, &SearchQuery::new());

        let mut seen = Vec::new();
        while let Some(_batch) = walker.next_page().await.unwrap() {
            tracker.update(walker.offset(), walker.total_count());
            seen.push(tracker.current());
        }
        assert_eq!(seen, vec![40, 80, 100]);
    }

    #[tokio::test]
    async fn test_fetch_error_exhausts_walker() {
        let mut backend = PagedBackend::with_pages(&[20, 20, 10], 50);
        backend.fail_on = Some(2);
        let mut walker = PageWalker::new(&backend, &SearchQuery::new());

        assert!(walker.next_page().await.unwrap().is_some());
        assert!(walker.next_page().await.is_err());
        // no retry: the walker refuses to continue
        assert!(walker.next_page().await.unwrap().is_none());
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_page_result_set() {
        let backend = PagedBackend::with_pages(&[7], 7);
        let mut walker = PageWalker::new(&backend, &SearchQuery::new());

        let batch = walker.next_page().await.unwrap().unwrap();
        assert_eq!(batch.len(), 7);
        assert!(walker.next_page().await.unwrap().is_none());
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 1);
    }
}
