//! Query submission and request supersession.
//!
//! [`QueryStateManager`] owns the single outstanding search request. A new
//! [`submit_query`](QueryStateManager::submit_query) cancels the previous
//! request with the well-known supersession reason before issuing its own;
//! if the superseded request still resolves, its result is discarded rather
//! than treated as an error. All outcomes land in the shared [`AppState`].

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::api::SearchBackend;
use crate::error::{ApiError, ErrorInfo, RegsearchError};
use crate::state::AppState;

use super::cancel::{RequestToken, SUPERSEDED_REASON};
use super::SearchQuery;

/// Manages the current search query and its cancellation handle.
#[derive(Clone)]
pub struct QueryStateManager {
    backend: Arc<dyn SearchBackend>,
    state: Arc<RwLock<AppState>>,

    /// Handle of the one in-flight request, if any. Replaced atomically at
    /// issue time; cleared only by the request that still owns it.
    active: Arc<Mutex<Option<RequestToken>>>,
}

impl QueryStateManager {
    /// Create a new manager over a backend and shared state.
    pub fn new(backend: Arc<dyn SearchBackend>, state: Arc<RwLock<AppState>>) -> Self {
        Self {
            backend,
            state,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Submit a search query.
    ///
    /// Cancels any outstanding request, stores the query, and issues a new
    /// request under a fresh cancellation handle. On success the result
    /// page is stored and, if non-empty, its first record becomes the
    /// selection. A failure that is not the expected cancellation records
    /// error info and clears the loading indicator; a cancellation-caused
    /// failure is swallowed silently.
    pub async fn submit_query(&self, query: SearchQuery) {
        {
            let mut state = self.state.write().await;
            state.begin_search(query.clone());
        }

        let token = RequestToken::new();
        {
            let mut active = self.active.lock().await;
            if let Some(previous) = active.replace(token.clone()) {
                debug!(request = %previous.id(), "superseding in-flight search request");
                previous.cancel(SUPERSEDED_REASON);
            }
        }

        let result = tokio::select! {
            result = self.backend.fetch_page(&query, None) => result,
            _ = token.cancelled() => Err(RegsearchError::Api(ApiError::Cancelled(
                token.reason().unwrap_or(SUPERSEDED_REASON).to_string(),
            ))),
        };

        // A superseded request's resolution, whichever branch produced it,
        // is expected and must not disturb the newer request's state.
        if token.is_cancelled() {
            debug!(request = %token.id(), "search request cancelled, discarding result");
            return;
        }
        self.clear_active(&token).await;

        match result {
            Ok(page) => {
                debug!(count = page.count, "search completed");
                let mut state = self.state.write().await;
                state.finish_search(page);
            }
            Err(err) => {
                warn!("search failed: {err}");
                let mut state = self.state.write().await;
                state.fail_search(ErrorInfo::from_error(&err));
            }
        }
    }

    /// Clear the stored handle, but only if it still belongs to `token`.
    async fn clear_active(&self, token: &RequestToken) {
        let mut active = self.active.lock().await;
        if active.as_ref().map(RequestToken::id) == Some(token.id()) {
            *active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SearchPage;
    use crate::error::Result;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::sync::Notify;

    /// Backend that blocks queries named "slow" until released and answers
    /// everything else immediately with a single-record page.
    struct MockBackend {
        gate: Notify,
        slow_started: AtomicBool,
        fetches: AtomicU32,
        fail: bool,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                gate: Notify::new(),
                slow_started: AtomicBool::new(false),
                fetches: AtomicU32::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self { fail: true, ..Self::new() }
        }

        fn page_for(name: &Value) -> SearchPage {
            SearchPage {
                results: vec![json!({"Name": name})],
                count: 1,
                next: None,
            }
        }
    }

    #[async_trait]
    impl SearchBackend for MockBackend {
        async fn fetch_page(
            &self,
            query: &SearchQuery,
            _locator: Option<&str>,
        ) -> Result<SearchPage> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::Status {
                    code: 500,
                    message: "Internal Server Error".to_string(),
                }
                .into());
            }
            let name = query.payload()["Name"].clone();
            if name == json!("slow") {
                self.slow_started.store(true, Ordering::SeqCst);
                self.gate.notified().await;
            }
            Ok(Self::page_for(&name))
        }
    }

    fn manager(backend: Arc<MockBackend>) -> (QueryStateManager, Arc<RwLock<AppState>>) {
        let state = Arc::new(RwLock::new(AppState::new()));
        (QueryStateManager::new(backend, state.clone()), state)
    }

    fn named(name: &str) -> SearchQuery {
        SearchQuery::new().with_criterion("Name", json!(name)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_search_selects_first_record() {
        let backend = Arc::new(MockBackend::new());
        let (manager, state) = manager(backend);

        manager.submit_query(named("fast")).await;

        let state = state.read().await;
        assert!(!state.is_loading());
        assert!(state.error().is_none());
        assert_eq!(state.selected(), Some(&json!({"Name": "fast"})));
    }

    #[tokio::test]
    async fn test_failed_search_records_error_info() {
        let backend = Arc::new(MockBackend::failing());
        let (manager, state) = manager(backend);

        manager.submit_query(named("any")).await;

        let state = state.read().await;
        assert!(!state.is_loading());
        let info = state.error().expect("error info recorded");
        assert_eq!(info.status, Some(500));
    }

    #[tokio::test]
    async fn test_supersession_discards_older_request() {
        let backend = Arc::new(MockBackend::new());
        let (manager, state) = manager(backend.clone());

        let first = manager.clone();
        let handle = tokio::spawn(async move { first.submit_query(named("slow")).await });

        // let the first request register its handle and block in the backend
        while !backend.slow_started.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        manager.submit_query(named("second")).await;

        // the superseded task resolves through its cancellation branch
        backend.gate.notify_waiters();
        handle.await.unwrap();

        let state = state.read().await;
        assert_eq!(state.selected(), Some(&json!({"Name": "second"})));
        assert_eq!(
            state.results().unwrap().results,
            vec![json!({"Name": "second"})]
        );
        // cancellation of the older request is expected, not an error
        assert!(state.error().is_none());
        assert!(!state.is_loading());
    }
}
