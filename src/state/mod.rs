//! Application state.
//!
//! [`AppState`] is the explicit, owned replacement for the reference
//! system's process-wide store: the current result page, the stored query,
//! the active selection, the error info consumed by the presentation layer,
//! and the export job guard. All mutation goes through typed update methods
//! so every transition point is visible in one place.
//!
//! There is no parallelism in this crate's pipeline, but the downloading
//! flag and the job state are still updated atomically at issue time and
//! cleared exactly once when a job ends. Callers hold the state lock
//! across each transition.

use std::fmt;

use serde_json::Value;

use crate::api::SearchPage;
use crate::error::ErrorInfo;
use crate::query::SearchQuery;

/// Lifecycle of one export job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportJobState {
    /// No export has run, or the last one's outcome was already observed.
    #[default]
    Idle,

    /// Fetching the given result page (1-based).
    Fetching { page: u32 },

    /// Folding a fetched page into the accumulator.
    Aggregating,

    /// Serializing the accumulated records to the output format.
    Writing,

    /// Terminal: the export produced a file.
    Complete,

    /// Terminal: the export was cancelled between page fetches.
    Cancelled,

    /// Terminal: a page fetch or the encoding step failed.
    Failed,
}

/// Why an export was refused at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRefusal {
    /// Another export job is still running.
    AlreadyRunning,

    /// No record is selected, i.e. no search has completed yet.
    NothingSelected,
}

impl fmt::Display for ExportRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportRefusal::AlreadyRunning => write!(f, "an export is already running"),
            ExportRefusal::NothingSelected => write!(f, "no search results to export"),
        }
    }
}

/// Process-wide search and export state.
#[derive(Debug, Default)]
pub struct AppState {
    results: Option<SearchPage>,
    searched_query: Option<SearchQuery>,
    selected: Option<Value>,
    loading: bool,
    error: Option<ErrorInfo>,
    downloading: bool,
    export_job: ExportJobState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /* ===================== search transitions ===================== */

    /// A new search was submitted: clear the previous page and error,
    /// raise the loading flag, and remember the query for later export.
    pub fn begin_search(&mut self, query: SearchQuery) {
        self.loading = true;
        self.results = None;
        self.error = None;
        self.searched_query = Some(query);
    }

    /// The search completed. A non-empty result set moves the selection to
    /// its first record; an empty one leaves the previous selection alone.
    pub fn finish_search(&mut self, page: SearchPage) {
        self.loading = false;
        if let Some(first) = page.results.first() {
            self.selected = Some(first.clone());
        }
        self.results = Some(page);
    }

    /// The search failed for a reason other than cancellation.
    pub fn fail_search(&mut self, info: ErrorInfo) {
        self.loading = false;
        self.error = Some(info);
    }

    /// Move the selection to a specific record.
    pub fn select_record(&mut self, record: Value) {
        self.selected = Some(record);
    }

    /// Clear the surfaced error info.
    pub fn reset_error(&mut self) {
        self.error = None;
    }

    /* ===================== export transitions ===================== */

    /// Try to start an export job.
    ///
    /// Refuses when one is already running or when no search has completed
    /// yet (no selection, or no stored query). On success the downloading
    /// guard is raised and the stored query is returned for the walker.
    pub fn try_begin_export(&mut self) -> std::result::Result<SearchQuery, ExportRefusal> {
        if self.downloading {
            return Err(ExportRefusal::AlreadyRunning);
        }
        if self.selected.is_none() {
            return Err(ExportRefusal::NothingSelected);
        }
        let query = match &self.searched_query {
            Some(query) => query.clone(),
            None => return Err(ExportRefusal::NothingSelected),
        };
        self.downloading = true;
        self.export_job = ExportJobState::Idle;
        Ok(query)
    }

    /// Record an export job transition.
    pub fn set_export_job(&mut self, job: ExportJobState) {
        self.export_job = job;
    }

    /// The export produced its file.
    pub fn finish_export(&mut self) {
        self.downloading = false;
        self.export_job = ExportJobState::Complete;
    }

    /// The export was cancelled mid-flight; prior search results stay put.
    pub fn cancel_export(&mut self) {
        self.downloading = false;
        self.export_job = ExportJobState::Cancelled;
    }

    /// The export failed; prior search results stay put.
    pub fn fail_export(&mut self, info: ErrorInfo) {
        self.downloading = false;
        self.export_job = ExportJobState::Failed;
        self.error = Some(info);
    }

    /* ===================== accessors ===================== */

    pub fn results(&self) -> Option<&SearchPage> {
        self.results.as_ref()
    }

    pub fn searched_query(&self) -> Option<&SearchQuery> {
        self.searched_query.as_ref()
    }

    pub fn selected(&self) -> Option<&Value> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn export_job(&self) -> &ExportJobState {
        &self.export_job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(records: Vec<Value>) -> SearchPage {
        let count = records.len() as u64;
        SearchPage {
            results: records,
            count,
            next: None,
        }
    }

    #[test]
    fn test_finish_search_selects_first_record() {
        let mut state = AppState::new();
        state.begin_search(SearchQuery::new());
        state.finish_search(page(vec![json!({"Name": "a"}), json!({"Name": "b"})]));

        assert!(!state.is_loading());
        assert_eq!(state.selected(), Some(&json!({"Name": "a"})));
    }

    #[test]
    fn test_empty_results_keep_previous_selection() {
        let mut state = AppState::new();
        state.begin_search(SearchQuery::new());
        state.finish_search(page(vec![json!({"Name": "a"})]));

        state.begin_search(SearchQuery::new());
        state.finish_search(page(vec![]));
        assert_eq!(state.selected(), Some(&json!({"Name": "a"})));
    }

    #[test]
    fn test_begin_search_clears_error_and_results() {
        let mut state = AppState::new();
        state.begin_search(SearchQuery::new());
        state.fail_search(ErrorInfo {
            status: Some(500),
            message: "boom".to_string(),
        });
        assert!(state.error().is_some());

        state.begin_search(SearchQuery::new());
        assert!(state.error().is_none());
        assert!(state.results().is_none());
        assert!(state.is_loading());
    }

    #[test]
    fn test_export_refused_without_selection() {
        let mut state = AppState::new();
        assert_eq!(state.try_begin_export(), Err(ExportRefusal::NothingSelected));
        assert!(!state.is_downloading());
    }

    #[test]
    fn test_export_refused_while_running() {
        let mut state = AppState::new();
        state.begin_search(SearchQuery::new());
        state.finish_search(page(vec![json!({"Name": "a"})]));

        assert!(state.try_begin_export().is_ok());
        assert_eq!(state.try_begin_export(), Err(ExportRefusal::AlreadyRunning));
    }

    #[test]
    fn test_export_guard_clears_exactly_once() {
        let mut state = AppState::new();
        state.begin_search(SearchQuery::new());
        state.finish_search(page(vec![json!({"Name": "a"})]));

        state.try_begin_export().unwrap();
        state.finish_export();
        assert!(!state.is_downloading());
        assert_eq!(state.export_job(), &ExportJobState::Complete);

        // a new job may start now
        assert!(state.try_begin_export().is_ok());
        state.fail_export(ErrorInfo {
            status: None,
            message: "network down".to_string(),
        });
        assert_eq!(state.export_job(), &ExportJobState::Failed);
        assert!(state.error().is_some());
        // search results survive an export failure
        assert!(state.results().is_some());
    }
}
