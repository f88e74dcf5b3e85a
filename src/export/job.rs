//! Export coordinator for orchestrating export operations.
//!
//! This module provides the coordinator that brings together the page
//! walker, progress tracking, and format encoding to run one export job
//! end to end: guard, fetch loop, encode, file handoff.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::SearchBackend;
use crate::config::ExportConfig;
use crate::error::{ErrorInfo, Result};
use crate::query::RequestToken;
use crate::state::{AppState, ExportJobState};

use super::progress::ProgressTracker;
use super::walker::PageWalker;
use super::writers::encoder_for;
use super::ExportFormat;

/// Result of a completed export: the file body plus the metadata the
/// file-save collaborator needs.
#[derive(Debug)]
pub struct ExportFile {
    /// Serialized file body.
    pub bytes: Vec<u8>,

    /// Timestamp-derived file name, extension included.
    pub filename: String,

    /// MIME type of the body.
    pub content_type: &'static str,
}

/// Coordinator for one export job.
///
/// Only one job may be active process-wide; the shared state's downloading
/// guard enforces that, and a refused start is a logged no-op.
pub struct ExportCoordinator {
    backend: Arc<dyn SearchBackend>,
    state: Arc<RwLock<AppState>>,
    tracker: ProgressTracker,
    config: ExportConfig,
    cancel: Option<RequestToken>,
}

impl ExportCoordinator {
    /// Create a new export coordinator.
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        state: Arc<RwLock<AppState>>,
        tracker: ProgressTracker,
        config: ExportConfig,
    ) -> Self {
        Self {
            backend,
            state,
            tracker,
            config,
            cancel: None,
        }
    }

    /// Set a cancellation handle for this export job.
    ///
    /// Cancellation is cooperative: it is honored between page fetches.
    pub fn with_cancellation(mut self, token: RequestToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Execute the export job.
    ///
    /// Walks every page of the stored query's result set, accumulates the
    /// records, encodes them in the requested format, and returns the file.
    /// Returns `Ok(None)` when the job is refused (another job running, no
    /// completed search) or cancelled; both leave prior search results
    /// untouched.
    pub async fn run(&mut self, format: ExportFormat) -> Result<Option<ExportFile>> {
        let query = {
            let mut state = self.state.write().await;
            match state.try_begin_export() {
                Ok(query) => query,
                Err(refusal) => {
                    warn!("export refused: {refusal}");
                    return Ok(None);
                }
            }
        };

        info!(%format, "starting export");
        let mut walker = PageWalker::new(self.backend.as_ref(), &query);
        let mut accumulated: Vec<serde_json::Value> = Vec::new();

        loop {
            if let Some(ref token) = self.cancel {
                if token.is_cancelled() {
                    info!("export cancelled, discarding {} accumulated records", accumulated.len());
                    self.tracker.reset();
                    self.state.write().await.cancel_export();
                    return Ok(None);
                }
            }

            self.state
                .write()
                .await
                .set_export_job(ExportJobState::Fetching {
                    page: walker.pages_fetched() + 1,
                });

            match walker.next_page().await {
                Ok(Some(batch)) => {
                    let mut state = self.state.write().await;
                    state.set_export_job(ExportJobState::Aggregating);
                    drop(state);

                    accumulated.extend(batch);
                    self.tracker.update(walker.offset(), walker.total_count());
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("export failed while fetching page {}: {err}", walker.pages_fetched() + 1);
                    self.tracker.reset();
                    self.state.write().await.fail_export(ErrorInfo::from_error(&err));
                    return Err(err);
                }
            }
        }

        debug!(records = accumulated.len(), "walk complete, writing output");
        self.state.write().await.set_export_job(ExportJobState::Writing);

        let encoder = encoder_for(format, &self.config);
        let bytes = match encoder.encode(&accumulated) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("export failed while encoding: {err}");
                self.tracker.reset();
                self.state.write().await.fail_export(ErrorInfo::from_error(&err));
                return Err(err);
            }
        };

        let filename = export_filename(encoder.extension());
        self.state.write().await.finish_export();
        self.tracker.reset();

        info!(
            records = accumulated.len(),
            bytes = bytes.len(),
            filename = %filename,
            "export completed"
        );

        Ok(Some(ExportFile {
            bytes,
            filename,
            content_type: encoder.content_type(),
        }))
    }
}

/// Timestamp-derived export file name.
fn export_filename(extension: &str) -> String {
    format!("{}_results.{extension}", Utc::now().format("%Y-%m-%dT%H-%M-%SZ"))
}
