//! Registry Search and Export Library
//!
//! This library provides the core functionality for the regsearch client.
//! It can be used as a standalone library to build registry tools and
//! applications.
//!
//! # Modules
//!
//! - `api`: Registry API client and the page-fetch trait seam
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Bulk export pipeline (walker, flattener, encoders, progress)
//! - `query`: Search query construction, submission, and supersession
//! - `state`: Owned application state with typed updates
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//!
//! use regsearch::api::HttpSearchClient;
//! use regsearch::config::Config;
//! use regsearch::query::{QueryStateManager, SearchQuery};
//! use regsearch::state::AppState;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let backend = Arc::new(HttpSearchClient::new(&config.api)?);
//!     let state = Arc::new(RwLock::new(AppState::new()));
//!
//!     let manager = QueryStateManager::new(backend, state.clone());
//!     manager.submit_query(SearchQuery::new()).await;
//!
//!     let state = state.read().await;
//!     println!("{} records", state.results().map(|p| p.count).unwrap_or(0));
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod query;
pub mod state;

// Re-export commonly used types
pub use api::{HttpSearchClient, SearchBackend, SearchPage};
pub use config::Config;
pub use error::{ErrorInfo, RegsearchError, Result};
pub use export::{ExportCoordinator, ExportFile, ExportFormat, ProgressTracker};
pub use query::{QueryStateManager, RequestToken, SearchQuery};
pub use state::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
