//! Registry API layer.
//!
//! This module talks to the registry's paginated search endpoint:
//!
//! 1. **SearchBackend**: the trait seam between the pipeline and the wire,
//!    so the page walker and query manager are testable against mocks
//! 2. **HttpSearchClient**: the reqwest-backed production implementation
//! 3. **SearchPage**: the canonical page shape returned by the backend
//!
//! Page fetches are strictly sequential; the next page's locator is only
//! known once the previous response has arrived.

use async_trait::async_trait;

use crate::error::Result;
use crate::query::SearchQuery;

pub mod client;
pub mod types;

pub use client::HttpSearchClient;
pub use types::{PAGE_SIZE, SearchPage};

/// Trait for fetching one page of search results.
///
/// This provides a unified interface over the registry's bulk search
/// endpoint for both the interactive search path and the export walker.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetch a single page of results.
    ///
    /// # Arguments
    /// * `query` - Search criteria, sent as the request payload
    /// * `locator` - Server-provided page locator to follow verbatim, or
    ///   `None` for the first page
    ///
    /// # Returns
    /// * `Result<SearchPage>` - The decoded page or an error
    async fn fetch_page(&self, query: &SearchQuery, locator: Option<&str>) -> Result<SearchPage>;
}
