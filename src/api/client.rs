//! HTTP client for the registry search endpoint.
//!
//! This module provides the production [`SearchBackend`] implementation,
//! a thin reqwest wrapper that handles:
//! - Authorization headers, substituting the configured public token when
//!   no session token is present
//! - Building the search URL, appending pagination continuation tokens
//! - Resolving relative page locators against the endpoint base

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::query::SearchQuery;

use super::types::SearchPage;
use super::SearchBackend;

/// Reqwest-backed search client.
pub struct HttpSearchClient {
    http: reqwest::Client,
    endpoint: Url,
    search_path: String,
    auth_token: Option<String>,
    public_token: String,
}

impl HttpSearchClient {
    /// Create a new client from API configuration.
    ///
    /// # Arguments
    /// * `config` - API section of the loaded configuration
    ///
    /// # Returns
    /// * `Result<Self>` - New client or an error for an unparseable endpoint
    pub fn new(config: &ApiConfig) -> Result<Self> {
        // A missing trailing slash would make Url::join drop the last path
        // segment of the endpoint.
        let mut endpoint = config.endpoint.clone();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {e}", config.endpoint)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            search_path: config.search_path.clone(),
            auth_token: config.auth_token.clone(),
            public_token: config.public_token.clone(),
        })
    }

    /// Authorization header value.
    ///
    /// Uses the session token when one is configured, falling back to the
    /// anonymous public token otherwise.
    fn auth_header(&self) -> String {
        let token = self.auth_token.as_deref().unwrap_or(&self.public_token);
        format!("Token {token}")
    }

    /// Build the initial search URL, appending a pagination continuation
    /// token when the query carries one.
    fn search_url(&self, pagination: Option<&str>) -> Result<Url> {
        let mut url = self
            .endpoint
            .join(&self.search_path)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {e}", self.search_path)))?;
        if let Some(token) = pagination {
            url.set_query(Some(token));
        }
        Ok(url)
    }

    /// Resolve a server-provided page locator.
    ///
    /// Absolute locators are followed verbatim; relative ones resolve
    /// against the endpoint base.
    fn resolve_locator(&self, locator: &str) -> Result<Url> {
        Url::parse(locator)
            .or_else(|_| self.endpoint.join(locator))
            .map_err(|e| ApiError::InvalidEndpoint(format!("{locator}: {e}")).into())
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn fetch_page(&self, query: &SearchQuery, locator: Option<&str>) -> Result<SearchPage> {
        let url = match locator {
            Some(loc) => self.resolve_locator(loc)?,
            None => self.search_url(query.pagination())?,
        };

        // Filter criteria travel in the POST body on every page; the
        // locator only carries the limit/offset window.
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.auth_header())
            .json(&query.payload())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
            }
            .into());
        }

        let page = response.json::<SearchPage>().await?;
        Ok(page)
    }
}
