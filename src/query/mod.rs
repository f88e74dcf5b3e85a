//! Search query construction and submission.
//!
//! A [`SearchQuery`] is a mapping from criterion name to value: scalars,
//! ordered scalar sequences (multi-select filters), plus an optional
//! GeoJSON-like region descriptor. The region is merged into the outgoing
//! payload as an additional field at send time and is never itself one of
//! the named criteria.
//!
//! [`state::QueryStateManager`] owns the current query and the single
//! outstanding request's cancellation handle.

use serde_json::{Map, Value};

use crate::error::{QueryError, Result};

pub mod cancel;
pub mod state;

pub use cancel::{RequestToken, SUPERSEDED_REASON};
pub use state::QueryStateManager;

/// Payload field the region descriptor is merged under.
pub const REGION_FIELD: &str = "FeatureCollection";

/// Search criteria for one registry query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    criteria: Map<String, Value>,
    region: Option<Value>,
    pagination: Option<String>,
}

impl SearchQuery {
    /// Create an empty query matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named filter criterion.
    ///
    /// The value may be a scalar or an ordered sequence of scalars
    /// (multi-select). The region field name is reserved; use
    /// [`set_region`](Self::set_region) for region search.
    pub fn set_criterion(&mut self, name: &str, value: Value) -> Result<()> {
        if name == REGION_FIELD {
            return Err(QueryError::ReservedCriterion(name.to_string()).into());
        }
        self.criteria.insert(name.to_string(), value);
        Ok(())
    }

    /// Builder form of [`set_criterion`](Self::set_criterion).
    pub fn with_criterion(mut self, name: &str, value: Value) -> Result<Self> {
        self.set_criterion(name, value)?;
        Ok(self)
    }

    /// Attach or clear the region descriptor.
    pub fn set_region(&mut self, region: Option<Value>) {
        self.region = region;
    }

    /// Attach or clear a pagination continuation token.
    ///
    /// The token is a query-string fragment (`limit=20&offset=40`) appended
    /// to the request URL; it never replaces the query payload.
    pub fn set_pagination(&mut self, token: Option<String>) {
        self.pagination = token;
    }

    /// Pagination continuation token, if any.
    pub fn pagination(&self) -> Option<&str> {
        self.pagination.as_deref()
    }

    /// Copy of this query without its pagination token.
    ///
    /// The export walker always re-issues the full query from the first
    /// record regardless of the page the user was looking at.
    pub fn without_pagination(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            region: self.region.clone(),
            pagination: None,
        }
    }

    /// Whether any criterion or region is set.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty() && self.region.is_none()
    }

    /// Request payload: the criteria map with the region descriptor, if
    /// present, merged in under [`REGION_FIELD`].
    pub fn payload(&self) -> Value {
        let mut payload = self.criteria.clone();
        if let Some(region) = &self.region {
            payload.insert(REGION_FIELD.to_string(), region.clone());
        }
        Value::Object(payload)
    }
}
