use serde::Deserialize;
use serde_json::Value;

/// Fixed number of records per page in the backend's pagination contract.
///
/// The server always slices results in windows of this size; the export
/// walker advances its offset by it after every page.
pub const PAGE_SIZE: u64 = 20;

/// One page of search results as returned by the bulk search endpoint.
///
/// Canonical shape: `{ "results": [...], "count": n, "next": url|null }`.
/// `next` is null iff this is the last page, and `count` is stable across
/// every page of one walk. Records themselves are schemaless trees, so they
/// stay as raw [`Value`]s until the export pipeline flattens them.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    /// Records in this page, in server order.
    pub results: Vec<Value>,

    /// Total number of records matching the query, across all pages.
    pub count: u64,

    /// Locator for the next page, absolute or relative. Null on the last page.
    pub next: Option<String>,
}

impl SearchPage {
    /// Whether this page is the last one of its result set.
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_decodes_canonical_shape() {
        let page: SearchPage = serde_json::from_str(
            r#"{"results": [{"Name": {"Value": "a"}}], "count": 41, "next": "/search/?limit=20&offset=20"}"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.count, 41);
        assert!(!page.is_last());
    }

    #[test]
    fn test_last_page_has_null_next() {
        let page: SearchPage =
            serde_json::from_str(r#"{"results": [], "count": 0, "next": null}"#).unwrap();
        assert!(page.is_last());
    }
}
