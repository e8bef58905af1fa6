//! Query parameter extractors for list endpoints.

use serde::Deserialize;

/// Pagination for session and message lists. Pages are 1-based; absent
/// values fall back to the endpoint's defaults.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Query parameters for the context window preview.
#[derive(Debug, Deserialize, Default)]
pub struct ContextQuery {
    /// Override the configured history token budget.
    pub budget: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults_to_none() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert!(query.page.is_none());
        assert!(query.page_size.is_none());
    }

    #[test]
    fn test_context_query_accepts_negative_budget() {
        let query: ContextQuery = serde_json::from_str(r#"{"budget":-5}"#).unwrap();
        assert_eq!(query.budget, Some(-5));
    }
}
