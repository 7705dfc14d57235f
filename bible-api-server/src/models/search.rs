//! Search input: query text and result limit

use super::ValidationError;

/// Maximum length for search text
const MAX_QUERY_LEN: usize = 200;

/// Queries shorter than this (trimmed, in characters) are treated as short
const SHORT_QUERY_LEN: usize = 4;

/// Default number of results
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Maximum number of results
const MAX_SEARCH_LIMIT: u32 = 200;

/// Validated, trimmed search text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "query" });
        }

        if trimmed.chars().count() > MAX_QUERY_LEN {
            return Err(ValidationError::TooLong {
                field: "query",
                max: MAX_QUERY_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short queries (common words, fragments) favour substring matching.
    pub fn is_short(&self) -> bool {
        self.0.chars().count() < SHORT_QUERY_LEN
    }
}

/// Result limit, clamped to 1..=200
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimit(u32);

impl SearchLimit {
    pub fn new(limit: Option<i64>) -> Self {
        let value = limit
            .unwrap_or(i64::from(DEFAULT_SEARCH_LIMIT))
            .clamp(1, i64::from(MAX_SEARCH_LIMIT));
        Self(value as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for SearchLimit {
    fn default() -> Self {
        Self(DEFAULT_SEARCH_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_trimmed() {
        let q = SearchQuery::new("  love  ").unwrap();
        assert_eq!(q.as_str(), "love");
    }

    #[test]
    fn rejects_blank_query() {
        assert!(matches!(
            SearchQuery::new("   ").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn short_query_threshold() {
        assert!(SearchQuery::new("God").unwrap().is_short());
        assert!(SearchQuery::new(" a ").unwrap().is_short());
        assert!(!SearchQuery::new("love").unwrap().is_short());
        assert!(!SearchQuery::new("in the beginning").unwrap().is_short());
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(SearchLimit::new(None).get(), 50);
        assert_eq!(SearchLimit::new(Some(0)).get(), 1);
        assert_eq!(SearchLimit::new(Some(-5)).get(), 1);
        assert_eq!(SearchLimit::new(Some(10)).get(), 10);
        assert_eq!(SearchLimit::new(Some(10_000)).get(), 200);
    }
}
