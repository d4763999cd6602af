//! # Search Matching
//!
//! Every list screen has a search box with the same semantics: the trimmed
//! query matches a record when it is a case-insensitive substring of any of
//! the record's searchable fields. An empty query lists everything.
//!
//! ```text
//!   "  PROD " ──trim──► "PROD" ──lowercase──► needle "prod"
//!                                               │
//!         "Prod1" ──lowercase──► "prod1" ───────┤ contains? ✅
//!         "Cable" ──lowercase──► "cable" ───────┘ contains? ❌
//! ```
//!
//! The SQLite store runs the same test in SQL
//! (`instr(lower(column), ?needle) > 0`); the in-memory store uses
//! [`SearchQuery::matches_any`].

use crate::validation::{validate_search_query, ValidationResult};

/// A validated, non-empty search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    /// Parses a search box value.
    ///
    /// Returns `Ok(None)` for a blank query, meaning "list all".
    pub fn parse(query: &str) -> ValidationResult<Option<Self>> {
        let raw = validate_search_query(query)?;
        if raw.is_empty() {
            return Ok(None);
        }
        let needle = raw.to_lowercase();
        Ok(Some(SearchQuery { raw, needle }))
    }

    /// The trimmed query as typed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The lowercased query used for matching.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, field: &str) -> bool {
        field.to_lowercase().contains(&self.needle)
    }

    pub fn matches_any<'a, I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        fields.into_iter().any(|f| self.matches(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_lists_all() {
        assert_eq!(SearchQuery::parse("").unwrap(), None);
        assert_eq!(SearchQuery::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_case_insensitive_substring() {
        let q = SearchQuery::parse("  PROD ").unwrap().unwrap();
        assert_eq!(q.as_str(), "PROD");
        assert_eq!(q.needle(), "prod");

        assert!(q.matches("Prod1"));
        assert!(q.matches("my product"));
        assert!(!q.matches("Cable"));
    }

    #[test]
    fn test_matches_any_field() {
        let q = SearchQuery::parse("informatique").unwrap().unwrap();
        assert!(q.matches_any(["Prod1", "REF1", "Informatique"]));
        assert!(!q.matches_any(["Prod1", "REF1"]));
        assert!(!q.matches_any(std::iter::empty()));
    }

    #[test]
    fn test_too_long_query_rejected() {
        assert!(SearchQuery::parse(&"a".repeat(101)).is_err());
    }
}
