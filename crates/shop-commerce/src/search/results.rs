//! Query results and pagination.

use crate::search::AttributeFilter;
use serde::{Deserialize, Serialize};

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: i64,
    /// Items per page.
    pub per_page: i64,
    /// Total number of items.
    pub total: i64,
    /// Total number of pages (at least 1).
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Create pagination info. `page` and `per_page` are raised to 1.
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total_pages = if total <= 0 {
            1
        } else {
            total / per_page + i64::from(total % per_page != 0)
        };

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Take this page's window out of `items`.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let per_page = usize::try_from(self.per_page).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(per_page).collect()
    }

    /// Get start item number (1-indexed, 0 when empty).
    pub fn start_item(&self) -> i64 {
        if self.total == 0 || self.offset() >= self.total {
            0
        } else {
            self.offset() + 1
        }
    }

    /// Get end item number.
    pub fn end_item(&self) -> i64 {
        self.page.saturating_mul(self.per_page).min(self.total)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 24, 0)
    }
}

/// A page of results plus the facets of the unfiltered scope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults<T> {
    /// The result items.
    pub items: Vec<T>,
    pub pagination: Pagination,
    pub facets: Vec<AttributeFilter>,
}

impl<T> SearchResults<T> {
    /// Create new search results.
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self {
            items,
            pagination,
            facets: Vec::new(),
        }
    }

    /// Page `items` according to `page` and `per_page`.
    pub fn paginate(items: Vec<T>, page: i64, per_page: i64) -> Self {
        let pagination = Pagination::new(page, per_page, items.len() as i64);
        Self::new(pagination.slice(items), pagination)
    }

    /// Set facets.
    pub fn with_facets(mut self, facets: Vec<AttributeFilter>) -> Self {
        self.facets = facets;
        self
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_basics() {
        let p = Pagination::new(2, 10, 45);
        assert_eq!(p.total_pages, 5);
        assert!(p.has_next);
        assert!(p.has_prev);
        assert_eq!(p.offset(), 10);
        assert_eq!(p.start_item(), 11);
        assert_eq!(p.end_item(), 20);
    }

    #[test]
    fn test_pagination_last_page() {
        let p = Pagination::new(5, 10, 45);
        assert!(p.has_prev);
        assert!(!p.has_next);
        assert_eq!(p.end_item(), 45);
    }

    #[test]
    fn test_pagination_empty() {
        let p = Pagination::new(0, 0, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 1);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.start_item(), 0);
    }

    #[test]
    fn test_paginate() {
        let results = SearchResults::paginate((1..=7).collect(), 2, 3);
        assert_eq!(results.items, vec![4, 5, 6]);
        assert_eq!(results.pagination.total, 7);

        let past_end = SearchResults::paginate((1..=7).collect::<Vec<i32>>(), 9, 3);
        assert!(past_end.is_empty());
    }

    #[test]
    fn test_pagination_extreme_values() {
        let p = Pagination::new(i64::MAX, 24, 7);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.offset(), i64::MAX);
        assert_eq!(p.start_item(), 0);
        assert_eq!(p.end_item(), 7);
        assert!(!p.has_next);

        let p = Pagination::new(1, i64::MAX, i64::MAX);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.end_item(), i64::MAX);

        let huge_page = SearchResults::paginate((1..=7).collect::<Vec<i32>>(), i64::MAX, 24);
        assert!(huge_page.is_empty());
        let one_page = SearchResults::paginate((1..=7).collect::<Vec<i32>>(), 1, i64::MAX);
        assert_eq!(one_page.len(), 7);
    }
}
