//! Category types for product organization.

use crate::clock::current_timestamp;
use crate::i18n::LocalizedText;
use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A product category in the catalog hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub slug: LocalizedText,
    /// Parent category ID (None for root categories).
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// Category image URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Category {
    /// Create a new root category.
    pub fn new(id: impl Into<CategoryId>, name: LocalizedText) -> Self {
        let now = current_timestamp();
        Self {
            id: id.into(),
            name,
            description: LocalizedText::new(),
            slug: LocalizedText::new(),
            parent_id: None,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Place under `parent`.
    pub fn with_parent(mut self, parent: impl Into<CategoryId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Set the slug.
    pub fn with_slug(mut self, slug: LocalizedText) -> Self {
        self.slug = slug;
        self
    }

    /// Check if this is a root category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Root categories, in input order.
pub fn root_categories(categories: &[Category]) -> Vec<&Category> {
    categories.iter().filter(|c| c.is_root()).collect()
}

/// Direct children of `parent`, in input order.
pub fn child_categories<'a>(categories: &'a [Category], parent: &CategoryId) -> Vec<&'a Category> {
    categories
        .iter()
        .filter(|c| c.parent_id.as_ref() == Some(parent))
        .collect()
}

/// Breadcrumb chain ending at `id`, root first.
///
/// Parents missing from `categories` end the chain. Each category is
/// visited at most once, so a cycle cannot loop forever.
pub fn ancestor_chain<'a>(categories: &'a [Category], id: &CategoryId) -> Vec<&'a Category> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = categories.iter().find(|c| &c.id == id);

    while let Some(category) = current {
        if !seen.insert(&category.id) {
            break;
        }
        chain.push(category);
        current = category
            .parent_id
            .as_ref()
            .and_then(|parent| categories.iter().find(|c| &c.id == parent));
    }

    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: &str, parent: Option<&str>) -> Category {
        let category = Category::new(id, LocalizedText::from([("en", id)]));
        match parent {
            Some(p) => category.with_parent(p),
            None => category,
        }
    }

    #[test]
    fn test_tree_helpers() {
        let cats = vec![
            cat("clothing", None),
            cat("shirts", Some("clothing")),
            cat("tees", Some("shirts")),
            cat("shoes", None),
        ];

        let roots: Vec<_> = root_categories(&cats).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(roots, vec!["clothing", "shoes"]);

        let kids = child_categories(&cats, &CategoryId::new("clothing"));
        assert_eq!(kids.len(), 1);
        assert_eq!(kids[0].id.as_str(), "shirts");
    }

    #[test]
    fn test_ancestor_chain() {
        let cats = vec![
            cat("clothing", None),
            cat("shirts", Some("clothing")),
            cat("tees", Some("shirts")),
        ];

        let chain: Vec<_> = ancestor_chain(&cats, &CategoryId::new("tees"))
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(chain, vec!["clothing", "shirts", "tees"]);
        assert!(ancestor_chain(&cats, &CategoryId::new("nope")).is_empty());
    }

    #[test]
    fn test_ancestor_chain_survives_cycle() {
        let cats = vec![cat("a", Some("b")), cat("b", Some("a"))];
        let chain = ancestor_chain(&cats, &CategoryId::new("a"));
        assert_eq!(chain.len(), 2);
    }
}
