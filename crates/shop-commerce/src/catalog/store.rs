//! Catalog read model.

use crate::catalog::{category, Category, Product, Variation};
use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId, VariationId};
use crate::search::SearchResults;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read access to products and categories.
pub trait CatalogStore: Send + Sync {
    /// Look up a product by id.
    fn product(&self, id: &ProductId) -> Option<&Product>;

    /// Look up a product by its slug in `lang`.
    fn product_by_slug(&self, slug: &str, lang: &str) -> Option<&Product>;

    /// All products, newest first.
    fn products(&self) -> Vec<&Product>;

    /// Products in `category`, newest first.
    fn products_in_category(&self, category: &CategoryId) -> Vec<&Product> {
        self.products()
            .into_iter()
            .filter(|p| p.in_category(category))
            .collect()
    }

    /// A page of products, optionally scoped to a category, newest first.
    fn list_products(
        &self,
        category: Option<&CategoryId>,
        page: i64,
        per_page: i64,
    ) -> SearchResults<&Product> {
        let products = match category {
            Some(c) => self.products_in_category(c),
            None => self.products(),
        };
        SearchResults::paginate(products, page, per_page)
    }

    /// Look up a category by id.
    fn category(&self, id: &CategoryId) -> Option<&Category>;

    /// Look up a category by its slug in `lang`.
    fn category_by_slug(&self, slug: &str, lang: &str) -> Option<&Category>;

    /// All categories.
    fn categories(&self) -> &[Category];

    /// Direct children of `parent`.
    fn child_categories(&self, parent: &CategoryId) -> Vec<&Category> {
        category::child_categories(self.categories(), parent)
    }

    /// Root-first breadcrumb chain ending at `id`.
    fn breadcrumbs(&self, id: &CategoryId) -> Vec<&Category> {
        category::ancestor_chain(self.categories(), id)
    }

    /// Resolve a cart line to its product and variation.
    fn variation(
        &self,
        product_id: &ProductId,
        variation_id: &VariationId,
    ) -> Result<(&Product, &Variation), CommerceError> {
        let product = self
            .product(product_id)
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
        let variation = product.variation(variation_id).ok_or_else(|| {
            CommerceError::VariationNotFound(format!("{}/{}", product_id, variation_id))
        })?;
        Ok((product, variation))
    }
}

/// On-disk catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl InMemoryCatalog {
    /// Build a catalog. Products are kept newest first.
    pub fn new(mut products: Vec<Product>, categories: Vec<Category>) -> Self {
        // Stable sort keeps input order among equal timestamps.
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self {
            products,
            categories,
        }
    }

    /// Parse a `{ "products": [...], "categories": [...] }` document.
    pub fn from_json(json: &str) -> Result<Self, CommerceError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Ok(Self::new(doc.products, doc.categories))
    }

    /// Load a catalog document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CommerceError::Config(format!("failed to read catalog {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            products = catalog.products.len(),
            categories = catalog.categories.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    fn product_by_slug(&self, slug: &str, lang: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug.get(lang) == Some(slug))
    }

    fn products(&self) -> Vec<&Product> {
        self.products.iter().collect()
    }

    fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    fn category_by_slug(&self, slug: &str, lang: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug.get(lang) == Some(slug))
    }

    fn categories(&self) -> &[Category] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LocalizedText;

    const DOC: &str = r#"{
        "products": [
            {"id": "old", "name": {"en": "Old"}, "slug": {"en": "old", "fr": "ancien"},
             "categoryIds": ["shirts"], "createdAt": 1,
             "variations": [{"id": "v1", "price": 1000, "inventory": 1, "isActive": true}]},
            {"id": "new", "name": {"en": "New"}, "slug": {"en": "new"},
             "categoryIds": ["shoes"], "createdAt": 3},
            {"id": "mid", "name": {"en": "Mid"}, "categoryIds": ["shirts"], "createdAt": 2}
        ],
        "categories": [
            {"id": "clothing", "name": {"en": "Clothing"}, "slug": {"en": "clothing"}},
            {"id": "shirts", "name": {"en": "Shirts"}, "parentId": "clothing", "slug": {"en": "shirts"}},
            {"id": "shoes", "name": {"en": "Shoes"}, "parentId": "clothing"}
        ]
    }"#;

    #[test]
    fn test_products_newest_first() {
        let catalog = InMemoryCatalog::from_json(DOC).unwrap();
        let ids: Vec<_> = catalog.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_slug_lookup_is_per_language() {
        let catalog = InMemoryCatalog::from_json(DOC).unwrap();
        assert_eq!(
            catalog.product_by_slug("ancien", "fr").map(|p| p.id.as_str()),
            Some("old")
        );
        assert!(catalog.product_by_slug("ancien", "en").is_none());
        assert_eq!(
            catalog.category_by_slug("shirts", "en").map(|c| c.id.as_str()),
            Some("shirts")
        );
    }

    #[test]
    fn test_category_scoped_listing() {
        let catalog = InMemoryCatalog::from_json(DOC).unwrap();
        let shirts = CategoryId::new("shirts");

        let page = catalog.list_products(Some(&shirts), 1, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id.as_str(), "mid");
        assert_eq!(page.pagination.total, 2);
        assert!(page.pagination.has_next);
    }

    #[test]
    fn test_unbounded_page_size() {
        let catalog = InMemoryCatalog::from_json(DOC).unwrap();
        let page = catalog.list_products(None, 1, i64::MAX);
        assert_eq!(page.items.len(), catalog.products().len());
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn test_category_tree() {
        let catalog = InMemoryCatalog::from_json(DOC).unwrap();
        let clothing = CategoryId::new("clothing");

        assert_eq!(catalog.child_categories(&clothing).len(), 2);
        let crumbs: Vec<_> = catalog
            .breadcrumbs(&CategoryId::new("shirts"))
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(crumbs, vec!["clothing", "shirts"]);
    }

    #[test]
    fn test_variation_resolution() {
        let catalog = InMemoryCatalog::new(
            vec![Product::new("p", LocalizedText::from([("en", "P")]))
                .with_variation(Variation::new("v", 100))],
            Vec::new(),
        );

        assert!(catalog
            .variation(&ProductId::new("p"), &VariationId::new("v"))
            .is_ok());
        assert!(matches!(
            catalog.variation(&ProductId::new("p"), &VariationId::new("x")),
            Err(CommerceError::VariationNotFound(_))
        ));
        assert!(matches!(
            catalog.variation(&ProductId::new("q"), &VariationId::new("v")),
            Err(CommerceError::ProductNotFound(_))
        ));
    }
}
