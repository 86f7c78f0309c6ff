//! Product listing query builder.

use crate::catalog::{CatalogStore, Product};
use crate::ids::{AttributeId, CategoryId, OptionId};
use crate::search::{apply_facets, build_facets, FacetSelection, SearchResults};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Newest first.
    #[default]
    Newest,
    /// Lowest purchasable price first.
    PriceLowHigh,
    /// Highest purchasable price first.
    PriceHighLow,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Newest => "newest",
            SortOption::PriceLowHigh => "price-low-high",
            SortOption::PriceHighLow => "price-high-low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(SortOption::Newest),
            "price-low-high" => Some(SortOption::PriceLowHigh),
            "price-high-low" => Some(SortOption::PriceHighLow),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Newest => "Newest",
            SortOption::PriceLowHigh => "Price: Low to High",
            SortOption::PriceHighLow => "Price: High to Low",
        }
    }

    /// Sort `products` in place.
    ///
    /// Products without a purchasable variation go last for both price
    /// orders. The sort is stable.
    pub fn sort(&self, products: &mut [&Product]) {
        match self {
            SortOption::Newest => products.sort_by_key(|p| Reverse(p.created_at)),
            SortOption::PriceLowHigh => {
                products.sort_by_key(|p| p.lowest_price().map_or((1, 0), |price| (0, price)))
            }
            SortOption::PriceHighLow => products
                .sort_by_key(|p| p.lowest_price().map_or((1, 0), |price| (0, -price))),
        }
    }
}

/// A product listing query.
///
/// Runs category scope, facet derivation, facet application, sort and
/// pagination in that order. Facets are derived before the selection is
/// applied so every option of the scope stays visible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<CategoryId>,
    pub selected: FacetSelection,
    pub sort: SortOption,
    /// Current page (1-indexed).
    pub page: i64,
    /// Items per page (1..=100).
    pub per_page: i64,
}

impl ProductQuery {
    /// Create a query over the whole catalog.
    pub fn new() -> Self {
        Self {
            category: None,
            selected: FacetSelection::new(),
            sort: SortOption::Newest,
            page: 1,
            per_page: 24,
        }
    }

    /// Scope to a category.
    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Select an option of an attribute. Repeated calls for the same
    /// attribute widen the selection.
    pub fn with_option(
        mut self,
        attribute: impl Into<AttributeId>,
        option: impl Into<OptionId>,
    ) -> Self {
        let options = self.selected.entry(attribute.into()).or_default();
        let option = option.into();
        if !options.contains(&option) {
            options.push(option);
        }
        self
    }

    /// Replace the whole facet selection.
    pub fn with_selection(mut self, selected: FacetSelection) -> Self {
        self.selected = selected;
        self
    }

    /// Set sort option.
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Set pagination.
    pub fn with_pagination(mut self, page: i64, per_page: i64) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.clamp(1, 100);
        self
    }

    /// Run the query against `catalog`.
    pub fn execute<'a, C>(&self, catalog: &'a C) -> SearchResults<&'a Product>
    where
        C: CatalogStore + ?Sized,
    {
        let scoped = match &self.category {
            Some(category) => catalog.products_in_category(category),
            None => catalog.products(),
        };

        let facets = build_facets(scoped.iter().copied());
        let mut matched = apply_facets(scoped, &self.selected);
        self.sort.sort(&mut matched);

        tracing::debug!(
            category = ?self.category,
            matched = matched.len(),
            facets = facets.len(),
            "product query executed"
        );

        SearchResults::paginate(matched, self.page, self.per_page).with_facets(facets)
    }
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Attribute, InMemoryCatalog, Variation};
    use crate::i18n::LocalizedText;

    fn text(s: &str) -> LocalizedText {
        LocalizedText::from([("en", s)])
    }

    fn tee(id: &str, category: &str, created: i64, price: i64, color: &str) -> Product {
        Product::new(id, text(id))
            .with_category(category)
            .created(created)
            .with_variation(
                Variation::new(format!("{id}-v"), price)
                    .with_inventory(2)
                    .with_attribute(
                        Attribute::new("color", text("Color")).with_option(color, text(color)),
                    ),
            )
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(
            vec![
                tee("a", "shirts", 1, 3000, "black"),
                tee("b", "shirts", 2, 1000, "blue"),
                tee("c", "shirts", 3, 2000, "black"),
                tee("d", "shoes", 4, 500, "black"),
                Product::new("e", text("e")).with_category("shirts").created(5),
            ],
            Vec::new(),
        )
    }

    fn ids(results: &SearchResults<&Product>) -> Vec<String> {
        results.items.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_query_builder() {
        let query = ProductQuery::new()
            .with_category("shirts")
            .with_option("color", "black")
            .with_option("color", "black")
            .with_sort(SortOption::PriceLowHigh)
            .with_pagination(0, 500);

        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 100);
        assert_eq!(query.selected[&AttributeId::new("color")].len(), 1);
    }

    #[test]
    fn test_newest_first_in_category() {
        let cat = catalog();
        let results = ProductQuery::new().with_category("shirts").execute(&cat);
        assert_eq!(ids(&results), vec!["e", "c", "b", "a"]);
    }

    #[test]
    fn test_facets_come_from_unfiltered_scope() {
        let cat = catalog();
        let results = ProductQuery::new()
            .with_category("shirts")
            .with_option("color", "black")
            .execute(&cat);

        assert_eq!(ids(&results), vec!["c", "a"]);
        let color = &results.facets[0];
        assert_eq!(color.options.len(), 2);
        assert_eq!(color.option(&OptionId::new("black")).unwrap().count, 2);
        assert_eq!(color.option(&OptionId::new("blue")).unwrap().count, 1);
    }

    #[test]
    fn test_price_sorts() {
        let cat = catalog();
        let low = ProductQuery::new()
            .with_category("shirts")
            .with_sort(SortOption::PriceLowHigh)
            .execute(&cat);
        assert_eq!(ids(&low), vec!["b", "c", "a", "e"]);

        let high = ProductQuery::new()
            .with_category("shirts")
            .with_sort(SortOption::PriceHighLow)
            .execute(&cat);
        assert_eq!(ids(&high), vec!["a", "c", "b", "e"]);
    }

    #[test]
    fn test_pagination() {
        let cat = catalog();
        let results = ProductQuery::new().with_pagination(2, 2).execute(&cat);
        assert_eq!(ids(&results), vec!["c", "b"]);
        assert_eq!(results.pagination.total, 5);
        assert_eq!(results.pagination.total_pages, 3);
    }

    #[test]
    fn test_page_far_past_the_end() {
        let cat = catalog();
        let results = ProductQuery::new().with_pagination(i64::MAX, 24).execute(&cat);
        assert!(results.is_empty());
        assert_eq!(results.pagination.total, 5);
        assert!(!results.pagination.has_next);
    }

    #[test]
    fn test_sort_option_names() {
        assert_eq!(SortOption::from_str("price-high-low"), Some(SortOption::PriceHighLow));
        assert_eq!(SortOption::PriceLowHigh.as_str(), "price-low-high");
        assert_eq!(SortOption::from_str("rating"), None);
    }
}
