//! Search module.
//!
//! Contains attribute facets, the product listing query, and pagination.

mod facets;
mod query;
mod results;

pub use facets::{
    apply_facets, build_facets, product_matches, variation_matches, AttributeFilter, FacetOption,
    FacetSelection,
};
pub use query::{ProductQuery, SortOption};
pub use results::{Pagination, SearchResults};
