//! Product catalog module.
//!
//! Contains types for products, variations, attributes and categories, and
//! the read-only catalog store.

mod category;
mod product;
mod store;

pub use category::{ancestor_chain, child_categories, root_categories, Category};
pub use product::{Attribute, AttributeOption, Product, ProductTag, Variation};
pub use store::{CatalogDocument, CatalogStore, InMemoryCatalog};
