//! Product and variation types.

use crate::clock::current_timestamp;
use crate::i18n::LocalizedText;
use crate::ids::{AttributeId, CategoryId, OptionId, ProductId, TagId, VariationId};
use crate::money::round_half_up;
use serde::{Deserialize, Serialize};

/// A selectable value of an attribute (e.g., "black" for "color").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeOption {
    pub id: OptionId,
    pub name: LocalizedText,
}

/// An attribute exposed by a variation.
///
/// Attribute ids are stable keys ("color", "size") shared across the
/// catalog so facets can be aggregated across products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: LocalizedText,
    #[serde(default)]
    pub options: Vec<AttributeOption>,
}

impl Attribute {
    /// Create an attribute with no options.
    pub fn new(id: impl Into<AttributeId>, name: LocalizedText) -> Self {
        Self {
            id: id.into(),
            name,
            options: Vec::new(),
        }
    }

    /// Add an option.
    pub fn with_option(mut self, id: impl Into<OptionId>, name: LocalizedText) -> Self {
        self.options.push(AttributeOption {
            id: id.into(),
            name,
        });
        self
    }

    /// Check whether this attribute carries `option`.
    pub fn has_option(&self, option: &OptionId) -> bool {
        self.options.iter().any(|o| &o.id == option)
    }
}

/// A product tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductTag {
    pub id: TagId,
    pub name: LocalizedText,
}

/// A purchasable variation of a product. All prices live here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    /// Unique variation identifier.
    pub id: VariationId,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    /// Variation slug (not translated).
    #[serde(default)]
    pub slug: String,
    /// Price in base-currency minor units.
    pub price: i64,
    /// Previous price, shown struck through.
    #[serde(default)]
    pub compare_at_price: Option<i64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub sku: String,
    /// Units in stock.
    #[serde(default)]
    pub inventory: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Variation {
    /// Create an active variation with no stock.
    pub fn new(id: impl Into<VariationId>, price: i64) -> Self {
        let now = current_timestamp();
        Self {
            id: id.into(),
            name: LocalizedText::new(),
            description: LocalizedText::new(),
            slug: String::new(),
            price,
            compare_at_price: None,
            images: Vec::new(),
            weight: 0.0,
            sku: String::new(),
            inventory: 0,
            is_active: true,
            attributes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the stock level.
    pub fn with_inventory(mut self, inventory: u32) -> Self {
        self.inventory = inventory;
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Set the compare-at price.
    pub fn with_compare_at(mut self, price: i64) -> Self {
        self.compare_at_price = Some(price);
        self
    }

    /// Set the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// Active and in stock.
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.inventory > 0
    }

    /// The attribute with `id`, if this variation exposes it.
    pub fn attribute(&self, id: &AttributeId) -> Option<&Attribute> {
        self.attributes.iter().find(|a| &a.id == id)
    }

    /// Whether the compare-at price is above the current price.
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price.is_some_and(|c| c > self.price)
    }

    /// `compare_at_price - price`. Negative when the price went up.
    pub fn compare_at_delta(&self) -> Option<i64> {
        self.compare_at_price.map(|c| c - self.price)
    }

    /// Whole-percent discount relative to the compare-at price.
    pub fn discount_percent(&self) -> Option<i64> {
        match self.compare_at_price {
            Some(c) if c > self.price && c > 0 => {
                Some(round_half_up((c - self.price) as f64 * 100.0 / c as f64))
            }
            _ => None,
        }
    }

    /// First image, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A product in the catalog.
///
/// A product has no price of its own; see [`Variation`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    /// Per-language URL slug.
    #[serde(default)]
    pub slug: LocalizedText,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub tags: Vec<ProductTag>,
    /// Variations in display order.
    #[serde(default)]
    pub variations: Vec<Variation>,
    /// Epoch millis of creation.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Product {
    /// Create a product with no variations.
    pub fn new(id: impl Into<ProductId>, name: LocalizedText) -> Self {
        let now = current_timestamp();
        Self {
            id: id.into(),
            name,
            description: LocalizedText::new(),
            slug: LocalizedText::new(),
            category_ids: Vec::new(),
            tags: Vec::new(),
            variations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a variation.
    pub fn with_variation(mut self, variation: Variation) -> Self {
        self.variations.push(variation);
        self
    }

    /// Add a category.
    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category_ids.push(category.into());
        self
    }

    /// Set the slug.
    pub fn with_slug(mut self, slug: LocalizedText) -> Self {
        self.slug = slug;
        self
    }

    /// Set the creation time.
    pub fn created(mut self, at: i64) -> Self {
        self.created_at = at;
        self
    }

    /// Look up a variation by id.
    pub fn variation(&self, id: &VariationId) -> Option<&Variation> {
        self.variations.iter().find(|v| &v.id == id)
    }

    /// Variations that are active and in stock.
    pub fn purchasable_variations(&self) -> impl Iterator<Item = &Variation> {
        self.variations.iter().filter(|v| v.is_purchasable())
    }

    /// Whether any variation can be bought.
    pub fn is_available(&self) -> bool {
        self.variations.iter().any(Variation::is_purchasable)
    }

    /// Lowest price among purchasable variations.
    pub fn lowest_price(&self) -> Option<i64> {
        self.purchasable_variations().map(|v| v.price).min()
    }

    /// Check if product is in a category.
    pub fn in_category(&self, category: &CategoryId) -> bool {
        self.category_ids.contains(category)
    }

    /// First image of the first variation that has one.
    pub fn primary_image(&self) -> Option<&str> {
        self.variations.iter().find_map(Variation::primary_image)
    }
}
