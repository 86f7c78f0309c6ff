//! Per-language page layout settings.
//!
//! Every field has a default so a language may configure only the
//! sections it changes.

use crate::checkout::CheckoutStep;
use crate::search::{ProductQuery, SortOption};
use serde::{Deserialize, Serialize};

/// Hero banner style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeroKind {
    Simple,
    #[default]
    Split,
    FullWidth,
}

/// How a collection of cards is arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollectionLayout {
    #[default]
    Grid,
    Carousel,
    List,
}

/// Home page hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub kind: HeroKind,
    pub title: String,
    pub description: String,
    pub primary_button_text: String,
    pub secondary_button_text: Option<String>,
    pub image_src: String,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub show_search_bar: bool,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            kind: HeroKind::Split,
            title: "Shop Global, Feel Local".to_string(),
            description: "Discover products from around the world, with prices in your \
                          currency and descriptions in your language."
                .to_string(),
            primary_button_text: "Shop Now".to_string(),
            secondary_button_text: Some("Browse Categories".to_string()),
            image_src: "/colorful-shopping-items.png".to_string(),
            background_color: None,
            text_color: None,
            show_search_bar: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturedProductsConfig {
    pub enabled: bool,
    pub title: String,
    pub count: usize,
    pub layout: CollectionLayout,
    pub show_prices: bool,
    pub show_ratings: bool,
    pub category_filter: Option<String>,
    pub tag_filter: Vec<String>,
}

impl Default for FeaturedProductsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Featured Products".to_string(),
            count: 8,
            layout: CollectionLayout::Grid,
            show_prices: true,
            show_ratings: true,
            category_filter: None,
            tag_filter: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturedCategoriesConfig {
    pub enabled: bool,
    pub title: String,
    pub count: usize,
    pub layout: CollectionLayout,
    pub show_images: bool,
    /// Only root categories.
    pub parent_category_only: bool,
}

impl Default for FeaturedCategoriesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Shop by Category".to_string(),
            count: 4,
            layout: CollectionLayout::Grid,
            show_images: true,
            parent_category_only: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialsConfig {
    pub enabled: bool,
    pub title: String,
    pub layout: CollectionLayout,
    pub background_color: Option<String>,
}

impl Default for TestimonialsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            title: "What Our Customers Say".to_string(),
            layout: CollectionLayout::Carousel,
            background_color: None,
        }
    }
}

/// Where the newsletter block sits on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NewsletterPosition {
    Top,
    Middle,
    #[default]
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterConfig {
    pub enabled: bool,
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub background_color: Option<String>,
    pub position: NewsletterPosition,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            title: "Subscribe to Our Newsletter".to_string(),
            description: "Get the latest updates on new products and upcoming sales".to_string(),
            button_text: "Subscribe".to_string(),
            background_color: None,
            position: NewsletterPosition::Bottom,
        }
    }
}

/// Home page sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HomeConfig {
    pub hero: HeroConfig,
    pub featured_products: FeaturedProductsConfig,
    pub featured_categories: FeaturedCategoriesConfig,
    pub testimonials: TestimonialsConfig,
    pub newsletter: NewsletterConfig,
}

/// A navigation or footer link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

impl Link {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogoPosition {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub logo_position: LogoPosition,
    pub show_search_bar: bool,
    pub show_language_selector: bool,
    pub show_currency_selector: bool,
    pub show_cart_icon: bool,
    pub show_account_icon: bool,
    pub navigation_links: Vec<Link>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            logo_position: LogoPosition::Left,
            show_search_bar: true,
            show_language_selector: true,
            show_currency_selector: true,
            show_cart_icon: true,
            show_account_icon: true,
            navigation_links: vec![
                Link::new("Products", "/products"),
                Link::new("Categories", "/categories"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FooterColumn {
    pub title: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    pub show_social_links: bool,
    pub show_language_selector: bool,
    pub show_currency_selector: bool,
    pub columns: Vec<FooterColumn>,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            show_social_links: true,
            show_language_selector: true,
            show_currency_selector: true,
            columns: vec![
                FooterColumn {
                    title: "Shop".to_string(),
                    links: vec![
                        Link::new("All Products", "/products"),
                        Link::new("Categories", "/categories"),
                    ],
                },
                FooterColumn {
                    title: "Account".to_string(),
                    links: vec![
                        Link::new("My Account", "/account"),
                        Link::new("Order History", "/account/orders"),
                        Link::new("Shopping Cart", "/cart"),
                    ],
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterPosition {
    #[default]
    Sidebar,
    Top,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductListConfig {
    pub default_sort: SortOption,
    pub items_per_page: i64,
    pub layout: CollectionLayout,
    pub show_filters: bool,
    pub filter_position: FilterPosition,
    pub show_quick_view: bool,
}

impl Default for ProductListConfig {
    fn default() -> Self {
        Self {
            default_sort: SortOption::Newest,
            items_per_page: 12,
            layout: CollectionLayout::Grid,
            show_filters: true,
            filter_position: FilterPosition::Sidebar,
            show_quick_view: true,
        }
    }
}

impl ProductListConfig {
    /// A first-page query using this listing's sort and page size.
    pub fn query(&self) -> ProductQuery {
        ProductQuery::new()
            .with_sort(self.default_sort)
            .with_pagination(1, self.items_per_page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetailLayout {
    #[default]
    Standard,
    Gallery,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDetailConfig {
    pub layout: DetailLayout,
    pub show_related_products: bool,
    pub show_reviews: bool,
    pub show_quantity_selector: bool,
    pub show_social_sharing: bool,
    pub image_zoom: bool,
}

impl Default for ProductDetailConfig {
    fn default() -> Self {
        Self {
            layout: DetailLayout::Standard,
            show_related_products: true,
            show_reviews: true,
            show_quantity_selector: true,
            show_social_sharing: true,
            image_zoom: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartLayoutConfig {
    pub show_thumbnails: bool,
    pub show_cross_sells: bool,
    pub show_save_later: bool,
}

impl Default for CartLayoutConfig {
    fn default() -> Self {
        Self {
            show_thumbnails: true,
            show_cross_sells: true,
            show_save_later: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Step sequence; `complete` is implied at the end.
    pub steps: Vec<CheckoutStep>,
    pub show_order_summary: bool,
    pub show_login_prompt: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            steps: CheckoutStep::DEFAULT_SEQUENCE.to_vec(),
            show_order_summary: true,
            show_login_prompt: true,
        }
    }
}

/// Full layout of one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LayoutConfig {
    pub home: HomeConfig,
    pub header: HeaderConfig,
    pub footer: FooterConfig,
    pub product_list: ProductListConfig,
    pub product_detail: ProductDetailConfig,
    pub cart: CartLayoutConfig,
    pub checkout: CheckoutConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_layout_uses_defaults() {
        let layout: LayoutConfig = toml::from_str(
            r#"
            [home.hero]
            kind = "full_width"
            title = "Compra Global"

            [product_list]
            default_sort = "price-low-high"
            items_per_page = 24

            [checkout]
            steps = ["cart", "payment", "review"]
            "#,
        )
        .unwrap();

        assert_eq!(layout.home.hero.kind, HeroKind::FullWidth);
        assert_eq!(layout.home.hero.title, "Compra Global");
        assert_eq!(layout.home.hero.primary_button_text, "Shop Now");
        assert_eq!(layout.product_list.default_sort, SortOption::PriceLowHigh);
        assert_eq!(layout.product_list.layout, CollectionLayout::Grid);
        assert_eq!(layout.checkout.steps.len(), 3);
        assert!(layout.checkout.show_order_summary);
        assert_eq!(layout.header, HeaderConfig::default());
    }

    #[test]
    fn test_product_list_query() {
        let config = ProductListConfig {
            default_sort: SortOption::PriceHighLow,
            items_per_page: 500,
            ..Default::default()
        };
        let query = config.query();
        assert_eq!(query.sort, SortOption::PriceHighLow);
        assert_eq!(query.per_page, 100);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_default_checkout_steps() {
        let checkout = CheckoutConfig::default();
        assert_eq!(checkout.steps.first(), Some(&CheckoutStep::Cart));
        assert_eq!(checkout.steps.last(), Some(&CheckoutStep::Review));
    }
}
