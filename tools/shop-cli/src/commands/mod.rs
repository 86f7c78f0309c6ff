//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod layout;
pub mod rates;

use clap::{Args, Subcommand, ValueEnum};

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    /// Restrict to a category id.
    #[arg(long)]
    pub category: Option<String>,

    /// Facet selection as attribute=option (repeatable).
    #[arg(short = 'f', long = "filter", value_name = "ATTR=OPTION")]
    pub filters: Vec<String>,

    /// Sort order (newest, price-low-high, price-high-low).
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Page number, starting at 1.
    #[arg(short, long, default_value_t = 1)]
    pub page: i64,

    /// Products per page (default: from the layout).
    #[arg(long)]
    pub per_page: Option<i64>,

    /// Print the facets of the result set.
    #[arg(long)]
    pub facets: bool,
}

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    /// Product slug in the display language.
    pub slug: String,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show cart contents.
    Show,
    /// Add a variation to the cart.
    Add {
        /// Product id.
        product: String,
        /// Variation id.
        variation: String,
        /// Quantity to add.
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set a line's quantity (0 removes it).
    Update {
        /// Product id.
        product: String,
        /// Variation id.
        variation: String,
        /// New quantity.
        quantity: i64,
    },
    /// Remove a line.
    Remove {
        /// Product id.
        product: String,
        /// Variation id.
        variation: String,
    },
    /// Empty the cart.
    Clear,
    /// Switch the display currency.
    Currency {
        /// ISO currency code.
        code: String,
    },
}

/// Arguments for the totals command.
#[derive(Args)]
pub struct TotalsArgs {
    /// Shipping method id (default: the flat configured fee).
    #[arg(short, long)]
    pub shipping: Option<String>,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Buyer's user id.
    #[arg(long)]
    pub user: String,

    /// Buyer's email.
    #[arg(long)]
    pub email: String,

    /// Recipient name.
    #[arg(long)]
    pub name: String,

    /// Street address.
    #[arg(long)]
    pub line1: String,

    /// City.
    #[arg(long)]
    pub city: String,

    /// Postal code.
    #[arg(long)]
    pub postal_code: String,

    /// Country code.
    #[arg(long)]
    pub country: String,

    /// Shipping method id.
    #[arg(long, default_value = "standard")]
    pub shipping: String,

    /// Payment method.
    #[arg(long, default_value = "card")]
    pub payment: String,

    /// Keep the cart after the order is placed.
    #[arg(long)]
    pub keep_cart: bool,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    /// Buyer's user id.
    #[arg(long)]
    pub user: String,
}

/// Arguments for the rates command.
#[derive(Args)]
pub struct RatesArgs {
    #[command(subcommand)]
    pub command: Option<RatesCommand>,
}

#[derive(Subcommand)]
pub enum RatesCommand {
    /// Show current rates, refreshing stale ones.
    Show,
    /// Fetch fresh rates from the provider.
    Refresh,
    /// List currencies the provider knows.
    Currencies,
}

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Amount in base-currency minor units.
    pub amount: i64,

    /// Target currency code.
    pub currency: String,

    /// Fail instead of falling back to the base amount.
    #[arg(long)]
    pub strict: bool,
}

/// Layout section selector.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LayoutSection {
    Hero,
    FeaturedProducts,
    FeaturedCategories,
    Testimonials,
    Newsletter,
    Header,
    Footer,
    ProductList,
    ProductDetail,
    Cart,
    Checkout,
}

/// Arguments for the layout command.
#[derive(Args)]
pub struct LayoutArgs {
    /// Only this section.
    #[arg(value_enum)]
    pub section: Option<LayoutSection>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Write a default shop.toml.
    Init {
        /// Overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration.
    Validate,
}
