//! Shop CLI - Command line driver for the GlobalShop storefront.
//!
//! Commands:
//! - `shop products` - Browse the catalog with facets
//! - `shop product` - Show one product by slug
//! - `shop cart` - Manage the persisted cart
//! - `shop totals` - Price the cart in its display currency
//! - `shop checkout` - Run a checkout against the local payment gateway
//! - `shop orders` - List orders placed from this data directory
//! - `shop rates` - Inspect and refresh exchange rates
//! - `shop convert` - Convert a base-currency amount
//! - `shop layout` - Show the resolved layout for a language
//! - `shop config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    CartArgs, CheckoutArgs, ConfigArgs, ConvertArgs, LayoutArgs, OrdersArgs, ProductArgs,
    ProductsArgs, RatesArgs, TotalsArgs,
};
use context::ContextOptions;

/// Shop CLI - Browse, price and check out against a GlobalShop catalog
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log progress (info level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log everything (debug level)
    #[arg(long, global = true)]
    debug: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Catalog document path
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Directory holding the cart, rates and orders
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Display language
    #[arg(short, long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products with facet filters
    Products(ProductsArgs),

    /// Show a product by slug
    Product(ProductArgs),

    /// Manage the cart
    Cart(CartArgs),

    /// Show cart totals
    Totals(TotalsArgs),

    /// Check out the cart
    Checkout(CheckoutArgs),

    /// List placed orders
    Orders(OrdersArgs),

    /// Inspect and refresh exchange rates
    Rates(RatesArgs),

    /// Convert an amount from the base currency
    Convert(ConvertArgs),

    /// Show the storefront layout
    Layout(LayoutArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool, debug: bool) {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.debug);

    // Setup output formatting
    let output = output::Output::new(cli.verbose || cli.debug, cli.json);

    let options = ContextOptions {
        config: cli.config,
        catalog: cli.catalog,
        data_dir: cli.data_dir,
        lang: cli.lang,
    };
    let ctx = match context::Context::load(options, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Products(args) => commands::catalog::products(args, &ctx).await,
        Commands::Product(args) => commands::catalog::product(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Totals(args) => commands::cart::totals(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Orders(args) => commands::checkout::orders(args, &ctx).await,
        Commands::Rates(args) => commands::rates::run(args, &ctx).await,
        Commands::Convert(args) => commands::rates::convert(args, &ctx).await,
        Commands::Layout(args) => commands::layout::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
