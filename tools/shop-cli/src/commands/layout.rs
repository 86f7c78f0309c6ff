//! Layout inspection.

use anyhow::Result;
use serde::Serialize;

use super::{LayoutArgs, LayoutSection};
use crate::context::Context;

pub async fn run(args: LayoutArgs, ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let lang = ctx.lang.as_str();

    if !config.layouts.contains_key(lang) {
        ctx.output.debug(&format!(
            "No layout for '{}', falling back to the default layout",
            lang
        ));
    }

    let Some(section) = args.section else {
        return print_section("layout", config.layout(lang), ctx);
    };

    match section {
        LayoutSection::Hero => print_section("hero", config.hero(lang), ctx),
        LayoutSection::FeaturedProducts => {
            print_section("featured_products", config.featured_products(lang), ctx)
        }
        LayoutSection::FeaturedCategories => {
            print_section("featured_categories", config.featured_categories(lang), ctx)
        }
        LayoutSection::Testimonials => {
            print_section("testimonials", config.testimonials(lang), ctx)
        }
        LayoutSection::Newsletter => print_section("newsletter", config.newsletter(lang), ctx),
        LayoutSection::Header => print_section("header", config.header(lang), ctx),
        LayoutSection::Footer => print_section("footer", config.footer(lang), ctx),
        LayoutSection::ProductList => {
            print_section("product_list", config.product_list(lang), ctx)
        }
        LayoutSection::ProductDetail => {
            print_section("product_detail", config.product_detail(lang), ctx)
        }
        LayoutSection::Cart => print_section("cart", config.cart_layout(lang), ctx),
        LayoutSection::Checkout => print_section("checkout", config.checkout(lang), ctx),
    }
}

fn print_section<T: Serialize>(name: &str, section: &T, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(section);
        return Ok(());
    }

    ctx.output.header(&format!("{} ({})", name, ctx.lang));
    // TOML needs a table at the top level.
    let mut table = toml::Table::new();
    table.insert(name.to_string(), toml::Value::try_from(section)?);
    println!("{}", toml::to_string_pretty(&table)?);
    Ok(())
}
