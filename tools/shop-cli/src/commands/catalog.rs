//! Catalog browsing commands.

use anyhow::{anyhow, bail, Result};
use shop_commerce::catalog::Product;
use shop_commerce::search::{AttributeFilter, SortOption};
use shop_commerce::Storefront;

use super::{ProductArgs, ProductsArgs};
use crate::context::Context;

pub async fn products(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront()?;

    let mut query = shop.query();
    if let Some(category) = args.category {
        query = query.with_category(category);
    }
    for filter in &args.filters {
        let (attribute, option) = parse_filter(filter)?;
        query = query.with_option(attribute, option);
    }
    if let Some(sort) = args.sort.as_deref() {
        let sort = SortOption::from_str(sort).ok_or_else(|| anyhow!("Unknown sort: {}", sort))?;
        query = query.with_sort(sort);
    }
    let per_page = args.per_page.unwrap_or(query.per_page);
    query = query.with_pagination(args.page, per_page);

    let results = shop.search(&query);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "query": query,
            "items": results.items,
            "pagination": results.pagination,
            "facets": results.facets,
        }));
        return Ok(());
    }

    ctx.output.header(&format!(
        "Products ({} of {}, sorted by {})",
        results.len(),
        results.pagination.total,
        query.sort.display_name()
    ));
    if results.is_empty() {
        ctx.output.info("No products match");
    }
    for product in &results.items {
        let price = match product.lowest_price() {
            Some(amount) => format!("from {}", shop.format(shop.price(amount).await.amount())),
            None => "unavailable".to_string(),
        };
        ctx.output.table_row(
            &[product.id.as_str(), product_name(&shop, product), &price],
            &[16, 32, 16],
        );
    }
    let pagination = &results.pagination;
    ctx.output.kv(
        "Page",
        &format!("{} of {}", pagination.page, pagination.total_pages.max(1)),
    );

    if args.facets {
        print_facets(&shop, &results.facets, ctx);
    }

    Ok(())
}

pub async fn product(args: ProductArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront()?;
    let product = shop
        .product_by_slug(&args.slug)
        .ok_or_else(|| anyhow!("No product with slug '{}' in '{}'", args.slug, shop.language()))?;

    if ctx.output.is_json() {
        ctx.output.json(product);
        return Ok(());
    }

    let lang = shop.language();
    let default_lang = shop.config().default_language();
    ctx.output.header(product_name(&shop, product));
    ctx.output.kv("Id", product.id.as_str());
    let description = product.description.resolve(lang, default_lang);
    if !description.is_empty() {
        ctx.output.kv("Description", description);
    }

    for variation in &product.variations {
        let conversion = shop.price(variation.price).await;
        let mut line = format!("{}  {}", variation.id, shop.format(conversion.amount()));
        if let Some(compare_at) = variation.compare_at_price.filter(|_| variation.is_on_sale()) {
            let compare_at = shop.price(compare_at).await.amount();
            line.push_str(&format!(" (was {})", shop.format(compare_at)));
        }
        let options: Vec<String> = variation
            .attributes
            .iter()
            .map(|attribute| {
                let values: Vec<&str> = attribute
                    .options
                    .iter()
                    .map(|o| o.name.resolve(lang, default_lang))
                    .collect();
                format!(
                    "{}: {}",
                    attribute.name.resolve(lang, default_lang),
                    values.join("/")
                )
            })
            .collect();
        if !options.is_empty() {
            line.push_str(&format!("  [{}]", options.join(", ")));
        }
        if !variation.is_purchasable() {
            line.push_str("  (unavailable)");
        }
        ctx.output.list_item(&line);
        if conversion.is_fallback() {
            ctx.output
                .warn("Showing base-currency prices; exchange rates are unavailable");
            break;
        }
    }

    Ok(())
}

fn print_facets(shop: &Storefront, facets: &[AttributeFilter], ctx: &Context) {
    let lang = shop.language();
    let default_lang = shop.config().default_language();
    ctx.output.header("Filters");
    for facet in facets {
        ctx.output.info(&format!(
            "{} ({})",
            facet.attribute_name.resolve(lang, default_lang),
            facet.attribute_id
        ));
        for option in &facet.options {
            ctx.output.list_item(&format!(
                "{}={}  {} ({})",
                facet.attribute_id,
                option.id,
                option.name.resolve(lang, default_lang),
                option.count
            ));
        }
        if facet.has_conflicts() {
            ctx.output.warn(&format!(
                "Attribute '{}' is named differently across products",
                facet.attribute_id
            ));
        }
    }
}

fn product_name<'a>(shop: &Storefront, product: &'a Product) -> &'a str {
    product
        .name
        .resolve(shop.language(), shop.config().default_language())
}

/// Split `attribute=option`.
fn parse_filter(filter: &str) -> Result<(&str, &str)> {
    match filter.split_once('=') {
        Some((attribute, option)) if !attribute.is_empty() && !option.is_empty() => {
            Ok((attribute.trim(), option.trim()))
        }
        _ => bail!("Invalid filter '{}', expected attribute=option", filter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("color=black").unwrap(), ("color", "black"));
        assert_eq!(parse_filter("size = m").unwrap(), ("size", "m"));
        assert!(parse_filter("color").is_err());
        assert!(parse_filter("=black").is_err());
        assert!(parse_filter("color=").is_err());
    }
}
