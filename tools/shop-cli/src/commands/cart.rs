//! Cart and totals commands.

use anyhow::{anyhow, Context as _, Result};
use shop_commerce::cart::CartTotals;
use shop_commerce::checkout::{find_shipping_method, ShippingMethod};
use shop_commerce::{Currency, ProductId, ShippingMethodId, Storefront, VariationId};

use super::{CartArgs, CartCommand, TotalsArgs};
use crate::context::Context;

pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => show_cart(ctx).await,
        CartCommand::Add {
            product,
            variation,
            quantity,
        } => add_item(&product, &variation, quantity, ctx).await,
        CartCommand::Update {
            product,
            variation,
            quantity,
        } => update_item(&product, &variation, quantity, ctx).await,
        CartCommand::Remove { product, variation } => remove_item(&product, &variation, ctx).await,
        CartCommand::Clear => clear_cart(ctx).await,
        CartCommand::Currency { code } => set_currency(&code, ctx).await,
    }
}

pub async fn totals(args: TotalsArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront()?;
    let totals = match args.shipping.as_deref() {
        Some(id) => {
            let method = shipping_method(&shop, id)?;
            shop.totals_with_shipping(&method).await?
        }
        None => shop.totals().await?,
    };

    if ctx.output.is_json() {
        ctx.output.json(&totals);
        return Ok(());
    }

    ctx.output.header("Cart totals");
    print_totals(&shop, &totals, ctx);
    Ok(())
}

async fn show_cart(ctx: &Context) -> Result<()> {
    let shop = ctx.storefront()?;

    if ctx.output.is_json() {
        ctx.output.json(&shop.cart().to_state());
        return Ok(());
    }

    ctx.output.header(&format!("Cart ({})", shop.currency()));
    if shop.cart().is_empty() {
        ctx.output.info("Cart is empty");
        return Ok(());
    }

    let totals = shop.totals().await?;
    let lang = shop.language();
    let default_lang = shop.config().default_language();
    for line in &totals.lines {
        let name = shop
            .catalog()
            .product(&line.product_id)
            .map(|p| p.name.resolve(lang, default_lang))
            .unwrap_or(line.product_id.as_str());
        ctx.output.list_item(&format!(
            "{} x{}  {}  {}",
            name,
            line.quantity,
            line.variation_id,
            shop.format(line.total)
        ));
    }
    print_totals(&shop, &totals, ctx);
    Ok(())
}

async fn add_item(product: &str, variation: &str, quantity: i64, ctx: &Context) -> Result<()> {
    let mut shop = ctx.storefront()?;
    shop.add_to_cart(ProductId::new(product), VariationId::new(variation), quantity)
        .with_context(|| format!("Failed to add {}/{}", product, variation))?;

    ctx.output.success(&format!(
        "Added {} x {}/{} ({} items in cart)",
        quantity,
        product,
        variation,
        shop.cart().item_count()
    ));
    Ok(())
}

async fn update_item(product: &str, variation: &str, quantity: i64, ctx: &Context) -> Result<()> {
    let mut shop = ctx.storefront()?;
    let touched = shop.update_quantity(
        &ProductId::new(product),
        &VariationId::new(variation),
        quantity,
    )?;

    if !touched {
        ctx.output
            .warn(&format!("{}/{} is not in the cart", product, variation));
    } else if quantity <= 0 {
        ctx.output
            .success(&format!("Removed {}/{}", product, variation));
    } else {
        ctx.output.success(&format!(
            "Set {}/{} to {}",
            product, variation, quantity
        ));
    }
    Ok(())
}

async fn remove_item(product: &str, variation: &str, ctx: &Context) -> Result<()> {
    let mut shop = ctx.storefront()?;
    if shop.remove_from_cart(&ProductId::new(product), &VariationId::new(variation))? {
        ctx.output
            .success(&format!("Removed {}/{}", product, variation));
    } else {
        ctx.output
            .warn(&format!("{}/{} is not in the cart", product, variation));
    }
    Ok(())
}

async fn clear_cart(ctx: &Context) -> Result<()> {
    let mut shop = ctx.storefront()?;
    shop.clear_cart()?;
    ctx.output.success("Cart cleared");
    Ok(())
}

async fn set_currency(code: &str, ctx: &Context) -> Result<()> {
    let currency: Currency = code.parse()?;
    let mut shop = ctx.storefront()?;
    shop.set_currency(currency).with_context(|| {
        let supported: Vec<String> = shop
            .config()
            .currency
            .supported
            .iter()
            .map(Currency::to_string)
            .collect();
        format!("Supported currencies: {}", supported.join(", "))
    })?;
    ctx.output
        .success(&format!("Display currency set to {}", currency));
    Ok(())
}

pub(crate) fn shipping_method(shop: &Storefront, id: &str) -> Result<ShippingMethod> {
    let methods = shop.config().shipping_methods();
    find_shipping_method(&methods, &ShippingMethodId::new(id))
        .cloned()
        .ok_or_else(|| {
            let known: Vec<&str> = methods.iter().map(|m| m.id.as_str()).collect();
            anyhow!("Unknown shipping method '{}' (known: {})", id, known.join(", "))
        })
}

pub(crate) fn print_totals(shop: &Storefront, totals: &CartTotals, ctx: &Context) {
    ctx.output.kv("Subtotal", &shop.format(totals.subtotal));
    ctx.output.kv("Tax", &shop.format(totals.tax));
    ctx.output.kv("Shipping", &shop.format(totals.shipping));
    ctx.output.kv("Total", &totals.total_money().display());

    for skipped in &totals.skipped {
        ctx.output.warn(&format!(
            "Skipped {}/{}: {}",
            skipped.product_id, skipped.variation_id, skipped.reason
        ));
    }
    if totals.used_fallback {
        ctx.output.warn(&format!(
            "Exchange rates unavailable; amounts shown in {} are unconverted",
            totals.currency
        ));
    }
}
