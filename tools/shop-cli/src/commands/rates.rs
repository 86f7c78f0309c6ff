//! Exchange-rate commands.

use anyhow::{Context as _, Result};
use shop_commerce::pricing::{format_price, Conversion};
use shop_commerce::Currency;
use shop_rates::ExchangeRates;

use super::{ConvertArgs, RatesArgs, RatesCommand};
use crate::context::Context;
use crate::output::format_age;

pub async fn run(args: RatesArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(RatesCommand::Show) {
        RatesCommand::Show => show_rates(ctx).await,
        RatesCommand::Refresh => refresh_rates(ctx).await,
        RatesCommand::Currencies => list_currencies(ctx).await,
    }
}

async fn show_rates(ctx: &Context) -> Result<()> {
    let cache = ctx.cache()?;
    let converter = ctx.converter(&cache)?;

    let spinner = ctx.output.spinner("Loading exchange rates...");
    let rates = converter.get_rates().await;
    spinner.finish_and_clear();
    let rates = rates.context("Exchange rates unavailable")?;

    print_rates(&rates, ctx);
    Ok(())
}

async fn refresh_rates(ctx: &Context) -> Result<()> {
    let cache = ctx.cache()?;
    let converter = ctx.converter(&cache)?;

    let spinner = ctx
        .output
        .spinner(&format!("Fetching rates from {}...", ctx.config.rates.base_url));
    let rates = converter.refresh().await;
    spinner.finish_and_clear();
    let rates = rates.context("Failed to refresh exchange rates")?;

    ctx.output
        .success(&format!("Refreshed {} rates", rates.rates.len()));
    print_rates(&rates, ctx);
    Ok(())
}

async fn list_currencies(ctx: &Context) -> Result<()> {
    let cache = ctx.cache()?;
    let converter = ctx.converter(&cache)?;

    let spinner = ctx.output.spinner("Fetching currency list...");
    let listing = converter.available_currencies().await;
    spinner.finish_and_clear();
    let listing = listing.context("Failed to list currencies")?;

    if ctx.output.is_json() {
        ctx.output.json(&listing);
        return Ok(());
    }

    ctx.output.header(&format!("Currencies ({})", listing.len()));
    for (code, name) in &listing {
        let supported = code
            .parse::<Currency>()
            .map(|c| ctx.config.is_supported_currency(c))
            .unwrap_or(false);
        let marker = if supported { " (supported)" } else { "" };
        ctx.output
            .list_item(&format!("{}  {}{}", code.to_uppercase(), name, marker));
    }
    Ok(())
}

fn print_rates(rates: &ExchangeRates, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(rates);
        return;
    }

    let age = chrono::Utc::now().timestamp_millis() - rates.last_updated;
    ctx.output.header(&format!("Exchange rates (base {})", rates.base));
    ctx.output.kv("Updated", &format!("{} ago", format_age(age)));
    for (code, rate) in &rates.rates {
        ctx.output.table_row(&[code, &format!("{:.6}", rate)], &[6, 14]);
    }
}

pub async fn convert(args: ConvertArgs, ctx: &Context) -> Result<()> {
    let target: Currency = args.currency.parse()?;
    let cache = ctx.cache()?;
    let converter = ctx.converter(&cache)?;
    let base = converter.base();

    let conversion = if args.strict {
        let amount = converter
            .try_convert(args.amount, target)
            .await
            .with_context(|| format!("Cannot convert to {}", target))?;
        let rate = converter
            .cached_rates()
            .await
            .and_then(|rates| rates.rate(target.code()));
        match rate {
            Some(rate) if target != base => Conversion::Converted { amount, rate },
            _ => Conversion::Unchanged { amount },
        }
    } else {
        converter.convert(args.amount, target).await
    };

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "from": { "amount": args.amount, "currency": base },
            "to": { "amount": conversion.amount(), "currency": target },
            "fallback": conversion.is_fallback(),
        }));
        return Ok(());
    }

    let from = format_price(args.amount, base);
    match &conversion {
        Conversion::Unchanged { amount } => {
            ctx.output.info(&format!("{} = {}", from, format_price(*amount, target)))
        }
        Conversion::Converted { amount, rate } => ctx.output.info(&format!(
            "{} = {} (rate {:.6})",
            from,
            format_price(*amount, target),
            rate
        )),
        Conversion::Fallback { amount, reason } => {
            ctx.output.warn(&format!("Conversion failed: {}", reason));
            ctx.output
                .info(&format!("{} (unconverted {})", format_price(*amount, base), target));
        }
    }
    Ok(())
}
