//! Config command implementation.

use std::fs;

use anyhow::{bail, Context as _, Result};
use shop_commerce::catalog::CatalogStore;
use shop_commerce::config::ShopConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(ctx.config.as_ref());
        return Ok(());
    }

    ctx.output.header("Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("Config file", &path.display().to_string()),
        None => ctx.output.kv("Config file", "(none, using defaults)"),
    }
    ctx.output
        .kv("Data dir", &ctx.data_dir().display().to_string());
    println!();
    println!("{}", ctx.config.to_toml()?);
    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.resolve_path("shop.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let content = ShopConfig::default().to_toml()?;
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));
    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors = Vec::new();
    if let Err(e) = ctx.config.validate() {
        errors.push(e.to_string());
    }
    let mut warnings = config_warnings(&ctx.config);

    match ctx.catalog() {
        Ok(catalog) => {
            if catalog.is_empty() {
                warnings.push("catalog has no products".to_string());
            }
            for product in catalog.products() {
                for category in &product.category_ids {
                    if catalog.category(category).is_none() {
                        warnings.push(format!(
                            "product {} references unknown category {}",
                            product.id, category
                        ));
                    }
                }
            }
        }
        Err(e) => errors.push(format!("{:#}", e)),
    }

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors,
            "warnings": warnings,
        }));
    } else {
        for warning in &warnings {
            ctx.output.warn(warning);
        }
        for error in &errors {
            ctx.output.error(error);
        }
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid");
    Ok(())
}

/// Settings that load but are probably mistakes.
fn config_warnings(config: &ShopConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.is_supported_currency(config.currency.base) {
        warnings.push(format!(
            "base currency {} is not in currency.supported",
            config.currency.base
        ));
    }
    for lang in config.layouts.keys() {
        if !config.is_supported_language(lang) {
            warnings.push(format!("layout for unsupported language '{}'", lang));
        }
    }
    for lang in &config.languages.supported {
        if config.store.name.get(lang).is_none() {
            warnings.push(format!("store.name has no '{}' translation", lang));
        }
    }
    if config.rates.retry_attempts == 0 {
        warnings.push("rates.retry_attempts is 0; one attempt will be made".to_string());
    }

    warnings
}
