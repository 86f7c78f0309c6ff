//! Storefront configuration.
//!
//! [`ShopConfig`] is read from TOML or JSON. Every section is optional and
//! falls back to the defaults of a four-language, four-currency store.

mod layout;

pub use layout::{
    CartLayoutConfig, CheckoutConfig, CollectionLayout, DetailLayout, FeaturedCategoriesConfig,
    FeaturedProductsConfig, FilterPosition, FooterColumn, FooterConfig, HeaderConfig, HeroConfig,
    HeroKind, HomeConfig, LayoutConfig, Link, LogoPosition, NewsletterConfig, NewsletterPosition,
    ProductDetailConfig, ProductListConfig, TestimonialsConfig,
};

use crate::cart::TotalsSettings;
use crate::checkout::ShippingMethod;
use crate::error::CommerceError;
use crate::i18n::LocalizedText;
use crate::money::Currency;
use crate::pricing::ConverterSettings;
use serde::{Deserialize, Serialize};
use shop_rates::{HttpRateProvider, RetryPolicy, DEFAULT_BASE_URL};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Store identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: LocalizedText,
    pub description: LocalizedText,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: LocalizedText::uniform("GlobalShop", &["en", "es", "fr", "de"]),
            description: LocalizedText::from([
                ("en", "Your global marketplace for quality products"),
                ("es", "Tu mercado global para productos de calidad"),
                ("fr", "Votre marché mondial pour des produits de qualité"),
                ("de", "Ihr globaler Marktplatz für Qualitätsprodukte"),
            ]),
        }
    }
}

/// Currency settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Currency catalog prices are stored in.
    pub base: Currency,
    /// Display currency of a new cart.
    pub default: Currency,
    pub supported: Vec<Currency>,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            base: Currency::USD,
            default: Currency::USD,
            supported: vec![Currency::USD, Currency::EUR, Currency::GBP, Currency::JPY],
        }
    }
}

/// Language settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub default: String,
    pub supported: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: "en".to_string(),
            supported: ["en", "es", "fr", "de"].map(String::from).to_vec(),
        }
    }
}

/// Exchange-rate provider and cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Age at which cached rates are refreshed.
    pub max_age_hours: u64,
    /// Attempts per fetch, including the first.
    pub retry_attempts: u32,
    pub cooldown_initial_secs: u64,
    pub cooldown_max_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            max_age_hours: 24,
            retry_attempts: 3,
            cooldown_initial_secs: 60,
            cooldown_max_secs: 60 * 60,
        }
    }
}

/// Tax and flat shipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Percent.
    pub tax_rate: f64,
    /// Base minor units.
    pub shipping_fee: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let totals = TotalsSettings::default();
        Self {
            tax_rate: totals.tax_rate,
            shipping_fee: totals.shipping_fee,
        }
    }
}

/// Storefront configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShopConfig {
    pub store: StoreConfig,
    pub currency: CurrencyConfig,
    pub languages: LanguageConfig,
    pub rates: RatesConfig,
    pub pricing: PricingConfig,
    pub shipping_methods: Option<Vec<ShippingMethod>>,
    /// Layout per language code.
    pub layouts: BTreeMap<String, LayoutConfig>,
}

fn builtin_layout() -> &'static LayoutConfig {
    static LAYOUT: OnceLock<LayoutConfig> = OnceLock::new();
    LAYOUT.get_or_init(LayoutConfig::default)
}

impl ShopConfig {
    /// Load config from a file; `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CommerceError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        tracing::debug!(path = %path.display(), "loaded shop config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, CommerceError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, CommerceError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| CommerceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, CommerceError> {
        toml::to_string_pretty(self).map_err(|e| CommerceError::Config(e.to_string()))
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.languages.supported.is_empty() {
            return Err(CommerceError::Config("no supported languages".to_string()));
        }
        if !self.languages.supported.contains(&self.languages.default) {
            return Err(CommerceError::Config(format!(
                "default language {} is not supported",
                self.languages.default
            )));
        }
        if !self.currency.supported.contains(&self.currency.default) {
            return Err(CommerceError::Config(format!(
                "default currency {} is not supported",
                self.currency.default
            )));
        }
        if !self.pricing.tax_rate.is_finite() || self.pricing.tax_rate < 0.0 {
            return Err(CommerceError::Config(format!(
                "invalid tax rate {}",
                self.pricing.tax_rate
            )));
        }
        if self.pricing.shipping_fee < 0 {
            return Err(CommerceError::Config("shipping fee is negative".to_string()));
        }
        Ok(())
    }

    pub fn default_language(&self) -> &str {
        &self.languages.default
    }

    pub fn is_supported_language(&self, lang: &str) -> bool {
        self.languages.supported.iter().any(|l| l == lang)
    }

    /// `lang` if supported, else the default language.
    pub fn resolve_language<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.is_supported_language(lang) {
            lang
        } else {
            &self.languages.default
        }
    }

    pub fn is_supported_currency(&self, currency: Currency) -> bool {
        self.currency.supported.contains(&currency)
    }

    /// Layout of `lang`, else of the default language, else built-in.
    pub fn layout(&self, lang: &str) -> &LayoutConfig {
        self.layouts
            .get(lang)
            .or_else(|| self.layouts.get(&self.languages.default))
            .unwrap_or_else(|| builtin_layout())
    }

    pub fn hero(&self, lang: &str) -> &HeroConfig {
        &self.layout(lang).home.hero
    }

    pub fn featured_products(&self, lang: &str) -> &FeaturedProductsConfig {
        &self.layout(lang).home.featured_products
    }

    pub fn featured_categories(&self, lang: &str) -> &FeaturedCategoriesConfig {
        &self.layout(lang).home.featured_categories
    }

    pub fn testimonials(&self, lang: &str) -> &TestimonialsConfig {
        &self.layout(lang).home.testimonials
    }

    pub fn newsletter(&self, lang: &str) -> &NewsletterConfig {
        &self.layout(lang).home.newsletter
    }

    pub fn header(&self, lang: &str) -> &HeaderConfig {
        &self.layout(lang).header
    }

    pub fn footer(&self, lang: &str) -> &FooterConfig {
        &self.layout(lang).footer
    }

    pub fn product_list(&self, lang: &str) -> &ProductListConfig {
        &self.layout(lang).product_list
    }

    pub fn product_detail(&self, lang: &str) -> &ProductDetailConfig {
        &self.layout(lang).product_detail
    }

    pub fn cart_layout(&self, lang: &str) -> &CartLayoutConfig {
        &self.layout(lang).cart
    }

    pub fn checkout(&self, lang: &str) -> &CheckoutConfig {
        &self.layout(lang).checkout
    }

    /// Configured shipping methods, or the built-in standard and express.
    pub fn shipping_methods(&self) -> Vec<ShippingMethod> {
        self.shipping_methods
            .clone()
            .unwrap_or_else(ShippingMethod::defaults)
    }

    pub fn totals_settings(&self) -> TotalsSettings {
        TotalsSettings::new(self.pricing.tax_rate, self.pricing.shipping_fee)
    }

    pub fn converter_settings(&self) -> ConverterSettings {
        ConverterSettings {
            base: self.currency.base,
            supported: self.currency.supported.clone(),
            max_age: Duration::from_secs(self.rates.max_age_hours.saturating_mul(60 * 60)),
            cooldown_initial: Duration::from_secs(self.rates.cooldown_initial_secs),
            cooldown_max: Duration::from_secs(self.rates.cooldown_max_secs),
        }
    }

    /// HTTP provider for the configured endpoint.
    pub fn rate_provider(&self) -> Result<HttpRateProvider, CommerceError> {
        let provider = HttpRateProvider::new(
            &self.rates.base_url,
            Duration::from_secs(self.rates.timeout_secs),
        )
        .map_err(|e| CommerceError::Config(e.to_string()))?;
        Ok(provider.with_retry_policy(RetryPolicy::new(self.rates.retry_attempts.max(1))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::CheckoutStep;

    #[test]
    fn test_empty_config_is_default() {
        let config = ShopConfig::from_toml("").unwrap();
        assert_eq!(config, ShopConfig::default());
        assert_eq!(config.default_language(), "en");
        assert_eq!(config.currency.supported.len(), 4);
        assert_eq!(config.totals_settings(), TotalsSettings::default());
        assert_eq!(config.shipping_methods().len(), 2);
    }

    #[test]
    fn test_toml_sections() {
        let config = ShopConfig::from_toml(
            r#"
            [currency]
            default = "EUR"
            supported = ["USD", "EUR"]

            [pricing]
            tax_rate = 20.0
            shipping_fee = 0

            [rates]
            max_age_hours = 1

            [[shipping_methods]]
            id = "pickup"
            name = { en = "Pickup" }
            price = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.currency.default, Currency::EUR);
        assert_eq!(config.totals_settings().tax_rate, 20.0);
        assert_eq!(config.converter_settings().max_age, Duration::from_secs(3600));
        assert_eq!(config.converter_settings().supported, vec![Currency::USD, Currency::EUR]);
        assert_eq!(config.shipping_methods()[0].price, 0);
        assert_eq!(config.rates.timeout_secs, 10);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            ShopConfig::from_toml("[languages]\ndefault = \"it\""),
            Err(CommerceError::Config(_))
        ));
        assert!(ShopConfig::from_toml("[currency]\ndefault = \"CHF\"").is_err());
        assert!(ShopConfig::from_toml("[pricing]\ntax_rate = -1.0").is_err());
        assert!(ShopConfig::from_toml("[currency]\ndefault = \"DOLLARS\"").is_err());
    }

    #[test]
    fn test_layout_fallback() {
        let config = ShopConfig::from_toml(
            r#"
            [layouts.en.home.hero]
            title = "Hello"

            [layouts.es.home.hero]
            title = "Hola"

            [layouts.es.checkout]
            steps = ["cart", "address", "review"]
            "#,
        )
        .unwrap();

        assert_eq!(config.hero("es").title, "Hola");
        assert_eq!(config.hero("en").title, "Hello");
        assert_eq!(config.hero("fr").title, "Hello");
        assert_eq!(config.checkout("es").steps.len(), 3);
        assert_eq!(config.checkout("de").steps, CheckoutStep::DEFAULT_SEQUENCE.to_vec());
    }

    #[test]
    fn test_builtin_layout_when_nothing_configured() {
        let config = ShopConfig::default();
        assert_eq!(config.layout("ja"), &LayoutConfig::default());
        assert_eq!(config.product_list("ja").items_per_page, 12);
    }

    #[test]
    fn test_language_resolution() {
        let config = ShopConfig::default();
        assert_eq!(config.resolve_language("fr"), "fr");
        assert_eq!(config.resolve_language("ja"), "en");
        assert!(config.is_supported_currency(Currency::JPY));
        assert!(!config.is_supported_currency(Currency::CHF));
    }

    #[test]
    fn test_json_config_and_file_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");
        std::fs::write(&path, r#"{"languages": {"default": "es"}}"#).unwrap();

        let config = ShopConfig::load(&path).unwrap();
        assert_eq!(config.default_language(), "es");
        assert!(ShopConfig::load(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_toml_output_reloads() {
        let config = ShopConfig::default();
        let rendered = config.to_toml().unwrap();
        assert_eq!(ShopConfig::from_toml(&rendered).unwrap(), config);
    }
}
