//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shop_cache::Cache;
use shop_commerce::catalog::{CatalogStore, InMemoryCatalog};
use shop_commerce::config::ShopConfig;
use shop_commerce::pricing::CurrencyConverter;
use shop_commerce::Storefront;

use crate::output::Output;

/// Config file names searched from the working directory upward.
const CONFIG_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// Global flags that shape the context.
#[derive(Debug, Default)]
pub struct ContextOptions {
    pub config: Option<String>,
    pub catalog: Option<String>,
    pub data_dir: Option<String>,
    pub lang: Option<String>,
}

/// Execution context for CLI commands.
pub struct Context {
    /// Store configuration.
    pub config: Arc<ShopConfig>,
    /// Where the configuration was read from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Resolved display language.
    pub lang: String,
    catalog_path: PathBuf,
    data_dir: PathBuf,
}

impl Context {
    /// Load context from the config file.
    pub fn load(options: ContextOptions, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match options.config.as_deref() {
            Some(path) => Some(resolve(&cwd, path)),
            None => find_config(&cwd),
        };
        let config = match &config_path {
            Some(path) => {
                output.debug(&format!("Using config {}", path.display()));
                ShopConfig::load(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?
            }
            None => ShopConfig::default(),
        };

        // Relative defaults live next to the config file.
        let root = config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());
        let catalog_path = match options.catalog.as_deref() {
            Some(path) => resolve(&cwd, path),
            None => root.join("catalog.json"),
        };
        let data_dir = match options.data_dir.as_deref() {
            Some(path) => resolve(&cwd, path),
            None => root.join(".shop"),
        };

        let lang = match options.lang.as_deref() {
            Some(requested) => {
                if !config.is_supported_language(requested) {
                    output.warn(&format!(
                        "Language '{}' is not supported, using '{}'",
                        requested,
                        config.default_language()
                    ));
                }
                config.resolve_language(requested).to_string()
            }
            None => config.default_language().to_string(),
        };

        Ok(Self {
            config: Arc::new(config),
            config_path,
            output,
            cwd,
            lang,
            catalog_path,
            data_dir,
        })
    }

    /// Directory holding persisted state.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Open the key-value cache in the data directory.
    pub fn cache(&self) -> Result<Cache> {
        Cache::open(&self.data_dir)
            .with_context(|| format!("Failed to open data dir {}", self.data_dir.display()))
    }

    /// Build a converter backed by the configured rate provider.
    pub fn converter(&self, cache: &Cache) -> Result<Arc<CurrencyConverter>> {
        let provider = self
            .config
            .rate_provider()
            .context("Failed to create rate provider")?;
        Ok(Arc::new(CurrencyConverter::new(
            Arc::new(provider),
            cache.clone(),
            self.config.converter_settings(),
        )))
    }

    /// Load the catalog document.
    pub fn catalog(&self) -> Result<Arc<InMemoryCatalog>> {
        let catalog = InMemoryCatalog::load(&self.catalog_path).with_context(|| {
            format!("Failed to load catalog {}", self.catalog_path.display())
        })?;
        self.output.debug(&format!(
            "Loaded {} products from {}",
            catalog.len(),
            self.catalog_path.display()
        ));
        Ok(Arc::new(catalog))
    }

    /// Open a storefront session in the context's language.
    pub fn storefront(&self) -> Result<Storefront> {
        let cache = self.cache()?;
        let converter = self.converter(&cache)?;
        let catalog: Arc<dyn CatalogStore> = self.catalog()?;
        let mut shop = Storefront::open(self.config.clone(), cache, converter, catalog)
            .context("Failed to open storefront")?;
        shop.set_language(&self.lang);
        Ok(shop)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve(&self.cwd, path)
    }
}

fn resolve(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

/// Find a config file in the directory tree.
fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".shop.toml"), "").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, dir.path().join(".shop.toml"));
    }

    #[test]
    fn test_find_config_prefers_shop_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shop.json"), "{}").unwrap();
        std::fs::write(dir.path().join("shop.toml"), "").unwrap();

        assert_eq!(find_config(dir.path()).unwrap(), dir.path().join("shop.toml"));
    }

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let cwd = Path::new("/work");
        assert_eq!(resolve(cwd, "catalog.json"), PathBuf::from("/work/catalog.json"));
        assert_eq!(resolve(cwd, "/data/catalog.json"), PathBuf::from("/data/catalog.json"));
    }
}
