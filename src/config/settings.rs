use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::expand_path;
use crate::error::Result;
use crate::quote::VatRate;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub catalogue: CatalogueSettings,
    #[serde(default)]
    pub quote: QuoteSettings,
    #[serde(default)]
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CatalogueSettings {
    pub products: String,
    pub prices: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteSettings {
    #[serde(default = "default_vat_rate")]
    pub vat_rate: f64,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            vat_rate: default_vat_rate(),
            search_limit: default_search_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_vat_rate() -> f64 {
    0.05
}

fn default_search_limit() -> usize {
    10
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Config {
    pub fn vat_rate(&self) -> Result<VatRate> {
        VatRate::from_config(self.quote.vat_rate)
    }

    pub fn products_path(&self, cfg_dir: &Path) -> PathBuf {
        resolve(&self.catalogue.products, cfg_dir)
    }

    pub fn prices_path(&self, cfg_dir: &Path) -> PathBuf {
        resolve(&self.catalogue.prices, cfg_dir)
    }

    pub fn output_dir(&self, cfg_dir: &Path) -> PathBuf {
        resolve(&self.pdf.output_dir, cfg_dir)
    }
}

/// Expand `~` and anchor relative paths at the config directory.
fn resolve(path: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(path);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuoteError;

    #[test]
    fn applies_defaults() {
        let config: Config = toml::from_str(
            r#"
            [catalogue]
            products = "products.json"
            prices = "/srv/data/prices.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.quote.search_limit, 10);
        assert_eq!(config.vat_rate().unwrap(), VatRate::standard());

        let dir = Path::new("/etc/paintquote");
        assert_eq!(config.products_path(dir), dir.join("products.json"));
        assert_eq!(config.prices_path(dir), PathBuf::from("/srv/data/prices.json"));
        assert_eq!(config.output_dir(dir), dir.join("output"));
    }

    #[test]
    fn rejects_other_vat_rates() {
        let config: Config = toml::from_str(
            r#"
            [catalogue]
            products = "p.json"
            prices = "q.json"

            [quote]
            vat_rate = 0.15
            "#,
        )
        .unwrap();
        assert!(matches!(config.vat_rate(), Err(QuoteError::UnsupportedVatRate(_))));
    }
}
