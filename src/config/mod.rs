mod draft;
mod settings;

pub use draft::{Draft, DraftLine};
pub use settings::{CatalogueSettings, Config, PdfSettings, QuoteSettings};

use crate::catalogue::Catalogue;
use crate::error::{QuoteError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the config directory path (~/.paintquote/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "paintquote") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.paintquote/
    let home = dirs_home().ok_or_else(|| {
        QuoteError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".paintquote"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Fail early with a hint to run `init` when the directory is missing.
pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        return Err(QuoteError::ConfigNotFound(config_dir.to_path_buf()));
    }
    Ok(())
}

/// Create the config directory with a config file and a sample catalogue.
pub fn init_config_dir(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        return Err(QuoteError::AlreadyInitialized(config_dir.to_path_buf()));
    }

    fs::create_dir_all(config_dir)?;
    fs::create_dir_all(config_dir.join("output"))?;

    fs::write(config_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(config_dir.join("paint_products.json"), PRODUCTS_TEMPLATE)?;
    fs::write(config_dir.join("pricelist.json"), PRICES_TEMPLATE)?;
    Ok(())
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(QuoteError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| QuoteError::ConfigParse { path, source: e })
}

/// Load the catalogue named by the config.
pub fn load_catalogue(config_dir: &Path, config: &Config) -> Result<Catalogue> {
    Catalogue::load(&config.products_path(config_dir), &config.prices_path(config_dir))
}

/// Load quote.toml (empty draft if missing)
pub fn load_draft(config_dir: &Path) -> Result<Draft> {
    let path = config_dir.join("quote.toml");
    if !path.exists() {
        return Ok(Draft::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| QuoteError::ConfigParse { path, source: e })
}

/// Save quote.toml
pub fn save_draft(config_dir: &Path, draft: &Draft) -> Result<()> {
    let path = config_dir.join("quote.toml");
    let content = toml::to_string_pretty(draft).map_err(|e| {
        QuoteError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(&path, content)?;
    debug!(path = %path.display(), lines = draft.lines.len(), "draft saved");
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[catalogue]
# Paths are relative to this directory unless absolute.
products = "paint_products.json"
prices = "pricelist.json"

[quote]
vat_rate = 0.05     # 5% VAT, the only supported rate
search_limit = 10   # suggestions shown by 'search' and 'interactive'

[pdf]
output_dir = "output"
"#;

/// Sample product catalogue written by `init`
pub const PRODUCTS_TEMPLATE: &str = include_str!("../../data/paint_products.json");

/// Sample price list written by `init`
pub const PRICES_TEMPLATE: &str = include_str!("../../data/pricelist.json");
