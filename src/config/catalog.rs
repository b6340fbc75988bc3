//! Catalog seed configuration loaded from a TOML file.
//!
//! The products listed here are inserted on startup when the catalog is empty, so a
//! fresh database has something to sell.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Default location of the seed file when `CATALOG_PATH` is not set
pub const DEFAULT_CATALOG_PATH: &str = "catalog.toml";

/// Configuration structure representing the entire catalog file
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    /// Products to seed
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// One product entry of the catalog file
#[derive(Debug, Deserialize, Clone)]
pub struct ProductSeed {
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price, written as a string or number (e.g. `"749.99"`)
    pub price: Decimal,
    /// Initial stock count
    pub stock: i32,
}

/// Loads the catalog seed from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading catalog seed from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file {}: {e}", path_ref.display()),
    })?;

    parse_catalog(&contents)
}

/// Parses catalog seed TOML.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a required field is missing.
pub fn parse_catalog(contents: &str) -> Result<CatalogConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog: {e}"),
    })
}

/// Resolves the catalog path from `CATALOG_PATH`, falling back to [`DEFAULT_CATALOG_PATH`].
#[must_use]
pub fn get_catalog_path() -> String {
    std::env::var("CATALOG_PATH").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string())
}
