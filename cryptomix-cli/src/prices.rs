//! Price lookup backed by a JSON snapshot on disk.
//!
//! Format: `{"BTC": {"price": 64000.0, "change_24h": 1.2}, ...}`

use cryptomix_core::{EngineError, PriceBook, PriceLookup};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FilePriceLookup {
    path: PathBuf,
}

impl FilePriceLookup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PriceLookup for FilePriceLookup {
    fn price_book(&self) -> cryptomix_core::Result<PriceBook> {
        let s = fs::read_to_string(&self.path)
            .map_err(|e| EngineError::Valuation(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_str(&s)
            .map_err(|e| EngineError::Valuation(format!("parse {}: {e}", self.path.display())))
    }
}
