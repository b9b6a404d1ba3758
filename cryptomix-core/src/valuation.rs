//! Valuation context attached to scenarios for display.
//!
//! Prices never change allocation math. A missing or rejected lookup simply
//! leaves `portfolio_data` empty.

use crate::allocation::Allocation;
use crate::asset::Asset;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Price in the reference currency
    pub price: f64,
    /// 24h change in percent
    #[serde(default)]
    pub change_24h: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceBook {
    quotes: BTreeMap<Asset, Quote>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, asset: Asset, price: f64, change_24h: f64) -> Self {
        self.insert(asset, Quote { price, change_24h });
        self
    }

    pub fn insert(&mut self, asset: Asset, quote: Quote) {
        self.quotes.insert(asset, quote);
    }

    pub fn get(&self, asset: Asset) -> Option<&Quote> {
        self.quotes.get(&asset)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// External price source. Implementations may fail; callers degrade to no
/// valuation rather than aborting.
pub trait PriceLookup {
    fn price_book(&self) -> Result<PriceBook>;
}

impl PriceLookup for PriceBook {
    fn price_book(&self) -> Result<PriceBook> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub asset: Asset,
    pub percentage: f64,
    pub value: f64,
    pub units: f64,
    pub price: f64,
    pub change_24h: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioData {
    pub total_value: f64,
    pub holdings: Vec<Holding>,
    /// Value-weighted 24h change of the whole allocation
    pub weighted_change_24h: f64,
}

/// Value an allocation at `amount`. Returns `None` when the amount is not
/// positive or any held asset has no usable quote.
pub fn portfolio_data(allocation: &Allocation, amount: f64, prices: &PriceBook) -> Option<PortfolioData> {
    if amount <= 0.0 {
        return None;
    }

    let mut holdings = Vec::new();
    for (asset, pct) in allocation.iter().filter(|(_, v)| *v > 0.0) {
        let Some(quote) = prices.get(asset).filter(|q| q.price > 0.0) else {
            tracing::warn!(%asset, "no usable quote, skipping valuation");
            return None;
        };
        let value = amount * pct / 100.0;
        holdings.push(Holding {
            asset,
            percentage: pct,
            value,
            units: value / quote.price,
            price: quote.price,
            change_24h: quote.change_24h,
        });
    }

    let total_value: f64 = holdings.iter().map(|h| h.value).sum();
    let weighted_change_24h = if total_value > 0.0 {
        holdings.iter().map(|h| h.value * h.change_24h).sum::<f64>() / total_value
    } else {
        0.0
    };

    Some(PortfolioData {
        total_value,
        holdings,
        weighted_change_24h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices() -> PriceBook {
        PriceBook::new()
            .with_quote(Asset::Btc, 50_000.0, 2.0)
            .with_quote(Asset::Eth, 2_500.0, -2.0)
    }

    #[test]
    fn test_portfolio_data_values_holdings() {
        let a = Allocation::from_pairs(&[(Asset::Btc, 50.0), (Asset::Eth, 50.0)]);
        let data = portfolio_data(&a, 10_000.0, &prices()).unwrap();
        assert_eq!(data.total_value, 10_000.0);
        assert_eq!(data.holdings[0].units, 0.1);
        assert_eq!(data.holdings[1].units, 2.0);
        assert_eq!(data.weighted_change_24h, 0.0);
    }

    #[test]
    fn test_missing_quote_yields_none() {
        let a = Allocation::from_pairs(&[(Asset::Btc, 50.0), (Asset::Sol, 50.0)]);
        assert!(portfolio_data(&a, 10_000.0, &prices()).is_none());
    }

    #[test]
    fn test_zero_amount_yields_none() {
        let a = Allocation::from_pairs(&[(Asset::Btc, 100.0)]);
        assert!(portfolio_data(&a, 0.0, &prices()).is_none());
    }

    #[test]
    fn test_price_book_from_json() {
        let book: PriceBook =
            serde_json::from_str(r#"{"BTC": {"price": 60000.0, "change_24h": 1.5}, "SOL": {"price": 150.0}}"#)
                .unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book.get(Asset::Sol).unwrap().change_24h, 0.0);
    }
}
