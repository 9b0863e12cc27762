use serde::{Deserialize, Serialize};

use super::listing::{PriceSample, ProductRecord};
use super::marketplace::{Condition, MarketplaceId};

/// How an adapter reads a results page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeMode {
    /// One record per listing container: price, title and link.
    #[default]
    Records,
    /// Every price on the page, without per-listing records.
    PricesOnly,
}

/// Identity of one extraction; the result cache is keyed on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractionKey {
    pub term: String,
    pub pages: u32,
    pub marketplace: MarketplaceId,
    pub condition: Option<Condition>,
}

impl ExtractionKey {
    /// Surrounding whitespace in `term` does not change the key.
    pub fn new(
        term: &str,
        pages: u32,
        marketplace: MarketplaceId,
        condition: Option<Condition>,
    ) -> Self {
        Self {
            term: term.trim().to_string(),
            pages,
            marketplace,
            condition,
        }
    }
}

/// Aggregated output of one multi-page extraction.
///
/// `products` is either parallel to `prices` or empty (prices-only mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub prices: Vec<PriceSample>,
    pub products: Vec<ProductRecord>,
    pub failed_page_count: u32,
    pub source_listing_url: String,
}

impl ExtractionResult {
    pub fn has_records(&self) -> bool {
        !self.products.is_empty()
    }

    pub fn price_values(&self) -> Vec<f64> {
        self.prices.iter().map(|p| p.value()).collect()
    }
}
