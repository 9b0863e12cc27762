//! Multi-page price extraction over a [`MarketplaceAdapter`].

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{Cache, EvictionPolicy};
use crate::models::{
    Condition, ExtractionKey, ExtractionResult, PriceSample, ProductRecord, ScrapeMode,
};
use crate::plugins::traits::MarketplaceAdapter;
use crate::utils::error::Result;

pub type ResultCache = Cache<ExtractionKey, ExtractionResult>;

pub struct PriceExtractor {
    cache: Arc<ResultCache>,
}

impl PriceExtractor {
    pub fn new(cache: Arc<ResultCache>) -> Self {
        Self { cache }
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        Self::new(Arc::new(Cache::new(policy)))
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Fetches pages `0..pages` one after another and aggregates their prices.
    ///
    /// Stops at the first empty page. Transport and status failures are
    /// counted and skipped. Returns `Ok(None)` when no price was found on any
    /// page; only a successful result is cached.
    ///
    /// # Errors
    ///
    /// Adapter errors that are not page failures (a page URL that cannot be
    /// built, for instance) abort the run.
    pub async fn extract(
        &self,
        adapter: &dyn MarketplaceAdapter,
        term: &str,
        pages: u32,
        condition: Option<Condition>,
    ) -> Result<Option<ExtractionResult>> {
        let key = ExtractionKey::new(term, pages, adapter.marketplace(), condition);

        if let Some(cached) = self.cache.get(&key).await {
            metrics::counter!("market_pulse_cache_hits_total", "cache" => "results").increment(1);
            debug!(marketplace = %key.marketplace, term = %key.term, "serving cached extraction");
            return Ok(Some(cached));
        }

        let mut listings = Vec::new();
        let mut failed_page_count = 0u32;
        let mut source_listing_url = String::new();

        for page_index in 0..pages {
            source_listing_url = adapter.page_url(&key.term, page_index, condition)?;

            match adapter.fetch_page(&key.term, page_index, condition).await {
                Ok(page) if page.is_empty() => {
                    debug!(page = page_index, "empty results page, stopping");
                    break;
                }
                Ok(page) => {
                    metrics::counter!(
                        "market_pulse_pages_fetched_total",
                        "marketplace" => key.marketplace.as_str()
                    )
                    .increment(1);
                    listings.extend(page);
                }
                Err(e) if e.is_page_failure() => {
                    failed_page_count += 1;
                    metrics::counter!(
                        "market_pulse_pages_failed_total",
                        "marketplace" => key.marketplace.as_str()
                    )
                    .increment(1);
                    warn!(
                        marketplace = %key.marketplace,
                        page = page_index,
                        error = %e,
                        "results page failed"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let mut products: Vec<ProductRecord> =
            listings.into_iter().map(ProductRecord::from).collect();
        let mut prices: Vec<PriceSample> = products.iter().map(|p| p.price).collect();

        if prices.is_empty() {
            info!(
                marketplace = %key.marketplace,
                term = %key.term,
                failed_pages = failed_page_count,
                "no prices found"
            );
            return Ok(None);
        }

        if let Some(threshold) = adapter.profile().minor_unit_threshold {
            if normalize_minor_units(&mut prices, threshold) {
                for product in &mut products {
                    product.price = product.price.scaled_down();
                }
                debug!(threshold, "scaled prices down from minor units");
            }
        }

        if adapter.mode() == ScrapeMode::PricesOnly {
            products.clear();
        }

        let result = ExtractionResult {
            prices,
            products,
            failed_page_count,
            source_listing_url,
        };

        info!(
            marketplace = %key.marketplace,
            term = %key.term,
            prices = result.prices.len(),
            failed_pages = result.failed_page_count,
            "extraction finished"
        );

        self.cache.insert(key, result.clone()).await;
        Ok(Some(result))
    }
}

/// True when any price exceeds `threshold`, taken as a sign the series is
/// still in minor units.
///
/// This is a guess: a genuinely expensive item priced in whole units trips
/// it too.
pub fn looks_like_minor_units(prices: &[PriceSample], threshold: f64) -> bool {
    prices.iter().any(|p| p.value() > threshold)
}

/// Divides every price by 100 when [`looks_like_minor_units`] holds.
/// Returns whether the series was rescaled.
pub fn normalize_minor_units(prices: &mut [PriceSample], threshold: f64) -> bool {
    if !looks_like_minor_units(prices, threshold) {
        return false;
    }
    for price in prices.iter_mut() {
        *price = price.scaled_down();
    }
    true
}
