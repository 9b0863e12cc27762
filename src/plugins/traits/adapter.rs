use async_trait::async_trait;

use crate::models::{Condition, MarketplaceId, MarketplaceProfile, RawListing, ScrapeMode};
use crate::utils::error::Result;

/// Scraping logic for one marketplace family.
#[async_trait]
pub trait MarketplaceAdapter: Send + Sync {
    fn profile(&self) -> &MarketplaceProfile;

    fn marketplace(&self) -> MarketplaceId {
        self.profile().id
    }

    fn mode(&self) -> ScrapeMode {
        ScrapeMode::Records
    }

    /// URL of results page `page_index` (0-based).
    fn page_url(&self, term: &str, page_index: u32, condition: Option<Condition>) -> Result<String>;

    /// Listings on one results page.
    ///
    /// An empty vector means the catalog has no more pages. Transport
    /// failures and non-2xx responses are errors; malformed listings are
    /// dropped, never errors.
    async fn fetch_page(
        &self,
        term: &str,
        page_index: u32,
        condition: Option<Condition>,
    ) -> Result<Vec<RawListing>>;
}
