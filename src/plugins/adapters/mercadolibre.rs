use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use url::Url;

use super::{resolve_image, resolve_link};
use crate::fetcher::{compile_selector, element_text, PageFetcher};
use crate::models::request::slugify;
use crate::models::{
    Condition, ListingPrice, MarketplaceProfile, RawListing, ScrapeMode, UNTITLED_LISTING,
};
use crate::plugins::traits::MarketplaceAdapter;
use crate::utils::error::Result;

/// Listings per results page; page `n` starts at offset `n * 50 + 1`.
pub const PAGE_SIZE: u32 = 50;

const CONDITION_NEW: &str = "_ITEM*CONDITION_2230284";
const CONDITION_USED: &str = "_ITEM*CONDITION_2230581";

const LISTING_ITEM: &str = "li.ui-search-layout__item";
// Skips the struck-through "before" price that precedes the current one.
const CURRENT_AMOUNT: &str = ".andes-money-amount:not(.andes-money-amount--previous)";
const FRACTION: &str = ".andes-money-amount__fraction";
const CENTS: &str = ".andes-money-amount__cents";
const TITLE: &str = ".poly-component__title, .ui-search-item__title";
const LINK: &str = "a.poly-component__title, a.ui-search-link, a.ui-search-item__group__element";
const BARE_PRICE: &str = "span.andes-money-amount__fraction";
const IMAGE: &str = "img.poly-component__picture, img.ui-search-result-image__element";

struct ListingSelectors {
    item: Selector,
    amount: Selector,
    fraction: Selector,
    cents: Selector,
    title: Selector,
    link: Selector,
    image: Selector,
    bare_price: Selector,
}

impl ListingSelectors {
    fn compile() -> Result<Self> {
        Ok(Self {
            item: compile_selector(LISTING_ITEM)?,
            amount: compile_selector(CURRENT_AMOUNT)?,
            fraction: compile_selector(FRACTION)?,
            cents: compile_selector(CENTS)?,
            title: compile_selector(TITLE)?,
            link: compile_selector(LINK)?,
            image: compile_selector(IMAGE)?,
            bare_price: compile_selector(BARE_PRICE)?,
        })
    }
}

/// MercadoLibre / MercadoLivre results pages; the profile picks the domain.
pub struct MercadoLibreAdapter {
    profile: MarketplaceProfile,
    fetcher: PageFetcher,
    mode: ScrapeMode,
    selectors: ListingSelectors,
    non_digits: Regex,
}

impl MercadoLibreAdapter {
    pub fn new(profile: MarketplaceProfile, fetcher: PageFetcher) -> Result<Self> {
        Ok(Self {
            profile,
            fetcher,
            mode: ScrapeMode::Records,
            selectors: ListingSelectors::compile()?,
            non_digits: Regex::new(r"\D")?,
        })
    }

    pub fn with_mode(mut self, mode: ScrapeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parses one results page according to the adapter's mode.
    pub fn parse_listings(&self, html: &str) -> Vec<RawListing> {
        let document = Html::parse_document(html);
        match self.mode {
            ScrapeMode::Records => {
                let base = Url::parse(&self.profile.base_url).ok();
                document
                    .select(&self.selectors.item)
                    .filter_map(|item| self.parse_item(item, base.as_ref()))
                    .collect()
            }
            ScrapeMode::PricesOnly => document
                .select(&self.selectors.bare_price)
                .filter_map(|price| self.parse_amount(&element_text(price), None))
                .map(|value| RawListing {
                    title: UNTITLED_LISTING.to_string(),
                    price: ListingPrice::Whole(value),
                    url: None,
                    image_url: None,
                })
                .collect(),
        }
    }

    fn parse_item(&self, item: ElementRef<'_>, base: Option<&Url>) -> Option<RawListing> {
        let Some(amount) = item.select(&self.selectors.amount).next() else {
            trace!("dropping listing without price");
            return None;
        };
        let fraction = amount.select(&self.selectors.fraction).next()?;
        let cents = amount.select(&self.selectors.cents).next().map(element_text);
        let value = self.parse_amount(&element_text(fraction), cents.as_deref())?;

        let title = item
            .select(&self.selectors.title)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED_LISTING.to_string());

        let url = item
            .select(&self.selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| base.and_then(|b| resolve_link(b, href)));

        let image_url = item
            .select(&self.selectors.image)
            .next()
            .and_then(|img| base.and_then(|b| resolve_image(b, img)));

        Some(RawListing {
            title,
            price: ListingPrice::Whole(value),
            url,
            image_url,
        })
    }

    /// `"1.299.999"` plus optional cents `"50"` gives `1299999.5`.
    fn parse_amount(&self, fraction: &str, cents: Option<&str>) -> Option<f64> {
        let digits = self.non_digits.replace_all(fraction, "");
        let whole = digits.parse::<u64>().ok()? as f64;
        let cents = cents
            .map(|c| self.non_digits.replace_all(c, "").parse::<u64>().unwrap_or(0))
            .unwrap_or(0);
        Some(whole + cents as f64 / 100.0)
    }
}

#[async_trait]
impl MarketplaceAdapter for MercadoLibreAdapter {
    fn profile(&self) -> &MarketplaceProfile {
        &self.profile
    }

    fn mode(&self) -> ScrapeMode {
        self.mode
    }

    fn page_url(&self, term: &str, page_index: u32, condition: Option<Condition>) -> Result<String> {
        let offset = page_index * PAGE_SIZE + 1;
        let condition_segment = match condition {
            Some(Condition::New) => CONDITION_NEW,
            Some(Condition::Used) => CONDITION_USED,
            None => "",
        };
        let path = format!(
            "{}_Desde_{}{}_NoIndex_True",
            slugify(term),
            offset,
            condition_segment
        );
        Ok(Url::parse(&self.profile.base_url)?.join(&path)?.to_string())
    }

    async fn fetch_page(
        &self,
        term: &str,
        page_index: u32,
        condition: Option<Condition>,
    ) -> Result<Vec<RawListing>> {
        let url = self.page_url(term, page_index, condition)?;
        let body = self.fetcher.fetch_html(&url).await?;
        let listings = self.parse_listings(&body);
        debug!(
            marketplace = %self.profile.id,
            page = page_index,
            listings = listings.len(),
            "parsed results page"
        );
        Ok(listings)
    }
}
