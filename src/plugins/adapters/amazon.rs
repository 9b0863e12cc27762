use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use url::Url;

use super::{resolve_image, resolve_link};
use crate::fetcher::{compile_selector, element_text, PageFetcher};
use crate::models::{Condition, ListingPrice, MarketplaceProfile, RawListing, UNTITLED_LISTING};
use crate::plugins::traits::MarketplaceAdapter;
use crate::utils::error::Result;
use crate::utils::number::parse_decimal;

const CONDITION_NEW: &str = "p_n_condition-type:6461716011";
const CONDITION_USED: &str = "p_n_condition-type:6461718011";

const RESULT: &str = "div[data-component-type='s-search-result']";
const SPONSORED: &str = ".puis-sponsored-label-text, \
     .s-sponsored-label-text, \
     .puis-label-popover-default, \
     [data-component-type='sp-sponsored-result']";
const AD_HOLDER_CLASS: &str = "AdHolder";
const PRICE: &str = ".a-price:not([data-a-strike]) .a-offscreen";
const TITLE: &str = "h2";
const LINK: &str = "h2 a, a.a-link-normal.s-no-outline, a.a-link-normal.s-link-style";
const IMAGE: &str = "img.s-image";

struct ResultSelectors {
    result: Selector,
    sponsored: Selector,
    price: Selector,
    title: Selector,
    link: Selector,
    image: Selector,
}

impl ResultSelectors {
    fn compile() -> Result<Self> {
        Ok(Self {
            result: compile_selector(RESULT)?,
            sponsored: compile_selector(SPONSORED)?,
            price: compile_selector(PRICE)?,
            title: compile_selector(TITLE)?,
            link: compile_selector(LINK)?,
            image: compile_selector(IMAGE)?,
        })
    }
}

/// Amazon search results. Sponsored cards are skipped and prices are read in
/// cents.
pub struct AmazonAdapter {
    profile: MarketplaceProfile,
    fetcher: PageFetcher,
    selectors: ResultSelectors,
}

impl AmazonAdapter {
    pub fn new(profile: MarketplaceProfile, fetcher: PageFetcher) -> Result<Self> {
        Ok(Self {
            profile,
            fetcher,
            selectors: ResultSelectors::compile()?,
        })
    }

    pub fn parse_listings(&self, html: &str) -> Vec<RawListing> {
        let document = Html::parse_document(html);
        let base = Url::parse(&self.profile.base_url).ok();
        document
            .select(&self.selectors.result)
            .filter(|card| !self.is_sponsored(*card))
            .filter_map(|card| self.parse_card(card, base.as_ref()))
            .collect()
    }

    fn is_sponsored(&self, card: ElementRef<'_>) -> bool {
        card.value().classes().any(|c| c == AD_HOLDER_CLASS)
            || card.select(&self.selectors.sponsored).next().is_some()
    }

    fn parse_card(&self, card: ElementRef<'_>, base: Option<&Url>) -> Option<RawListing> {
        let Some(minor) = card
            .select(&self.selectors.price)
            .next()
            .and_then(|p| parse_minor_units(&element_text(p)))
        else {
            trace!("dropping result card without price");
            return None;
        };

        let title = card
            .select(&self.selectors.title)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED_LISTING.to_string());

        let url = card
            .select(&self.selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| base.and_then(|b| resolve_link(b, href)));

        let image_url = card
            .select(&self.selectors.image)
            .next()
            .and_then(|img| base.and_then(|b| resolve_image(b, img)));

        Some(RawListing {
            title,
            price: ListingPrice::Minor(minor),
            url,
            image_url,
        })
    }
}

/// Parses a formatted price such as `"$1,299.99"` or `"1.299,99"` into cents.
pub fn parse_minor_units(text: &str) -> Option<i64> {
    let amount = parse_decimal(text)?;
    (amount * Decimal::ONE_HUNDRED).round().to_i64()
}

#[async_trait]
impl MarketplaceAdapter for AmazonAdapter {
    fn profile(&self) -> &MarketplaceProfile {
        &self.profile
    }

    fn page_url(&self, term: &str, page_index: u32, condition: Option<Condition>) -> Result<String> {
        let mut url = Url::parse(&self.profile.base_url)?.join("/s")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("k", term.trim())
                .append_pair("page", &(page_index + 1).to_string());
            match condition {
                Some(Condition::New) => {
                    query.append_pair("rh", CONDITION_NEW);
                }
                Some(Condition::Used) => {
                    query.append_pair("rh", CONDITION_USED);
                }
                None => {}
            }
        }
        Ok(url.to_string())
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
