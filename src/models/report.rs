use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::listing::{PriceSample, ProductRecord, RankedProduct};
use super::marketplace::CurrencyCode;
use super::request::SearchRequest;
use crate::exchange::RateSource;
use crate::stats::{HistogramBin, StatLine, SummaryStatistics};

/// Everything a renderer needs for one search, as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceReport {
    pub request: SearchRequest,
    pub marketplace_name: String,
    pub currency: CurrencyCode,
    /// Last results page that was requested.
    pub listing_url: String,
    pub generated_on: NaiveDate,
    pub item_count: usize,
    pub failed_pages: u32,
    pub exchange_rate: f64,
    pub rate_source: RateSource,
    pub statistics: SummaryStatistics,
    pub annotations: Vec<StatLine>,
    pub inliers: Vec<PriceSample>,
    pub outliers: Vec<PriceSample>,
    pub histogram: Vec<HistogramBin>,
    pub near_median: Vec<RankedProduct>,
    pub cheapest: Option<ProductRecord>,
    pub most_expensive: Option<ProductRecord>,
}

impl PriceReport {
    /// `"iphone-13"` becomes `"IPHONE 13"`.
    pub fn title(&self) -> String {
        self.request.term.trim().replace('-', " ").to_uppercase()
    }

    /// Annotation lines rendered in the marketplace currency.
    pub fn rendered_annotations(&self) -> Vec<String> {
        self.annotations
            .iter()
            .map(|line| line.render(self.currency))
            .collect()
    }

    pub fn used_fallback_rate(&self) -> bool {
        self.rate_source == RateSource::Fallback
    }
}
