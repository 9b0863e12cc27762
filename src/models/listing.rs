use serde::{Deserialize, Serialize};

/// Title used when a listing carries a price but no readable title.
pub const UNTITLED_LISTING: &str = "Untitled listing";

/// A listing price in the marketplace's native currency, whole units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSample(f64);

impl PriceSample {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn from_minor_units(minor: i64) -> Self {
        Self(minor as f64 / 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// One minor-unit step down (divide by 100).
    pub fn scaled_down(self) -> Self {
        Self(self.0 / 100.0)
    }
}

impl From<f64> for PriceSample {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// Price as an adapter read it off the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListingPrice {
    Whole(f64),
    /// Cents, as parsed from a formatted currency string.
    Minor(i64),
}

impl ListingPrice {
    pub fn into_sample(self) -> PriceSample {
        match self {
            ListingPrice::Whole(value) => PriceSample::new(value),
            ListingPrice::Minor(minor) => PriceSample::from_minor_units(minor),
        }
    }
}

/// One parsed listing from a single results page.
#[derive(Debug, Clone, PartialEq)]
pub struct RawListing {
    pub title: String,
    pub price: ListingPrice,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    pub price: PriceSample,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
}

impl From<RawListing> for ProductRecord {
    fn from(listing: RawListing) -> Self {
        Self {
            title: listing.title,
            price: listing.price.into_sample(),
            source_url: listing.url,
            image_url: listing.image_url,
        }
    }
}

/// A product annotated with its distance from the median, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub percentage_diff_from_median: f64,
}
