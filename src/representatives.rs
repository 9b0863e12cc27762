use serde::{Deserialize, Serialize};

use crate::models::{ProductRecord, RankedProduct};

pub const DEFAULT_TOLERANCE_PCT: f64 = 5.0;
pub const DEFAULT_NEAR_MEDIAN_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Representatives {
    pub near_median: Vec<RankedProduct>,
    pub cheapest: Option<ProductRecord>,
    pub most_expensive: Option<ProductRecord>,
}

/// Picks the cheapest, the most expensive and the listings priced close to
/// the median.
#[derive(Debug, Clone, Copy)]
pub struct RepresentativeSelector {
    tolerance_pct: f64,
    limit: usize,
}

impl Default for RepresentativeSelector {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE_PCT, DEFAULT_NEAR_MEDIAN_LIMIT)
    }
}

impl RepresentativeSelector {
    pub fn new(tolerance_pct: f64, limit: usize) -> Self {
        Self {
            tolerance_pct,
            limit,
        }
    }

    /// Single pass over `products`. Ties on min/max keep the first seen.
    ///
    /// Near-median candidates are only re-ordered when there are more than
    /// `limit` of them; then they are stably sorted by absolute distance and
    /// cut to `limit`. A zero median selects no near-median products.
    pub fn select(&self, products: &[ProductRecord], median_price: f64) -> Representatives {
        let mut cheapest: Option<&ProductRecord> = None;
        let mut most_expensive: Option<&ProductRecord> = None;
        let mut near_median = Vec::new();

        for product in products {
            let price = product.price.value();

            if cheapest.is_none_or(|c| price < c.price.value()) {
                cheapest = Some(product);
            }
            if most_expensive.is_none_or(|m| price > m.price.value()) {
                most_expensive = Some(product);
            }

            if median_price != 0.0 {
                let diff = (price - median_price) / median_price * 100.0;
                if diff.abs() <= self.tolerance_pct {
                    near_median.push(RankedProduct {
                        product: product.clone(),
                        percentage_diff_from_median: diff,
                    });
                }
            }
        }

        if near_median.len() > self.limit {
            near_median.sort_by(|a, b| {
                a.percentage_diff_from_median
                    .abs()
                    .total_cmp(&b.percentage_diff_from_median.abs())
            });
            near_median.truncate(self.limit);
        }

        Representatives {
            near_median,
            cheapest: cheapest.cloned(),
            most_expensive: most_expensive.cloned(),
        }
    }
}
