//! Native-currency units per USD for a marketplace.

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use crate::cache::{Cache, EvictionPolicy};
use crate::fetcher::PageFetcher;
use crate::models::{CurrencyCode, ExchangeRateMode, MarketplaceProfile};
use crate::utils::error::{AppError, Result};
use crate::utils::number::parse_decimal;

static RATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,]*").expect("valid regex"));

pub type RateCache = Cache<CurrencyCode, f64>;

/// Where a resolved rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Fixed,
    Live,
    Cached,
    /// The live lookup failed and the configured constant was used.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRate {
    pub rate: f64,
    pub source: RateSource,
}

pub struct ExchangeRateResolver {
    fetcher: PageFetcher,
    cache: Arc<RateCache>,
}

impl ExchangeRateResolver {
    pub fn new(fetcher: PageFetcher, cache: Arc<RateCache>) -> Self {
        Self { fetcher, cache }
    }

    pub fn with_policy(fetcher: PageFetcher, policy: EvictionPolicy) -> Self {
        Self::new(fetcher, Arc::new(Cache::new(policy)))
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    /// Never fails: a failed live lookup yields the fallback rate.
    pub async fn resolve(&self, profile: &MarketplaceProfile) -> f64 {
        self.resolve_detailed(profile).await.rate
    }

    pub async fn resolve_detailed(&self, profile: &MarketplaceProfile) -> ResolvedRate {
        let (endpoint, field, fallback) = match &profile.exchange_rate {
            ExchangeRateMode::Fixed { rate } => {
                return ResolvedRate {
                    rate: *rate,
                    source: RateSource::Fixed,
                };
            }
            ExchangeRateMode::Live {
                endpoint,
                field,
                fallback,
            } => (endpoint, field, *fallback),
        };

        if let Some(rate) = self.cache.get(&profile.currency).await {
            metrics::counter!("market_pulse_cache_hits_total", "cache" => "exchange_rate")
                .increment(1);
            return ResolvedRate {
                rate,
                source: RateSource::Cached,
            };
        }

        match self.fetch_live(endpoint, field).await {
            Ok(rate) => {
                info!(currency = %profile.currency, rate, "fetched exchange rate");
                self.cache.insert(profile.currency, rate).await;
                ResolvedRate {
                    rate,
                    source: RateSource::Live,
                }
            }
            Err(e) => {
                metrics::counter!(
                    "market_pulse_exchange_rate_fallbacks_total",
                    "currency" => profile.currency.as_str()
                )
                .increment(1);
                warn!(
                    currency = %profile.currency,
                    fallback,
                    error = %e,
                    "exchange rate lookup failed, using fallback"
                );
                ResolvedRate {
                    rate: fallback,
                    source: RateSource::Fallback,
                }
            }
        }
    }

    async fn fetch_live(&self, endpoint: &str, field: &str) -> Result<f64> {
        let body = self.fetcher.fetch_json(endpoint).await?;
        debug!(endpoint, "exchange rate response received");
        let value = body.get(field).ok_or_else(|| AppError::Parse {
            message: format!("exchange rate response has no '{}' field", field),
        })?;
        parse_rate(value).ok_or_else(|| AppError::Parse {
            message: format!("unusable exchange rate value: {}", value),
        })
    }
}

/// Accepts a JSON number or a string such as `"1205.5 ARS"` or
/// `"1.205,50 ARS"`; the first run of digits and separators wins.
/// Non-positive rates are rejected.
pub fn parse_rate(value: &serde_json::Value) -> Option<f64> {
    let rate = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => {
            let number = RATE_RE.find(s)?;
            parse_decimal(number.as_str())?.to_f64()?
        }
        _ => return None,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}
