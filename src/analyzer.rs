//! End-to-end pipeline: extraction, exchange rate, statistics and
//! representative products for one search.

use chrono::Utc;
use tracing::{info, instrument};

use crate::cache::EvictionPolicy;
use crate::config::AppConfig;
use crate::exchange::ExchangeRateResolver;
use crate::extractor::PriceExtractor;
use crate::fetcher::PageFetcher;
use crate::models::{PriceReport, SearchRequest};
use crate::plugins::AdapterRegistry;
use crate::representatives::RepresentativeSelector;
use crate::stats::{histogram, StatisticsEngine};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Report(Box<PriceReport>),
    /// No page produced a single price.
    NoResults { request: SearchRequest },
}

impl AnalysisOutcome {
    pub fn report(&self) -> Option<&PriceReport> {
        match self {
            AnalysisOutcome::Report(report) => Some(report),
            AnalysisOutcome::NoResults { .. } => None,
        }
    }
}

pub struct PriceAnalyzer {
    registry: AdapterRegistry,
    extractor: PriceExtractor,
    resolver: ExchangeRateResolver,
    engine: StatisticsEngine,
    selector: RepresentativeSelector,
    histogram_bins: usize,
}

impl PriceAnalyzer {
    pub fn new(
        registry: AdapterRegistry,
        extractor: PriceExtractor,
        resolver: ExchangeRateResolver,
        engine: StatisticsEngine,
        selector: RepresentativeSelector,
        histogram_bins: usize,
    ) -> Self {
        Self {
            registry,
            extractor,
            resolver,
            engine,
            selector,
            histogram_bins,
        }
    }

    /// Wires the default adapters and both caches from `config`.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = PageFetcher::new(config.scraper.clone())?;
        let registry = AdapterRegistry::with_default_adapters(config, fetcher.clone()).await?;
        let extractor =
            PriceExtractor::with_policy(EvictionPolicy::from_ttl_secs(config.cache.result_ttl_secs));
        let resolver = ExchangeRateResolver::with_policy(
            fetcher,
            EvictionPolicy::from_ttl_secs(config.cache.exchange_rate_ttl_secs),
        );
        let analysis = &config.analysis;

        Ok(Self::new(
            registry,
            extractor,
            resolver,
            StatisticsEngine::new(analysis.outlier_threshold),
            RepresentativeSelector::new(
                analysis.near_median_tolerance_pct,
                analysis.near_median_limit,
            ),
            analysis.histogram_bins,
        ))
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Validates `request` and runs the pipeline.
    ///
    /// # Errors
    ///
    /// [`AppError::InvalidQuery`](crate::AppError::InvalidQuery) for a bad
    /// request, plus any non-page error raised while extracting. Failed pages
    /// and an unreachable exchange-rate service are not errors.
    #[instrument(skip(self, request), fields(term = %request.term, marketplace = %request.marketplace))]
    pub async fn analyze(&self, request: SearchRequest) -> Result<AnalysisOutcome> {
        let request = request.validated()?;
        let adapter = self.registry.adapter(request.marketplace).await?;
        let profile = adapter.profile().clone();

        let Some(extraction) = self
            .extractor
            .extract(adapter.as_ref(), &request.term, request.pages, request.condition)
            .await?
        else {
            return Ok(AnalysisOutcome::NoResults { request });
        };

        let resolved = self.resolver.resolve_detailed(&profile).await;
        let (statistics, partition) = self.engine.summarize(&extraction.prices, resolved.rate)?;
        let picks = self
            .selector
            .select(&extraction.products, statistics.native.median);

        info!(
            items = extraction.prices.len(),
            outliers = partition.outliers.len(),
            rate = resolved.rate,
            "analysis complete"
        );

        let report = PriceReport {
            marketplace_name: profile.display_name.clone(),
            currency: profile.currency,
            listing_url: extraction.source_listing_url.clone(),
            generated_on: Utc::now().date_naive(),
            item_count: extraction.prices.len(),
            failed_pages: extraction.failed_page_count,
            exchange_rate: resolved.rate,
            rate_source: resolved.source,
            annotations: statistics.lines(),
            statistics,
            histogram: histogram(&partition.inliers, self.histogram_bins),
            inliers: partition.inliers,
            outliers: partition.outliers,
            near_median: picks.near_median,
            cheapest: picks.cheapest,
            most_expensive: picks.most_expensive,
            request,
        };

        Ok(AnalysisOutcome::Report(Box::new(report)))
    }
}
