//! Descriptive statistics over a price series.
//!
//! Median, mean, standard deviation, min, max and p25 are taken over the full
//! series. The outlier partition uses the same full-series mean and standard
//! deviation and only feeds the histogram.

use serde::{Deserialize, Serialize};

use crate::models::{CurrencyCode, PriceSample};
use crate::utils::error::{AppError, Result};
use crate::utils::format::{format_amount, format_number};

pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSet<T> {
    pub median: T,
    pub mean: T,
    pub std_dev: T,
    pub min: T,
    pub max: T,
    pub p25: T,
}

impl StatSet<f64> {
    /// Divides every figure by `rate` and truncates toward zero.
    pub fn to_usd(&self, rate: f64) -> StatSet<i64> {
        StatSet {
            median: usd_truncated(self.median, rate),
            mean: usd_truncated(self.mean, rate),
            std_dev: usd_truncated(self.std_dev, rate),
            min: usd_truncated(self.min, rate),
            max: usd_truncated(self.max, rate),
            p25: usd_truncated(self.p25, rate),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub native: StatSet<f64>,
    pub usd: StatSet<i64>,
    /// Native currency units per USD used for `usd`.
    pub exchange_rate: f64,
}

impl SummaryStatistics {
    /// One annotation per plotted statistic. The "Std Dev" line sits at
    /// mean + one standard deviation.
    pub fn lines(&self) -> Vec<StatLine> {
        let n = &self.native;
        let spread = n.mean + n.std_dev;
        vec![
            StatLine::new("Median", n.median, self.usd.median),
            StatLine::new("Avg", n.mean, self.usd.mean),
            StatLine::new("Max", n.max, self.usd.max),
            StatLine::new("Min", n.min, self.usd.min),
            StatLine::new("Std Dev", spread, usd_truncated(spread, self.exchange_rate)),
            StatLine::new("25th percentile", n.p25, self.usd.p25),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub label: String,
    pub native: f64,
    pub usd: i64,
}

impl StatLine {
    fn new(label: &str, native: f64, usd: i64) -> Self {
        Self {
            label: label.to_string(),
            native,
            usd,
        }
    }

    /// `"Median: 150.000 ARS (375 USD)"`
    pub fn render(&self, currency: CurrencyCode) -> String {
        format!(
            "{}: {} {} ({} USD)",
            self.label,
            format_amount(self.native, currency),
            currency,
            format_number(self.usd)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Every price lands on exactly one side, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierPartition {
    pub bounds: OutlierBounds,
    pub inliers: Vec<PriceSample>,
    pub outliers: Vec<PriceSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct StatisticsEngine {
    outlier_threshold: f64,
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLIER_THRESHOLD)
    }
}

impl StatisticsEngine {
    pub fn new(outlier_threshold: f64) -> Self {
        Self { outlier_threshold }
    }

    pub fn outlier_threshold(&self) -> f64 {
        self.outlier_threshold
    }

    pub fn summarize(
        &self,
        prices: &[PriceSample],
        exchange_rate: f64,
    ) -> Result<(SummaryStatistics, OutlierPartition)> {
        summarize(prices, self.outlier_threshold, exchange_rate)
    }
}

/// Summary statistics (native and USD) plus the outlier partition.
///
/// # Errors
///
/// [`AppError::EmptySeries`] for an empty series and [`AppError::Internal`]
/// for a non-positive exchange rate; callers never pass either.
pub fn summarize(
    prices: &[PriceSample],
    outlier_threshold: f64,
    exchange_rate: f64,
) -> Result<(SummaryStatistics, OutlierPartition)> {
    if prices.is_empty() {
        return Err(AppError::EmptySeries);
    }
    if !(exchange_rate > 0.0) {
        return Err(AppError::Internal(format!(
            "exchange rate must be positive, got {}",
            exchange_rate
        )));
    }

    let values: Vec<f64> = prices.iter().map(|p| p.value()).collect();
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = mean(&values);
    let std_dev = population_std_dev(&values, mean);
    let native = StatSet {
        median: percentile(&sorted, 50.0),
        mean,
        std_dev,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        p25: percentile(&sorted, 25.0),
    };

    let summary = SummaryStatistics {
        native,
        usd: native.to_usd(exchange_rate),
        exchange_rate,
    };

    Ok((summary, partition_outliers(prices, mean, std_dev, outlier_threshold)))
}

/// Splits `prices` by the band `mean ± threshold × std_dev` (inclusive).
pub fn partition_outliers(
    prices: &[PriceSample],
    mean: f64,
    std_dev: f64,
    threshold: f64,
) -> OutlierPartition {
    let bounds = OutlierBounds {
        lower: mean - threshold * std_dev,
        upper: mean + threshold * std_dev,
    };
    let (inliers, outliers) = prices
        .iter()
        .copied()
        .partition(|p| bounds.contains(p.value()));
    OutlierPartition {
        bounds,
        inliers,
        outliers,
    }
}

/// Equal-width bins between the series min and max; the last bin is closed.
pub fn histogram(values: &[PriceSample], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (min, max) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.value()), hi.max(p.value()))
    });

    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for p in values {
        let idx = (((p.value() - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Linear-interpolated percentile over an ascending, non-empty slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

fn usd_truncated(value: f64, rate: f64) -> i64 {
    (value / rate).trunc() as i64
}
