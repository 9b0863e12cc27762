use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use url::Url;

use crate::models::{
    ExchangeRateMode, MarketplaceId, MarketplaceProfile, ScrapeMode, ARS_FALLBACK_RATE,
    BRL_FIXED_RATE, DOLAR_BLUE_ENDPOINT,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub analysis: AnalysisConfig,
    pub cache: CacheConfig,
    pub exchange: ExchangeConfig,
    pub marketplaces: MarketplacesConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub request_timeout: u64,
    pub connect_timeout: u64,
    pub user_agent: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Outlier band half-width in standard deviations.
    pub outlier_threshold: f64,
    pub near_median_tolerance_pct: f64,
    pub near_median_limit: usize,
    pub histogram_bins: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 0 keeps entries for the process lifetime.
    pub result_ttl_secs: u64,
    pub exchange_rate_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub ars_endpoint: String,
    pub ars_rate_field: String,
    pub ars_fallback_rate: f64,
    pub brl_fixed_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplacesConfig {
    pub mercadolibre_ar_url: String,
    pub mercadolivre_br_url: String,
    pub amazon_us_url: String,
    pub scrape_mode: ScrapeMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub directory: Option<String>,
    pub file_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig {
                request_timeout: 20,
                connect_timeout: 10,
                user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
                accept_language: "es-AR,es;q=0.9,pt-BR;q=0.8,en-US;q=0.7".to_string(),
            },
            analysis: AnalysisConfig {
                outlier_threshold: 3.0,
                near_median_tolerance_pct: 5.0,
                near_median_limit: 10,
                histogram_bins: 20,
            },
            cache: CacheConfig {
                result_ttl_secs: 0,
                exchange_rate_ttl_secs: 0,
            },
            exchange: ExchangeConfig {
                ars_endpoint: DOLAR_BLUE_ENDPOINT.to_string(),
                ars_rate_field: "venta".to_string(),
                ars_fallback_rate: ARS_FALLBACK_RATE,
                brl_fixed_rate: BRL_FIXED_RATE,
            },
            marketplaces: MarketplacesConfig {
                mercadolibre_ar_url: "https://listado.mercadolibre.com.ar".to_string(),
                mercadolivre_br_url: "https://lista.mercadolivre.com.br".to_string(),
                amazon_us_url: "https://www.amazon.com".to_string(),
                scrape_mode: ScrapeMode::Records,
            },
            logging: LoggingConfig {
                directory: None,
                file_prefix: "market-pulse.log".to_string(),
            },
            metrics: MetricsConfig {
                enabled: false,
                port: 9001,
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then `config/default`, `config/{RUN_MODE}`, `config/local`,
    /// an optional explicit file, then `MARKET_PULSE__*` environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let s = builder
            .add_source(
                Environment::with_prefix("MARKET_PULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        if self.scraper.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Scraper user_agent must not be empty".into()));
        }

        if !(self.analysis.outlier_threshold > 0.0) {
            return Err(ConfigError::Message("Analysis outlier_threshold must be positive".into()));
        }

        let tolerance = self.analysis.near_median_tolerance_pct;
        if !(tolerance > 0.0 && tolerance <= 100.0) {
            return Err(ConfigError::Message(
                "Analysis near_median_tolerance_pct must be in (0, 100]".into(),
            ));
        }

        if self.analysis.near_median_limit == 0 {
            return Err(ConfigError::Message("Analysis near_median_limit must be greater than 0".into()));
        }

        if self.analysis.histogram_bins == 0 {
            return Err(ConfigError::Message("Analysis histogram_bins must be greater than 0".into()));
        }

        if !(self.exchange.ars_fallback_rate > 0.0) || !(self.exchange.brl_fixed_rate > 0.0) {
            return Err(ConfigError::Message("Exchange rates must be positive".into()));
        }

        if Url::parse(&self.exchange.ars_endpoint).is_err() {
            return Err(ConfigError::Message("Invalid exchange ars_endpoint URL".into()));
        }

        for url in [
            &self.marketplaces.mercadolibre_ar_url,
            &self.marketplaces.mercadolivre_br_url,
            &self.marketplaces.amazon_us_url,
        ] {
            if Url::parse(url).is_err() {
                return Err(ConfigError::Message(format!("Invalid marketplace base URL: {}", url)));
            }
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Message("Metrics port must be greater than 0".into()));
        }

        Ok(())
    }

    /// The built-in profile for `id` with configured URLs and rates applied.
    pub fn marketplace_profile(&self, id: MarketplaceId) -> MarketplaceProfile {
        let profile = MarketplaceProfile::builtin(id);
        match id {
            MarketplaceId::MercadoLibreAr => profile
                .with_base_url(self.marketplaces.mercadolibre_ar_url.trim_end_matches('/'))
                .with_exchange_rate(ExchangeRateMode::Live {
                    endpoint: self.exchange.ars_endpoint.clone(),
                    field: self.exchange.ars_rate_field.clone(),
                    fallback: self.exchange.ars_fallback_rate,
                }),
            MarketplaceId::MercadoLivreBr => profile
                .with_base_url(self.marketplaces.mercadolivre_br_url.trim_end_matches('/'))
                .with_exchange_rate(ExchangeRateMode::Fixed {
                    rate: self.exchange.brl_fixed_rate,
                }),
            MarketplaceId::AmazonUs => {
                profile.with_base_url(self.marketplaces.amazon_us_url.trim_end_matches('/'))
            }
        }
    }
}
