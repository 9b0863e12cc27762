use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::AppError;

/// Dollar-blue quote used for ARS conversions.
pub const DOLAR_BLUE_ENDPOINT: &str = "https://dolarapi.com/v1/dolares/blue";

/// ARS per USD when the live quote cannot be fetched.
pub const ARS_FALLBACK_RATE: f64 = 1200.0;

/// BRL per USD.
pub const BRL_FIXED_RATE: f64 = 5.5;

/// Amazon prices above this (after the cents conversion) are taken as a
/// second, accidental minor-unit scale.
pub const AMAZON_MINOR_UNIT_THRESHOLD: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketplaceId {
    #[serde(rename = "mercadolibre-ar")]
    MercadoLibreAr,
    #[serde(rename = "mercadolivre-br")]
    MercadoLivreBr,
    #[serde(rename = "amazon-us")]
    AmazonUs,
}

impl MarketplaceId {
    pub const ALL: [MarketplaceId; 3] = [
        MarketplaceId::MercadoLibreAr,
        MarketplaceId::MercadoLivreBr,
        MarketplaceId::AmazonUs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketplaceId::MercadoLibreAr => "mercadolibre-ar",
            MarketplaceId::MercadoLivreBr => "mercadolivre-br",
            MarketplaceId::AmazonUs => "amazon-us",
        }
    }

    pub fn family(&self) -> MarketplaceFamily {
        match self {
            MarketplaceId::MercadoLibreAr | MarketplaceId::MercadoLivreBr => {
                MarketplaceFamily::MercadoLibre
            }
            MarketplaceId::AmazonUs => MarketplaceFamily::Amazon,
        }
    }
}

impl fmt::Display for MarketplaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketplaceId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarketplaceId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::UnknownMarketplace(s.to_string()))
    }
}

/// Sites sharing markup and URL conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketplaceFamily {
    MercadoLibre,
    Amazon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Ars,
    Brl,
    Usd,
}

impl CurrencyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Ars => "ARS",
            CurrencyCode::Brl => "BRL",
            CurrencyCode::Usd => "USD",
        }
    }

    pub fn thousands_separator(&self) -> char {
        match self {
            CurrencyCode::Ars | CurrencyCode::Brl => '.',
            CurrencyCode::Usd => ',',
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            CurrencyCode::Ars | CurrencyCode::Brl => ',',
            CurrencyCode::Usd => '.',
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing condition filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            other => Err(AppError::InvalidQuery(format!(
                "condition must be 'new' or 'used', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExchangeRateMode {
    Fixed {
        rate: f64,
    },
    Live {
        endpoint: String,
        /// JSON field holding the quote.
        field: String,
        fallback: f64,
    },
}

/// Static description of one supported marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceProfile {
    pub id: MarketplaceId,
    pub host_domain: String,
    /// Scheme + host the adapter builds page URLs from. Defaults to
    /// `https://{host_domain}`.
    pub base_url: String,
    pub currency: CurrencyCode,
    pub display_name: String,
    pub exchange_rate: ExchangeRateMode,
    pub minor_unit_threshold: Option<f64>,
}

impl MarketplaceProfile {
    pub fn builtin(id: MarketplaceId) -> Self {
        let (host_domain, currency, display_name, exchange_rate, minor_unit_threshold) = match id {
            MarketplaceId::MercadoLibreAr => (
                "listado.mercadolibre.com.ar",
                CurrencyCode::Ars,
                "MercadoLibre Argentina",
                ExchangeRateMode::Live {
                    endpoint: DOLAR_BLUE_ENDPOINT.to_string(),
                    field: "venta".to_string(),
                    fallback: ARS_FALLBACK_RATE,
                },
                None,
            ),
            MarketplaceId::MercadoLivreBr => (
                "lista.mercadolivre.com.br",
                CurrencyCode::Brl,
                "MercadoLivre Brasil",
                ExchangeRateMode::Fixed {
                    rate: BRL_FIXED_RATE,
                },
                None,
            ),
            MarketplaceId::AmazonUs => (
                "www.amazon.com",
                CurrencyCode::Usd,
                "Amazon US",
                ExchangeRateMode::Fixed { rate: 1.0 },
                Some(AMAZON_MINOR_UNIT_THRESHOLD),
            ),
        };

        Self {
            id,
            host_domain: host_domain.to_string(),
            base_url: format!("https://{}", host_domain),
            currency,
            display_name: display_name.to_string(),
            exchange_rate,
            minor_unit_threshold,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_exchange_rate(mut self, mode: ExchangeRateMode) -> Self {
        self.exchange_rate = mode;
        self
    }
}
