use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::adapters::{AmazonAdapter, MercadoLibreAdapter};
use super::traits::MarketplaceAdapter;
use crate::config::AppConfig;
use crate::fetcher::PageFetcher;
use crate::models::{MarketplaceFamily, MarketplaceId};
use crate::utils::error::AppError;

pub type AdapterHandle = Arc<dyn MarketplaceAdapter>;

/// Marketplace id to adapter lookup.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: Arc<RwLock<HashMap<MarketplaceId, AdapterHandle>>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers `adapter` under its own marketplace id, replacing any
    /// previous one.
    pub async fn register(&self, adapter: AdapterHandle) {
        let id = adapter.marketplace();
        let mut adapters = self.adapters.write().await;
        if adapters.insert(id, adapter).is_some() {
            debug!(marketplace = %id, "replaced marketplace adapter");
        }
    }

    pub async fn adapter(&self, id: MarketplaceId) -> Result<AdapterHandle, AppError> {
        let adapters = self.adapters.read().await;
        adapters
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::UnknownMarketplace(id.to_string()))
    }

    pub async fn has_adapter(&self, id: MarketplaceId) -> bool {
        let adapters = self.adapters.read().await;
        adapters.contains_key(&id)
    }

    /// Registered marketplaces, sorted.
    pub async fn list_marketplaces(&self) -> Vec<MarketplaceId> {
        let adapters = self.adapters.read().await;
        let mut ids: Vec<_> = adapters.keys().copied().collect();
        ids.sort();
        ids
    }

    /// One adapter per built-in marketplace, using the configured URLs,
    /// rates and scrape mode.
    pub async fn with_default_adapters(
        config: &AppConfig,
        fetcher: PageFetcher,
    ) -> Result<Self, AppError> {
        let registry = Self::new();
        for id in MarketplaceId::ALL {
            let profile = config.marketplace_profile(id);
            let adapter: AdapterHandle = match id.family() {
                MarketplaceFamily::MercadoLibre => Arc::new(
                    MercadoLibreAdapter::new(profile, fetcher.clone())?
                        .with_mode(config.marketplaces.scrape_mode),
                ),
                MarketplaceFamily::Amazon => Arc::new(AmazonAdapter::new(profile, fetcher.clone())?),
            };
            registry.register(adapter).await;
        }
        Ok(registry)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
