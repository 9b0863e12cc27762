use super::*;
use market_pulse::cache::EvictionPolicy;
use market_pulse::exchange::{ExchangeRateResolver, RateSource};
use market_pulse::models::{MarketplaceId, ARS_FALLBACK_RATE};

fn resolver(config: &AppConfig) -> ExchangeRateResolver {
    ExchangeRateResolver::with_policy(test_fetcher(config), EvictionPolicy::Never)
}

#[tokio::test]
async fn test_live_rate_is_fetched_once_then_cached() {
    let server = MockServer::start().await;
    let config = get_test_config(&server);
    mount_rate(&server, json!("400.0 ARS"), 1).await;

    let resolver = resolver(&config);
    let profile = config.marketplace_profile(MarketplaceId::MercadoLibreAr);

    let first = resolver.resolve_detailed(&profile).await;
    assert_eq!(first.rate, 400.0);
    assert_eq!(first.source, RateSource::Live);

    let second = resolver.resolve_detailed(&profile).await;
    assert_eq!(second.rate, 400.0);
    assert_eq!(second.source, RateSource::Cached);
}

#[tokio::test]
async fn test_numeric_rate_field() {
    let server = MockServer::start().await;
    let config = get_test_config(&server);
    mount_rate(&server, json!(1185.5), 1).await;

    let rate = resolver(&config)
        .resolve(&config.marketplace_profile(MarketplaceId::MercadoLibreAr))
        .await;
    assert_eq!(rate, 1185.5);
}

#[tokio::test]
async fn test_server_error_falls_back_and_retries_next_time() {
    let server = MockServer::start().await;
    let config = get_test_config(&server);
    Mock::given(method("GET"))
        .and(path(RATE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = resolver(&config);
    let profile = config.marketplace_profile(MarketplaceId::MercadoLibreAr);

    for _ in 0..2 {
        let resolved = resolver.resolve_detailed(&profile).await;
        assert_eq!(resolved.rate, ARS_FALLBACK_RATE);
        assert_eq!(resolved.source, RateSource::Fallback);
    }
    assert!(resolver.cache().is_empty().await);
}

#[tokio::test]
async fn test_unusable_payload_falls_back() {
    let server = MockServer::start().await;
    let config = get_test_config(&server);
    mount_rate(&server, json!("sin cotizacion"), 1).await;

    let resolved = resolver(&config)
        .resolve_detailed(&config.marketplace_profile(MarketplaceId::MercadoLibreAr))
        .await;
    assert_eq!(resolved.source, RateSource::Fallback);
    assert_eq!(resolved.rate, config.exchange.ars_fallback_rate);
}

#[tokio::test]
async fn test_fixed_rate_marketplaces_never_call_out() {
    let server = MockServer::start().await;
    let config = get_test_config(&server);
    mount_rate(&server, json!("400.0"), 0).await;

    let resolver = resolver(&config);
    let br = resolver
        .resolve_detailed(&config.marketplace_profile(MarketplaceId::MercadoLivreBr))
        .await;
    let us = resolver
        .resolve_detailed(&config.marketplace_profile(MarketplaceId::AmazonUs))
        .await;

    assert_eq!((br.rate, br.source), (5.5, RateSource::Fixed));
    assert_eq!((us.rate, us.source), (1.0, RateSource::Fixed));
}
