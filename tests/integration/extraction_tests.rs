use super::*;
use market_pulse::cache::EvictionPolicy;
use market_pulse::extractor::PriceExtractor;
use market_pulse::models::{Condition, MarketplaceId, ScrapeMode};
use market_pulse::plugins::adapters::{AmazonAdapter, MercadoLibreAdapter};
use wiremock::matchers::query_param;

fn mercadolibre(config: &AppConfig) -> MercadoLibreAdapter {
    MercadoLibreAdapter::new(
        config.marketplace_profile(MarketplaceId::MercadoLibreAr),
        test_fetcher(config),
    )
    .expect("adapter")
}

#[tokio::test]
async fn test_pages_are_aggregated_in_order() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    mount_page(
        &server,
        "/iphone-13_Desde_1_NoIndex_True",
        ml_page(&[("iPhone 13 128GB", Some("1.200.000")), ("iPhone 13 Mini", Some("950.000"))]),
    )
    .await;
    mount_page(
        &server,
        "/iphone-13_Desde_51_NoIndex_True",
        ml_page(&[("iPhone 13 Pro", Some("1.650.000")), ("Funda", None)]),
    )
    .await;

    let result = PriceExtractor::with_policy(EvictionPolicy::Never)
        .extract(&mercadolibre(&config), "iphone 13", 2, None)
        .await?
        .expect("prices");

    assert_eq!(result.price_values(), vec![1_200_000.0, 950_000.0, 1_650_000.0]);
    assert_eq!(result.products.len(), 3);
    assert_eq!(result.products[2].title, "iPhone 13 Pro");
    assert_eq!(result.failed_page_count, 0);
    assert_eq!(
        result.source_listing_url,
        format!("{}/iphone-13_Desde_51_NoIndex_True", server.uri())
    );
    Ok(())
}

#[tokio::test]
async fn test_empty_page_stops_pagination() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    mount_page(&server, "/mate_Desde_1_NoIndex_True", ml_page(&[("Mate", Some("25.000"))])).await;
    mount_page(&server, "/mate_Desde_51_NoIndex_True", empty_page()).await;
    Mock::given(method("GET"))
        .and(path("/mate_Desde_101_NoIndex_True"))
        .respond_with(html(ml_page(&[("Mate imperial", Some("90.000"))])))
        .expect(0)
        .mount(&server)
        .await;

    let result = PriceExtractor::with_policy(EvictionPolicy::Never)
        .extract(&mercadolibre(&config), "mate", 3, None)
        .await?
        .expect("prices");

    assert_eq!(result.price_values(), vec![25_000.0]);
    assert_eq!(result.failed_page_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_server_errors_count_as_failed_pages() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/notebook_Desde_1_NoIndex_True"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/notebook_Desde_51_NoIndex_True",
        ml_page(&[
            ("Notebook A", Some("800.000")),
            ("Notebook B", Some("900.000")),
            ("Notebook C", Some("1.000.000")),
        ]),
    )
    .await;

    let result = PriceExtractor::with_policy(EvictionPolicy::Never)
        .extract(&mercadolibre(&config), "notebook", 2, None)
        .await?
        .expect("prices");

    assert_eq!(result.failed_page_count, 1);
    assert_eq!(result.prices.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_all_pages_failing_yields_none() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    // Nothing mounted: every page is a 404.
    let result = PriceExtractor::with_policy(EvictionPolicy::Never)
        .extract(&mercadolibre(&config), "heladera", 3, None)
        .await?;

    assert!(result.is_none());
    Ok(())
}

#[tokio::test]
async fn test_condition_filter_reaches_the_url() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    mount_page(
        &server,
        "/bicicleta_Desde_1_ITEM*CONDITION_2230581_NoIndex_True",
        ml_page(&[("Bicicleta rodado 29", Some("310.000"))]),
    )
    .await;

    let result = PriceExtractor::with_policy(EvictionPolicy::Never)
        .extract(&mercadolibre(&config), "bicicleta", 1, Some(Condition::Used))
        .await?
        .expect("prices");

    assert_eq!(result.price_values(), vec![310_000.0]);
    Ok(())
}

#[tokio::test]
async fn test_cached_extraction_skips_the_network() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/tablet_Desde_1_NoIndex_True"))
        .respond_with(html(ml_page(&[("Tablet", Some("300.000"))])))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = PriceExtractor::with_policy(EvictionPolicy::Never);
    let adapter = mercadolibre(&config);
    let first = extractor.extract(&adapter, "tablet", 1, None).await?;
    let second = extractor.extract(&adapter, "tablet", 1, None).await?;

    assert!(first.is_some());
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_prices_only_mode_keeps_no_records() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    mount_page(
        &server,
        "/auriculares_Desde_1_NoIndex_True",
        ml_page(&[("Auriculares", Some("45.000")), ("Auriculares BT", Some("52.500"))]),
    )
    .await;

    let adapter = mercadolibre(&config).with_mode(ScrapeMode::PricesOnly);
    let result = PriceExtractor::with_policy(EvictionPolicy::Never)
        .extract(&adapter, "auriculares", 1, None)
        .await?
        .expect("prices");

    assert_eq!(result.price_values(), vec![45_000.0, 52_500.0]);
    assert!(result.products.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_amazon_results_skip_ads_and_convert_cents() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("k", "usb cable"))
        .and(query_param("page", "1"))
        .respond_with(html(amazon_page(&[
            ("USB-C Cable 2-pack", "$19.99", false),
            ("Promoted Cable", "$4.99", true),
            ("Braided USB-C Cable", "$1,299.00", false),
        ])))
        .mount(&server)
        .await;

    let adapter = AmazonAdapter::new(
        config.marketplace_profile(MarketplaceId::AmazonUs),
        test_fetcher(&config),
    )?;
    let result = PriceExtractor::with_policy(EvictionPolicy::Never)
        .extract(&adapter, "usb cable", 1, None)
        .await?
        .expect("prices");

    assert_eq!(result.price_values(), vec![19.99, 1299.0]);
    assert_eq!(result.products[0].title, "USB-C Cable 2-pack");
    assert_eq!(
        result.products[1].source_url.as_deref(),
        Some(format!("{}/dp/B2", server.uri()).as_str())
    );
    Ok(())
}
