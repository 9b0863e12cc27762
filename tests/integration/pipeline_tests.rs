use super::*;
use market_pulse::exchange::RateSource;
use market_pulse::models::{Condition, CurrencyCode, MarketplaceId};
use market_pulse::{AnalysisOutcome, AppError, SearchRequest};

#[tokio::test]
async fn test_argentina_report_with_live_rate() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    mount_page(
        &server,
        "/zapatillas_Desde_1_NoIndex_True",
        ml_page(&[
            ("Zapatillas Running", Some("100.000")),
            ("Zapatillas Urbanas", Some("150.000")),
            ("Zapatillas Trekking", Some("200.000")),
        ]),
    )
    .await;
    mount_rate(&server, json!("400.0 ARS"), 1).await;

    let analyzer = test_analyzer(&config).await;
    let outcome = analyzer
        .analyze(SearchRequest::new("zapatillas", 1, MarketplaceId::MercadoLibreAr))
        .await?;
    let report = outcome.report().expect("report");

    assert_eq!(report.currency, CurrencyCode::Ars);
    assert_eq!(report.marketplace_name, "MercadoLibre Argentina");
    assert_eq!(report.item_count, 3);
    assert_eq!(report.failed_pages, 0);
    assert_eq!(report.exchange_rate, 400.0);
    assert_eq!(report.rate_source, RateSource::Live);

    let stats = report.statistics;
    assert_eq!(stats.native.median, 150_000.0);
    assert_eq!(stats.native.mean, 150_000.0);
    assert_eq!(stats.native.min, 100_000.0);
    assert_eq!(stats.native.max, 200_000.0);
    assert_eq!(stats.usd.median, 375);

    assert_eq!(
        report.rendered_annotations()[0],
        "Median: 150.000 ARS (375 USD)"
    );
    assert_eq!(report.cheapest.as_ref().map(|p| p.title.as_str()), Some("Zapatillas Running"));
    assert_eq!(
        report.most_expensive.as_ref().map(|p| p.title.as_str()),
        Some("Zapatillas Trekking")
    );
    assert_eq!(report.near_median.len(), 1);
    assert_eq!(report.near_median[0].product.title, "Zapatillas Urbanas");
    assert_eq!(report.inliers.len(), 3);
    assert!(report.outliers.is_empty());
    assert_eq!(report.title(), "ZAPATILLAS");
    Ok(())
}

#[tokio::test]
async fn test_repeated_search_is_served_from_caches() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/monitor_Desde_1_ITEM*CONDITION_2230284_NoIndex_True"))
        .respond_with(html(ml_page(&[
            ("Monitor 24", Some("180.000")),
            ("Monitor 27", Some("260.000")),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    mount_rate(&server, json!(1000), 1).await;

    let analyzer = test_analyzer(&config).await;
    let request = SearchRequest::new("monitor", 1, MarketplaceId::MercadoLibreAr)
        .with_condition(Some(Condition::New));

    let first = analyzer.analyze(request.clone()).await?;
    let second = analyzer.analyze(request).await?;

    let (first, second) = (first.report().expect("report"), second.report().expect("report"));
    assert_eq!(first.statistics, second.statistics);
    assert_eq!(first.inliers, second.inliers);
    assert_eq!(first.rate_source, RateSource::Live);
    assert_eq!(second.rate_source, RateSource::Cached);
    Ok(())
}

#[tokio::test]
async fn test_rate_outage_uses_fallback() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    mount_page(
        &server,
        "/termo_Desde_1_NoIndex_True",
        ml_page(&[("Termo", Some("150.000"))]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(RATE_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let analyzer = test_analyzer(&config).await;
    let outcome = analyzer
        .analyze(SearchRequest::new("termo", 1, MarketplaceId::MercadoLibreAr))
        .await?;
    let report = outcome.report().expect("report");

    assert!(report.used_fallback_rate());
    assert_eq!(report.exchange_rate, 1200.0);
    assert_eq!(report.statistics.usd.median, 125);
    Ok(())
}

#[tokio::test]
async fn test_outliers_feed_histogram_but_not_headline_stats() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    let mut listings: Vec<(&str, Option<&str>)> = vec![("Cafetera", Some("100")); 10];
    listings.push(("Cafetera industrial", Some("10.000")));
    mount_page(&server, "/cafetera_Desde_1_NoIndex_True", ml_page(&listings)).await;

    let analyzer = test_analyzer(&config).await;
    let outcome = analyzer
        .analyze(SearchRequest::new("cafetera", 1, MarketplaceId::MercadoLivreBr))
        .await?;
    let report = outcome.report().expect("report");

    assert_eq!(report.outliers.len(), 1);
    assert_eq!(report.inliers.len(), 10);
    assert_eq!(report.statistics.native.max, 10_000.0);
    assert_eq!(report.histogram.iter().map(|b| b.count).sum::<usize>(), 10);
    assert_eq!(report.exchange_rate, 5.5);
    Ok(())
}

#[tokio::test]
async fn test_amazon_report() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html(amazon_page(&[
            ("Kindle", "$99.99", false),
            ("Kindle Paperwhite", "$149.99", false),
            ("Sponsored Tablet", "$59.99", true),
            ("Kindle Oasis", "$249.99", false),
        ])))
        .mount(&server)
        .await;

    let analyzer = test_analyzer(&config).await;
    let outcome = analyzer
        .analyze(SearchRequest::new("kindle", 1, MarketplaceId::AmazonUs))
        .await?;
    let report = outcome.report().expect("report");

    assert_eq!(report.item_count, 3);
    assert_eq!(report.statistics.native.median, 149.99);
    assert_eq!(report.statistics.usd.median, 149);
    assert_eq!(report.rate_source, RateSource::Fixed);
    assert_eq!(report.rendered_annotations()[0], "Median: 149.99 USD (149 USD)");
    assert_eq!(
        report
            .most_expensive
            .as_ref()
            .and_then(|p| p.image_url.as_deref()),
        Some("https://m.media-amazon.com/images/I/B3.jpg")
    );
    Ok(())
}

#[tokio::test]
async fn test_no_results_outcome() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let config = get_test_config(&server);
    mount_page(&server, "/yerba_Desde_1_NoIndex_True", empty_page()).await;

    let analyzer = test_analyzer(&config).await;
    let request = SearchRequest::new("yerba", 3, MarketplaceId::MercadoLibreAr);
    let outcome = analyzer.analyze(request.clone()).await?;

    assert_eq!(outcome, AnalysisOutcome::NoResults { request });
    Ok(())
}

#[tokio::test]
async fn test_invalid_requests_are_rejected_before_fetching() {
    let server = MockServer::start().await;
    let config = get_test_config(&server);
    let analyzer = test_analyzer(&config).await;

    for request in [
        SearchRequest::new("invalid@item", 1, MarketplaceId::MercadoLibreAr),
        SearchRequest::new("iphone", 4, MarketplaceId::MercadoLibreAr),
        SearchRequest::new("", 1, MarketplaceId::AmazonUs),
    ] {
        let result = analyzer.analyze(request).await;
        assert!(matches!(result, Err(AppError::InvalidQuery(_))));
    }
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
