use reqwest::Client;
use scraper::Selector;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result};

/// Plain HTTP GET for listing pages and rate quotes.
///
/// Non-2xx responses become [`AppError::UnexpectedStatus`]; connect/read
/// timeouts surface as [`AppError::Http`]. Nothing is retried.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    config: ScraperConfig,
}

impl PageFetcher {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetches `url` and returns the body as text.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(
                reqwest::header::ACCEPT_LANGUAGE,
                self.config.accept_language.as_str(),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(
            url,
            bytes = body.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "fetched page"
        );
        Ok(body)
    }

    pub async fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Compiles a CSS selector, mapping failures to [`AppError::Selector`].
pub fn compile_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| AppError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Whitespace-normalized text content of an element.
pub fn element_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
