use anyhow::{Context, Result};
use clap::Parser;
use market_pulse::config::LoggingConfig;
use market_pulse::utils::format_price;
use market_pulse::{
    AnalysisOutcome, AppConfig, Condition, MarketplaceId, PriceAnalyzer, PriceReport,
    SearchRequest,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Listing price statistics for a marketplace search.
#[derive(Debug, Parser)]
#[command(name = "market-pulse", version, about)]
struct Cli {
    /// Search term: letters, digits, spaces, '_' or '-'
    term: String,

    /// Number of results pages to scan (1-3)
    #[arg(short, long, default_value_t = 1)]
    pages: u32,

    /// mercadolibre-ar, mercadolivre-br or amazon-us
    #[arg(short, long, default_value = "mercadolibre-ar")]
    marketplace: MarketplaceId,

    /// new or used
    #[arg(short, long)]
    condition: Option<Condition>,

    /// Extra configuration file layered over config/*.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let _log_guard = init_tracing(&config.logging)?;

    if config.metrics.enabled {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics.port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("installing Prometheus exporter")?;
        info!(%addr, "metrics exporter listening");
    }

    let analyzer = PriceAnalyzer::from_config(&config).await?;
    let request =
        SearchRequest::new(cli.term, cli.pages, cli.marketplace).with_condition(cli.condition);

    match analyzer.analyze(request).await? {
        AnalysisOutcome::Report(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
            }
            Ok(ExitCode::SUCCESS)
        }
        AnalysisOutcome::NoResults { request } => {
            eprintln!(
                "No results for '{}' on {} ({} page(s) scanned)",
                request.term, request.marketplace, request.pages
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("market_pulse=info"))?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &logging.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}

fn print_summary(report: &PriceReport) {
    println!("{} on {} ({})", report.title(), report.marketplace_name, report.generated_on);
    println!("{}", report.listing_url);
    println!(
        "{} prices, {} failed page(s), {} outlier(s)",
        report.item_count,
        report.failed_pages,
        report.outliers.len()
    );
    let rate_note = if report.used_fallback_rate() {
        " (fallback)"
    } else {
        ""
    };
    println!(
        "1 USD = {}{}",
        format_price(report.exchange_rate, report.currency),
        rate_note
    );
    println!();

    for line in report.rendered_annotations() {
        println!("  {}", line);
    }

    if let Some(cheapest) = &report.cheapest {
        println!();
        println!(
            "Cheapest: {} - {}",
            cheapest.title,
            format_price(cheapest.price.value(), report.currency)
        );
    }
    if let Some(most_expensive) = &report.most_expensive {
        println!(
            "Most expensive: {} - {}",
            most_expensive.title,
            format_price(most_expensive.price.value(), report.currency)
        );
    }

    if !report.near_median.is_empty() {
        println!();
        println!("Near the median:");
        for ranked in &report.near_median {
            println!(
                "  {:+.1}%  {}  {}",
                ranked.percentage_diff_from_median,
                format_price(ranked.product.price.value(), report.currency),
                ranked.product.title
            );
        }
    }
}
