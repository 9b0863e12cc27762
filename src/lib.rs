pub mod analyzer;
pub mod cache;
pub mod config;
pub mod exchange;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod plugins;
pub mod representatives;
pub mod stats;
pub mod utils;

// Re-export commonly used types
pub use analyzer::{AnalysisOutcome, PriceAnalyzer};
pub use config::AppConfig;
pub use models::{Condition, MarketplaceId, PriceReport, SearchRequest};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
