use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("Invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown marketplace: {0}")]
    UnknownMarketplace(String),

    #[error("Cannot summarize an empty price series")]
    EmptySeries,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures that count as a failed page rather than aborting a run.
    pub fn is_page_failure(&self) -> bool {
        matches!(self, AppError::Http(_) | AppError::UnexpectedStatus { .. })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidQuery(format!("{}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
