use serde::{Deserialize, Serialize};
use validator::Validate;

use super::marketplace::{Condition, MarketplaceId};
use crate::utils::error::AppError;

pub const MIN_PAGES: u32 = 1;
pub const MAX_PAGES: u32 = 3;

/// A user search, checked before it reaches the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 100))]
    pub term: String,
    #[validate(range(min = 1, max = 3))]
    pub pages: u32,
    pub marketplace: MarketplaceId,
    pub condition: Option<Condition>,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>, pages: u32, marketplace: MarketplaceId) -> Self {
        Self {
            term: term.into(),
            pages,
            marketplace,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Option<Condition>) -> Self {
        self.condition = condition;
        self
    }

    /// Runs field validation plus the search-term character check.
    pub fn validated(self) -> Result<Self, AppError> {
        self.validate()?;
        if !is_valid_term(&self.term) {
            return Err(AppError::InvalidQuery(format!(
                "Invalid item parameter '{}': use letters, digits, spaces, '_' or '-'",
                self.term
            )));
        }
        Ok(self)
    }
}

/// Word characters, whitespace and dashes only; at least one non-space.
pub fn is_valid_term(term: &str) -> bool {
    let trimmed = term.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace())
}

/// `"iPhone 13  Pro"` becomes `"iphone-13-pro"`.
pub fn slugify(term: &str) -> String {
    term.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
