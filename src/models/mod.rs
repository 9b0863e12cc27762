pub mod extraction;
pub mod listing;
pub mod marketplace;
pub mod report;
pub mod request;

// Re-exports for convenience
pub use extraction::*;
pub use listing::*;
pub use marketplace::*;
pub use report::*;
pub use request::*;
