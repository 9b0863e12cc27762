pub mod adapter;

pub use adapter::MarketplaceAdapter;
