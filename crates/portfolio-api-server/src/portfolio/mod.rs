pub mod analytics;
pub mod store;

pub use analytics::PortfolioAnalytics;
pub use store::{PortfolioSnapshot, PortfolioStore};
