//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod price;
pub mod pricing;
pub mod product;

// Re-export main types for cleaner imports
pub use currency::CurrencyRateProvider;
pub use error::PricingError;
pub use price::{GoldPriceProvider, MarketQuote, PriceFeed};
pub use product::{PriceUpdate, Product, ProductStore};
