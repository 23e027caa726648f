pub mod exchange_rate_api;
pub mod gold_api;
pub mod util;

pub use exchange_rate_api::ExchangeRateApiProvider;
pub use gold_api::GoldApiProvider;
