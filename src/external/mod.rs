pub mod brokerage;
pub mod eodhd;
pub mod price_provider;
