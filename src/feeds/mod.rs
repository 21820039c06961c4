pub mod demo;
pub mod market_data;
