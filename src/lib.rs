//! Iron condor strike selection and risk metrics from daily index prices.
//!
//! `models` is the pure quantitative core (volatility, strikes, P&L,
//! probability). `feeds` and `report` are the I/O around it.

pub mod config;
pub mod errors;
pub mod feeds;
pub mod models;
pub mod report;
pub mod risk;
pub mod state;
