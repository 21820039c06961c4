pub mod volatility;
pub mod iron_condor;
pub mod probability;
