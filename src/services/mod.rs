pub mod accuweather;
pub mod aggregator;
pub mod classifier;
pub mod source;
pub mod visualization;
