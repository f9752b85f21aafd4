pub mod aggregator;
pub mod calendar;
pub mod stats_api;
