// Library root: dataset, filter engine, aggregation, chart specs and the
// dashboard controller, plus the config and wire types the app crate uses.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod filter;
pub mod protocol;
