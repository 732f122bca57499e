pub mod aggregators;
pub mod analysis;
pub mod config;
pub mod conversions;
pub mod dev_tools;
pub mod error;
pub mod format;
pub mod handlers;
pub mod metrics;
pub mod migrations;
pub mod reports;
pub mod sheets;
pub mod store;
