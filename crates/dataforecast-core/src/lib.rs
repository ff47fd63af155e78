pub mod analytics;
pub mod config;
pub mod error;
pub mod forecast;
pub mod format;
pub mod ranges;
pub mod weather;
