pub mod app;
pub mod config;
pub mod credential;
pub mod dashboard;
pub mod error;
pub mod report;
pub mod routes;
pub mod state;
