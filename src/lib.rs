// Library interface for mangatv_scraper
// This allows tests and external crates to use the scraper components

pub mod config;
pub mod helpers;
pub mod http_client;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod source;
